//! JSON output for the `crawl` subcommand.
//!
//! Reports are pretty-printed. When a path is given, parent directories are
//! created as needed; otherwise the report goes to stdout.

use crate::models::CrawlReport;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize a [`CrawlReport`] to pretty JSON.
pub fn render_report(report: &CrawlReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Write a [`CrawlReport`] to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_report(report: &CrawlReport, path: &str) -> Result<(), Box<dyn Error>> {
    let json = render_report(report)?;

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(comments = report.stats.total_comments, "Wrote crawl report");
    Ok(())
}
