//! # Arca Comment Crawler
//!
//! Fetches a forum thread page, extracts its comments, and serves them over
//! a small JSON API so a front end can run a giveaway draw among commenters.
//!
//! ## Usage
//!
//! ```sh
//! arca_comment_crawler serve --port 5000
//! arca_comment_crawler crawl https://arca.live/b/browndust2/123
//! ```
//!
//! ## Architecture
//!
//! A crawl is a linear pipeline:
//! 1. **Priming**: GET the site origin to collect cookies
//! 2. **Fetching**: after a politeness delay, GET the thread page
//! 3. **Extraction**: pull comments out of the HTML, dropping the thread author's own
//! 4. **Output**: JSON over HTTP (`serve`) or to stdout/a file (`crawl`)

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod draw;
mod models;
mod outputs;
mod scrapers;
mod server;
mod sessions;
mod utils;

use cli::{Cli, Command};
use config::Config;
use models::CrawlReport;
use outputs::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = Config::load(args.config.as_deref())?;
    args.command.apply_overrides(&mut config);

    match args.command {
        Command::Serve { .. } => {
            info!(
                address = %config.server.listen_addr(),
                site = %config.crawler.site_domain,
                "Starting API server"
            );
            server::serve(config).await?;
        }
        Command::Crawl { url, output } => {
            let start_time = std::time::Instant::now();
            if !config.crawler.accepts(&url) {
                warn!(%url, site = %config.crawler.site_domain, "URL is not on the configured site");
            }

            let comments = scrapers::crawl_comments(&config.crawler, &url).await?;
            if comments.is_empty() {
                warn!(%url, "No comments found");
            }

            let report = CrawlReport::new(url, comments);
            match output {
                Some(path) => json::write_report(&report, &path).await?,
                None => println!("{}", json::render_report(&report)?),
            }

            let elapsed = start_time.elapsed();
            info!(
                ?elapsed,
                comments = report.stats.total_comments,
                authors = report.stats.unique_authors,
                "Crawl complete"
            );
        }
    }

    Ok(())
}
