//! Thread crawling: fetch a page, then pull its comments out.
//!
//! A crawl follows a fixed two-phase pattern:
//!
//! 1. **Fetching** ([`fetcher`]): prime cookies from the site origin, wait,
//!    then download the thread page
//! 2. **Extraction** ([`comments`]): parse the HTML and turn each comment
//!    node into a [`Comment`], skipping the thread author's own comments
//!
//! A failed fetch is logged and reported as an empty result, so callers
//! see "blocked" and "no comments" the same way.

pub mod comments;
pub mod fetcher;

use crate::config::CrawlerConfig;
use crate::models::Comment;
use fetcher::{FetchError, PageFetcher};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to set up HTTP client: {0}")]
    Setup(#[from] FetchError),
    #[error("comment extraction task failed: {0}")]
    Extraction(#[from] tokio::task::JoinError),
}

/// Crawl one thread URL and return its comments in page order.
///
/// # Arguments
///
/// * `config` - Crawler settings (headers, timeouts, politeness delays)
/// * `url` - Thread URL to fetch
///
/// # Returns
///
/// The extracted comments, possibly empty.
///
/// # Errors
///
/// Fetch failures (network errors, timeouts, non-2xx) yield `Ok(vec![])`.
/// Only problems on our side, such as a client that cannot be built or an
/// extraction task that dies, surface as errors.
#[instrument(level = "info", skip(config))]
pub async fn crawl_comments(config: &CrawlerConfig, url: &str) -> Result<Vec<Comment>, CrawlError> {
    let fetcher = PageFetcher::new(config)?;

    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "Fetch failed; treating as no comments");
            return Ok(Vec::new());
        }
    };

    // The parsed document is not Send, so keep it off the async workers.
    let comments = tokio::task::spawn_blocking(move || comments::extract_comments(&html)).await?;
    info!(count = comments.len(), "Crawl finished");
    Ok(comments)
}
