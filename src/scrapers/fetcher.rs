//! Thread page fetcher.
//!
//! The target site tends to reject cold requests, so every fetch is a
//! two-step affair on one cookie-bearing client:
//!
//! 1. **Priming**: GET the site's origin to collect cookies (best-effort)
//! 2. **Fetching**: after a politeness delay, GET the thread page itself
//!
//! A fresh client is built per fetch so cookies never leak between crawls.

use crate::config::CrawlerConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

static ORIGIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^/]+").expect("origin pattern is valid"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("unexpected status {status} for {url}")]
    Status { status: StatusCode, url: String },
}

/// Scheme and host of `url`, e.g. `https://arca.live` for a thread URL.
pub fn origin_of(url: &str) -> Option<&str> {
    ORIGIN_RE.find(url).map(|m| m.as_str())
}

/// Fetches thread pages with the configured headers, timeouts and delays.
#[derive(Debug)]
pub struct PageFetcher {
    client: Client,
    config: CrawlerConfig,
}

impl PageFetcher {
    /// Build a fetcher with its own cookie store.
    ///
    /// The configured User-Agent and Referer are installed as default
    /// headers, so the priming and page requests send the same set.
    ///
    /// # Arguments
    ///
    /// * `config` - Headers, timeouts and delays to apply to every request
    ///
    /// # Returns
    ///
    /// A ready fetcher, or an error if a header value is not valid or the
    /// HTTP client cannot be built.
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(REFERER, HeaderValue::from_str(&config.referer)?);

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch the HTML of `url`, priming cookies from its origin first.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute thread URL
    ///
    /// # Returns
    ///
    /// The response body on a 2xx status.
    ///
    /// # Errors
    ///
    /// [`FetchError::Status`] for any non-2xx status, [`FetchError::Client`]
    /// for network failures and timeouts. Priming failures never surface here.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match origin_of(url) {
            Some(origin) => self.prime(origin).await,
            None => debug!("No origin in URL; skipping priming request"),
        }

        sleep(self.config.request_delay()).await;

        let response = self
            .client
            .get(url)
            .timeout(self.config.request_timeout())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Thread page request rejected");
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        info!(bytes = body.len(), %status, "Fetched thread page");
        Ok(body)
    }

    /// Hit the origin so the session picks up whatever cookies the site hands out.
    /// Failures are logged and otherwise ignored.
    async fn prime(&self, origin: &str) {
        info!(%origin, "Priming cookies from site origin");
        match self
            .client
            .get(origin)
            .timeout(self.config.priming_timeout())
            .send()
            .await
        {
            Ok(response) => {
                debug!(status = %response.status(), "Priming request finished");
                sleep(self.config.priming_delay()).await;
            }
            Err(e) => warn!(error = %e, %origin, "Priming request failed; continuing"),
        }
    }
}
