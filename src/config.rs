//! Runtime configuration.
//!
//! Settings come from an optional YAML file (`--config`), with every field
//! defaulted so a partial file (or no file) is valid. CLI flags are applied
//! on top by the caller.
//!
//! ```yaml
//! server:
//!   port: 8080
//! crawler:
//!   site_domain: arca.live
//!   request_delay_ms: 1500
//! sessions:
//!   ttl_secs: 1800
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub crawler: CrawlerConfig,
    pub sessions: SessionConfig,
}

impl Config {
    /// Load configuration from a YAML file, or defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!(path, site = %config.crawler.site_domain, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests from any origin.
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Outbound crawl behaviour: which site is accepted and how politely it is fetched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Substring a thread URL must contain to be accepted.
    pub site_domain: String,
    pub user_agent: String,
    pub referer: String,
    pub priming_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Pause after a successful priming request.
    pub priming_delay_ms: u64,
    /// Pause before the thread page request.
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            site_domain: "arca.live".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: "https://arca.live/".to_string(),
            priming_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            priming_delay_ms: 500,
            request_delay_ms: 1_500,
        }
    }
}

impl CrawlerConfig {
    pub fn priming_timeout(&self) -> Duration {
        Duration::from_millis(self.priming_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn priming_delay(&self) -> Duration {
        Duration::from_millis(self.priming_delay_ms)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Whether `url` points at the configured site.
    pub fn accepts(&self, url: &str) -> bool {
        url.contains(&self.site_domain)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a crawl result stays available for drawing.
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_secs: 30 * 60 }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
