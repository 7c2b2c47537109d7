//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Server options can also be provided through environment variables.

use clap::{Parser, Subcommand};

use crate::config::Config;

/// Command-line arguments for the comment crawler.
///
/// # Examples
///
/// ```sh
/// # Serve the API on the default port
/// arca_comment_crawler serve
///
/// # Serve with a config file and a different port
/// arca_comment_crawler --config ./crawler.yaml serve --port 8080
///
/// # Crawl a thread once and write the comments to a file
/// arca_comment_crawler crawl https://arca.live/b/browndust2/123 -o comments.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, env = "CRAWLER_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "CRAWLER_PORT")]
        port: Option<u16>,

        /// Domain a thread URL must contain
        #[arg(long, env = "CRAWLER_SITE_DOMAIN")]
        site_domain: Option<String>,
    },
    /// Crawl a single thread and print its comments as JSON
    Crawl {
        /// Thread URL
        url: String,

        /// Write the JSON report to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Command {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Command::Serve {
            host,
            port,
            site_domain,
        } = self
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(site_domain) = site_domain {
                config.crawler.site_domain = site_domain.clone();
            }
        }
    }
}
