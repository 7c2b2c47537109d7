//! Output generation for the `crawl` subcommand.
//!
//! - [`json`]: Writes a crawl report to a file or renders it for stdout

pub mod json;
