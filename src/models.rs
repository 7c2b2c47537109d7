//! Data models for extracted comments and the JSON shapes built from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Comment`]: One comment pulled out of a thread page
//! - [`CrawlStats`]: Summary counts reported alongside a crawl
//! - [`CrawlReport`]: What the `crawl` subcommand writes to disk
//!
//! The stats use camelCase field names to match the JSON the front end
//! already consumes, hence the `rename_all` attributes.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Placeholder author for comments with no recoverable name.
pub const ANONYMOUS_AUTHOR: &str = "anonymous/unknown";
/// Placeholder author the site shows in place of a real name.
pub const PLACEHOLDER_AUTHOR: &str = "author";
/// Content used when a comment consists of an emoticon only.
pub const EMOTICON_CONTENT: &str = "[emoticon]";
/// Content used when a comment has no text at all.
pub const EMPTY_CONTENT: &str = "[no content]";
/// Time used when a comment carries no `<time>` element.
pub const UNKNOWN_TIME: &str = "time info unavailable";

/// Author names that never count as a participant.
pub const RESERVED_AUTHORS: [&str; 2] = [ANONYMOUS_AUTHOR, PLACEHOLDER_AUTHOR];

/// A single comment as extracted from a thread page.
///
/// Comments have no identity beyond their position in the crawl output,
/// which follows document order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    /// Display name (or `data-filter` handle) of the commenter.
    pub author: String,
    /// Visible text of the comment, or one of the content sentinels.
    pub content: String,
    /// Timestamp text exactly as the page renders it.
    pub time: String,
}

/// Summary counts for one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStats {
    pub total_comments: usize,
    pub unique_authors: usize,
}

impl CrawlStats {
    pub fn from_comments(comments: &[Comment]) -> Self {
        Self {
            total_comments: comments.len(),
            unique_authors: unique_authors(comments).len(),
        }
    }
}

/// Distinct authors in first-seen order.
pub fn unique_authors(comments: &[Comment]) -> Vec<String> {
    comments
        .iter()
        .map(|c| c.author.clone())
        .unique()
        .collect()
}

/// Output of the `crawl` subcommand.
#[derive(Debug, Deserialize, Serialize)]
pub struct CrawlReport {
    /// Thread URL that was crawled.
    pub url: String,
    /// When the crawl finished.
    pub crawled_at: DateTime<Utc>,
    pub stats: CrawlStats,
    pub comments: Vec<Comment>,
}

impl CrawlReport {
    pub fn new(url: impl Into<String>, comments: Vec<Comment>) -> Self {
        Self {
            url: url.into(),
            crawled_at: Utc::now(),
            stats: CrawlStats::from_comments(&comments),
            comments,
        }
    }
}
