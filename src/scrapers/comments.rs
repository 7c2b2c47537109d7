//! Comment extraction for arca.live thread pages.
//!
//! The page layout this module relies on:
//!
//! ```text
//! .member-info .user-info a[data-filter]   thread author
//! .comment-item                            one per comment
//!   .user-info a[data-filter] | span.name  commenter
//!   .message                               comment body
//!   .emoticon-wrapper                      emoticon-only body
//!   time                                   timestamp text
//! ```
//!
//! Every comment node resolves to an [`Extracted`] outcome on its own, so a
//! malformed node only drops itself from the result.

use crate::models::{
    ANONYMOUS_AUTHOR, Comment, EMOTICON_CONTENT, EMPTY_CONTENT, RESERVED_AUTHORS, UNKNOWN_TIME,
};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

/// Text the site renders around its comment section ("comments").
const COMMENT_SECTION_MARKER: &str = "댓글";

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

static THREAD_AUTHOR: Lazy<Selector> = Lazy::new(|| selector(".member-info .user-info a"));
static COMMENT_ITEM: Lazy<Selector> = Lazy::new(|| selector(".comment-item"));
static AUTHOR_LINK: Lazy<Selector> = Lazy::new(|| selector(".user-info a"));
static AUTHOR_NAME: Lazy<Selector> = Lazy::new(|| selector(".user-info span.name"));
static MESSAGE: Lazy<Selector> = Lazy::new(|| selector(".message"));
static EMOTICON: Lazy<Selector> = Lazy::new(|| selector(".emoticon-wrapper"));
static TIME: Lazy<Selector> = Lazy::new(|| selector("time"));

/// Why a comment node was left out of the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Written by the thread author.
    ThreadAuthor,
    /// No author name could be derived.
    EmptyAuthor,
    /// Author resolved to a placeholder name.
    ReservedAuthor(String),
}

/// Outcome of extracting a single comment node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Kept(Comment),
    Skipped(SkipReason),
}

/// Trimmed text nodes of `element`, concatenated without separators.
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Author handle of a profile link: `data-filter` when present, link text otherwise.
fn link_author(link: ElementRef<'_>) -> String {
    match link.value().attr("data-filter").map(str::trim) {
        Some(handle) if !handle.is_empty() => handle.to_string(),
        _ => visible_text(link),
    }
}

/// Name of the user who started the thread, or an empty string when the
/// page does not show one.
pub fn thread_author(document: &Html) -> String {
    document
        .select(&THREAD_AUTHOR)
        .next()
        .map(link_author)
        .unwrap_or_default()
}

/// Resolve one `.comment-item` node.
pub fn extract_comment(node: ElementRef<'_>, thread_author: &str) -> Extracted {
    let author = match node.select(&AUTHOR_LINK).next() {
        Some(link) => link_author(link),
        // Anonymous or withdrawn users have a bare name span instead of a link.
        None => node
            .select(&AUTHOR_NAME)
            .next()
            .map(visible_text)
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string()),
    };

    if !thread_author.is_empty() && author == thread_author {
        return Extracted::Skipped(SkipReason::ThreadAuthor);
    }
    if author.is_empty() {
        return Extracted::Skipped(SkipReason::EmptyAuthor);
    }
    if RESERVED_AUTHORS.contains(&author.as_str()) {
        return Extracted::Skipped(SkipReason::ReservedAuthor(author));
    }

    let mut content = node
        .select(&MESSAGE)
        .next()
        .map(visible_text)
        .unwrap_or_default();
    if content.is_empty() && node.select(&EMOTICON).next().is_some() {
        content = EMOTICON_CONTENT.to_string();
    }
    if content.is_empty() {
        content = EMPTY_CONTENT.to_string();
    }

    let time = node
        .select(&TIME)
        .next()
        .map(visible_text)
        .unwrap_or_else(|| UNKNOWN_TIME.to_string());

    Extracted::Kept(Comment {
        author,
        content,
        time,
    })
}

/// Extract every comment on a thread page, in document order, leaving out
/// the thread author's own comments and placeholder authors.
///
/// # Arguments
///
/// * `html` - Raw HTML of the thread page
///
/// # Returns
///
/// The kept comments. An empty vector when the page has no `.comment-item`
/// nodes, which is also what a blocked or error page looks like.
#[instrument(level = "info", skip_all, fields(bytes = html.len()))]
pub fn extract_comments(html: &str) -> Vec<Comment> {
    let document = Html::parse_document(html);

    let author = thread_author(&document);
    if !author.is_empty() {
        info!(thread_author = %author, "Found thread author");
    }

    let nodes: Vec<ElementRef<'_>> = document.select(&COMMENT_ITEM).collect();
    if nodes.is_empty() {
        if !html.contains(COMMENT_SECTION_MARKER) {
            warn!("Page has no comment section; the request may have been blocked");
        }
        warn!("No comment elements found");
        debug!(preview = %truncate_for_log(html, 300), "Page without comments");
        return Vec::new();
    }
    info!(count = nodes.len(), "Found comment elements");

    let mut comments = Vec::with_capacity(nodes.len());
    for (index, node) in nodes.into_iter().enumerate() {
        match extract_comment(node, &author) {
            Extracted::Kept(comment) => comments.push(comment),
            Extracted::Skipped(reason) => debug!(index, ?reason, "Skipped comment"),
        }
    }

    info!(kept = comments.len(), "Extracted comments");
    comments
}
