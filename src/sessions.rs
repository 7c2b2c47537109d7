//! In-memory store of recent crawl results, keyed by an opaque session id.
//!
//! Entries expire after the configured TTL. Expired entries are dropped
//! lazily: on insert (a full sweep) and on lookup (just the entry asked for).

use crate::models::Comment;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// A stored crawl.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    pub id: String,
    pub url: String,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, CrawlSession>>,
}

/// 16 lowercase hex characters from 64 random bits.
pub fn new_session_id() -> String {
    format!("{:016x}", rand::rng().random::<u64>())
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CrawlSession>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, session: &CrawlSession) -> bool {
        session.stored_at.elapsed() >= self.ttl
    }

    /// Store a crawl result under a fresh session id.
    ///
    /// Expired entries are swept before the new one is added.
    ///
    /// # Arguments
    ///
    /// * `url` - Thread URL the comments came from
    /// * `comments` - Extracted comments, in page order
    ///
    /// # Returns
    ///
    /// The new session id (16 lowercase hex characters), unique among live
    /// sessions.
    pub fn insert(&self, url: &str, comments: Vec<Comment>) -> String {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, s| !self.is_expired(s));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "Purged expired sessions");
        }

        let mut id = new_session_id();
        while entries.contains_key(&id) {
            id = new_session_id();
        }
        entries.insert(
            id.clone(),
            CrawlSession {
                id: id.clone(),
                url: url.to_string(),
                comments,
                created_at: Utc::now(),
                stored_at: Instant::now(),
            },
        );
        id
    }

    /// Look up a live session.
    ///
    /// # Arguments
    ///
    /// * `id` - Session id returned by [`SessionStore::insert`]
    ///
    /// # Returns
    ///
    /// A copy of the session, or `None` when the id is unknown or its TTL has
    /// passed. An expired entry is removed as a side effect.
    pub fn get(&self, id: &str) -> Option<CrawlSession> {
        let mut entries = self.entries();
        let expired = self.is_expired(entries.get(id)?);
        if expired {
            entries.remove(id);
            debug!(session_id = id, "Session expired");
            return None;
        }
        entries.get(id).cloned()
    }

    /// Number of stored sessions, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries().len()
    }
}
