//! Request and response bodies for the JSON API.

use crate::models::{Comment, CrawlStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub success: bool,
    pub session_id: String,
    pub data: Vec<Comment>,
    pub stats: CrawlStats,
}

fn default_winner_count() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    pub session_id: String,
    #[serde(default = "default_winner_count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DrawResponse {
    pub success: bool,
    pub session_id: String,
    pub winners: Vec<String>,
    pub participants: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub name: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}
