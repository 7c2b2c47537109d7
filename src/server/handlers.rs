//! HTTP API request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use std::collections::BTreeMap;
use tracing::{info, instrument};

use super::AppState;
use super::error::ApiError;
use super::types::*;
use crate::draw::draw_winners;
use crate::models::{CrawlStats, unique_authors};
use crate::scrapers::crawl_comments;

/// API description
pub async fn index() -> Json<ApiInfo> {
    let endpoints = [
        ("/api/crawl", "POST - crawl the comments of a thread"),
        ("/api/draw", "POST - draw winners from a crawled thread"),
        ("/api/health", "GET - server health check"),
    ]
    .into_iter()
    .map(|(path, about)| (path.to_string(), about.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(ApiInfo {
        name: "arca comment crawler API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Bare `OPTIONS` on an API path.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Crawl a thread and remember the result under a new session id.
#[instrument(level = "info", skip_all)]
pub async fn crawl(
    State(state): State<AppState>,
    payload: Result<Json<CrawlRequest>, JsonRejection>,
) -> Result<Json<CrawlResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Internal(e.body_text()))?;

    let url = request.url.trim();
    if url.is_empty() {
        return Err(ApiError::MissingUrl);
    }
    if !state.config.crawler.accepts(url) {
        return Err(ApiError::ForeignUrl {
            site: state.config.crawler.site_domain.clone(),
        });
    }

    info!(%url, "Crawl started");
    let comments = crawl_comments(&state.config.crawler, url)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if comments.is_empty() {
        return Err(ApiError::NoComments);
    }

    let stats = CrawlStats::from_comments(&comments);
    let session_id = state.sessions.insert(url, comments.clone());
    info!(
        %session_id,
        comments = stats.total_comments,
        authors = stats.unique_authors,
        stored_sessions = state.sessions.len(),
        "Crawl completed"
    );

    Ok(Json(CrawlResponse {
        success: true,
        session_id,
        data: comments,
        stats,
    }))
}

/// Draw winners among the authors of a stored crawl.
#[instrument(level = "info", skip_all)]
pub async fn draw(
    State(state): State<AppState>,
    payload: Result<Json<DrawRequest>, JsonRejection>,
) -> Result<Json<DrawResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let session = state
        .sessions
        .get(&request.session_id)
        .ok_or(ApiError::SessionNotFound)?;
    let participants = unique_authors(&session.comments).len();
    let winners = draw_winners(&session.comments, request.count, &mut rand::rng())?;
    info!(
        session_id = %session.id,
        url = %session.url,
        crawled_at = %session.created_at,
        participants,
        winners = winners.len(),
        "Winners drawn"
    );

    Ok(Json(DrawResponse {
        success: true,
        session_id: session.id,
        winners,
        participants,
    }))
}
