//! API error type and its JSON rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use super::types::ErrorBody;
use crate::draw::DrawError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("please enter a URL")]
    MissingUrl,
    #[error("not a {site} URL")]
    ForeignUrl { site: String },
    #[error("no comments found, check the URL")]
    NoComments,
    #[error("session not found or expired")]
    SessionNotFound,
    #[error("invalid request: {0}")]
    InvalidBody(String),
    #[error("{0}")]
    Draw(#[from] DrawError),
    #[error("error during crawl: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl
            | ApiError::ForeignUrl { .. }
            | ApiError::InvalidBody(_)
            | ApiError::Draw(_) => StatusCode::BAD_REQUEST,
            ApiError::NoComments | ApiError::SessionNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "Request failed");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}
