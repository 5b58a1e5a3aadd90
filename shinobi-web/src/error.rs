//! Error types for shinobi-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::fetcher::LookupError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No source knows the character (404)
    #[error("character not found")]
    NotFound(String),

    /// Every upstream source failed (502)
    #[error("{0}")]
    BadGateway(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(id) => ApiError::NotFound(id),
            LookupError::Upstream(e) => ApiError::BadGateway(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
