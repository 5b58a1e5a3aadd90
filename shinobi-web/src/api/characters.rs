//! Character JSON API
//!
//! `GET /api/characters?page&perPage` and `GET /api/characters/:id`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::fetcher::{CharacterEnvelope, PageEnvelope};
use crate::pagination::PageRequest;
use crate::AppState;

/// Longest identifier accepted for a lookup
const MAX_ID_LEN: usize = 200;

/// Query parameters for character listing
///
/// Kept as strings so malformed numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    pub page: Option<String>,

    /// Items per page
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.per_page.as_deref())
    }
}

/// GET /api/characters
///
/// 200 whenever either source answered, 502 when both failed. The body is
/// a page envelope in both cases.
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> (StatusCode, Json<PageEnvelope>) {
    let envelope = state.fetcher.fetch_page(query.page_request()).await;

    let status = if envelope.is_upstream_failure() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };

    (status, Json(envelope))
}

/// Trimmed lookup id, rejected when empty or longer than `MAX_ID_LEN`
pub fn lookup_id(raw: &str) -> ApiResult<&str> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "character id must be 1-{} characters",
            MAX_ID_LEN
        )));
    }
    Ok(id)
}

/// GET /api/characters/:id
///
/// 404 when no source knows the character, 502 when the fallback
/// collection could not be fetched.
pub async fn get_character(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CharacterEnvelope>> {
    let id = lookup_id(&id)?;
    let envelope = state.fetcher.fetch_by_id(id).await?;
    Ok(Json(envelope))
}
