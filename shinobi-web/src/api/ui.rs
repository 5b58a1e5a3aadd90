//! UI routes - server-rendered HTML pages
//!
//! Pages go through the same fetch + normalize path as the JSON API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use super::characters::{lookup_id, ListQuery};
use crate::fetcher::LookupError;
use crate::pagination::PageRequest;
use crate::render;
use crate::AppState;

/// Build UI routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/characters", get(characters_page))
        .route("/characters/:id", get(character_page))
}

/// GET /
async fn home_page() -> Html<String> {
    Html(render::home_page())
}

/// GET /characters?page=N
///
/// Always 200: upstream failure is shown as a warning banner with an empty
/// grid. The page size is fixed.
async fn characters_page(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let request = PageRequest::from_query(query.page.as_deref(), None);
    let envelope = state.fetcher.fetch_page(request).await;
    Html(render::characters_page(&envelope))
}

/// GET /characters/:id
///
/// Same id rules as the JSON route; an unusable id gets the not-found page
/// with 400 and never reaches an upstream.
async fn character_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match lookup_id(&id) {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, Html(render::not_found_page())).into_response(),
    };

    match state.fetcher.fetch_by_id(id).await {
        Ok(envelope) => Html(render::character_detail_page(&envelope.data)).into_response(),
        Err(LookupError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response()
        }
        Err(LookupError::Upstream(_)) => {
            (StatusCode::BAD_GATEWAY, Html(render::unavailable_page())).into_response()
        }
    }
}
