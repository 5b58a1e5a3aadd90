//! shinobi-web library - Naruto character browser
//!
//! JSON API and server-rendered pages over two upstream character APIs,
//! tried primary first, then fallback.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod fetcher;
pub mod pagination;
pub mod render;

pub use crate::error::{ApiError, ApiResult};
pub use crate::fetcher::CharacterFetcher;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream client (shared connection pool, no per-request state)
    pub fetcher: Arc<CharacterFetcher>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(fetcher: CharacterFetcher) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/characters", get(api::list_characters))
        .route("/api/characters/:id", get(api::get_character))
        .route("/api/buildinfo", get(api::get_build_info));

    Router::new()
        .merge(api)
        .merge(api::page_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
