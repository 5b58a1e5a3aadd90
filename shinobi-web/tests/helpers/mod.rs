//! Shared fixtures for shinobi-web integration tests
//!
//! Upstream APIs are stood in for by small axum routers served on an
//! ephemeral localhost port.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, Query},
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shinobi_common::config::{SourceConfig, UpstreamConfig};
use shinobi_web::{build_router, AppState, CharacterFetcher};
use std::collections::HashMap;

/// Nothing listens here; connections are refused
pub const DEAD_URL: &str = "http://127.0.0.1:1/characters";

/// Serve `router` on 127.0.0.1 and return its base URL
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream listener");
    let addr = listener.local_addr().expect("upstream address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// `count` characters with ids 1..=count
pub fn roster(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("Ninja {}", i),
                "images": [format!("https://img.test/{}.png", i)],
                "personal": {
                    "clan": "Uzumaki",
                    "affiliation": ["Konohagakure"],
                    "occupation": ["Ninja", "012607"]
                },
                "rank": { "ninjaRank": { "Part I": "Genin" } },
                "jutsu": ["Rasengan", "Shadow Clone"]
            })
        })
        .collect()
}

/// Paged upstream honoring `?page=&limit=`, wrapped as `{ characters, total }`,
/// with `/characters/:id` lookups over the same roster
pub async fn spawn_paged_upstream(count: usize) -> String {
    let all = roster(count);
    let by_id = all.clone();

    let router = Router::new()
        .route(
            "/characters",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let all = all.clone();
                async move {
                    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
                    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
                    let items: Vec<Value> =
                        all.iter().skip((page - 1) * limit).take(limit).cloned().collect();
                    Json(json!({
                        "characters": items,
                        "currentPage": page,
                        "pageSize": limit,
                        "total": all.len()
                    }))
                }
            }),
        )
        .route(
            "/characters/:id",
            get(move |Path(id): Path<String>| {
                let by_id = by_id.clone();
                async move {
                    match by_id.iter().find(|c| c["id"].to_string() == id) {
                        Some(c) => Json(c.clone()).into_response(),
                        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
                            .into_response(),
                    }
                }
            }),
        );

    format!("{}/characters", spawn_upstream(router).await)
}

/// Upstream that always sends the whole collection as a bare array
pub async fn spawn_flat_upstream(characters: Vec<Value>) -> String {
    let router = Router::new().route(
        "/characters",
        get(move || {
            let characters = characters.clone();
            async move { Json(Value::Array(characters)) }
        }),
    );
    format!("{}/characters", spawn_upstream(router).await)
}

/// Upstream that answers every request with `status`
pub async fn spawn_failing_upstream(status: StatusCode) -> String {
    let router = Router::new().fallback(move || async move { (status, "upstream down") });
    format!("{}/characters", spawn_upstream(router).await)
}

/// Upstream that answers 200 with a non-JSON body
pub async fn spawn_garbage_upstream() -> String {
    let router = Router::new().fallback(|| async { "<html>maintenance</html>" });
    format!("{}/characters", spawn_upstream(router).await)
}

/// Router wired to the given primary (native pagination) and fallback URLs
pub fn app(primary_url: &str, fallback_url: &str) -> Router {
    let config = UpstreamConfig {
        timeout_secs: 5,
        primary: SourceConfig {
            url: primary_url.to_string(),
            native_pagination: true,
        },
        fallback: SourceConfig {
            url: fallback_url.to_string(),
            native_pagination: false,
        },
        ..UpstreamConfig::default()
    };
    let fetcher = CharacterFetcher::new(&config).expect("build fetcher");
    build_router(AppState::new(fetcher))
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

pub async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

pub async fn extract_text(body: Body) -> String {
    String::from_utf8(body_bytes(body).await).expect("Should be UTF-8")
}
