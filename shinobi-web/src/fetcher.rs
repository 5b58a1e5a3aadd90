//! Upstream character fetching with primary → fallback
//!
//! Each call makes at most two sequential requests: the primary source,
//! then the fallback source if the primary attempt failed. Attempt failures
//! (transport error, non-2xx status, non-JSON body) are logged and absorbed
//! here; callers only see a page envelope or a lookup error.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shinobi_common::character::slugify;
use shinobi_common::config::{SourceConfig, UpstreamConfig};
use shinobi_common::{normalize_character, NormalizedCharacter};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::pagination::PageRequest;

/// Wrapper keys some sources put around the character array
const COLLECTION_KEYS: &[&str] = &["data", "characters"];

/// Metadata keys carrying the full collection size on paged responses
const TOTAL_KEYS: &[&str] = &["total", "totalCharacters", "count"];

/// A single upstream attempt failed
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("{0} returned no character")]
    Empty(String),

    #[error("invalid upstream URL {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Single-character lookup failure
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("character not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Paged list response
///
/// `source` is `None` only when both upstreams failed, in which case
/// `error` describes the last failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub data: Vec<NormalizedCharacter>,
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageEnvelope {
    fn failed(request: PageRequest, error: String) -> Self {
        Self {
            page: request.page,
            per_page: request.per_page,
            total: 0,
            data: Vec::new(),
            source: None,
            error: Some(error),
        }
    }

    /// Both upstreams failed
    pub fn is_upstream_failure(&self) -> bool {
        self.source.is_none()
    }
}

/// Single-character response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterEnvelope {
    pub data: NormalizedCharacter,
    pub source: String,
}

/// Fetches characters from the configured primary and fallback sources
pub struct CharacterFetcher {
    http_client: reqwest::Client,
    primary: SourceConfig,
    fallback: SourceConfig,
}

impl CharacterFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            primary: config.primary.clone(),
            fallback: config.fallback.clone(),
        })
    }

    pub fn primary(&self) -> &SourceConfig {
        &self.primary
    }

    pub fn fallback(&self) -> &SourceConfig {
        &self.fallback
    }

    /// Fetch one page of normalized characters
    ///
    /// Never fails: when both sources fail the envelope is empty, has no
    /// `source`, and carries the error text.
    pub async fn fetch_page(&self, request: PageRequest) -> PageEnvelope {
        let mut last_error = None;

        for source in [&self.primary, &self.fallback] {
            match self.fetch_source_page(source, request).await {
                Ok((items, total)) => {
                    info!(
                        source = %source.url,
                        page = request.page,
                        count = items.len(),
                        total,
                        "Served character page"
                    );
                    return PageEnvelope {
                        page: request.page,
                        per_page: request.per_page,
                        total,
                        data: items.iter().map(normalize_character).collect(),
                        source: Some(source.url.clone()),
                        error: None,
                    };
                }
                Err(e) => {
                    warn!(source = %source.url, error = %e, "Upstream attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no upstream sources configured".to_string());
        error!(error = %message, "All upstream sources failed");
        PageEnvelope::failed(request, message)
    }

    /// Look up one character by id or name
    ///
    /// Tries `{primary}/{id}` first, then searches the fallback's full
    /// collection for a matching `id`, `_id`, or case-insensitive name.
    pub async fn fetch_by_id(&self, id: &str) -> Result<CharacterEnvelope, LookupError> {
        match self.fetch_primary_item(id).await {
            Ok((item, url)) => {
                return Ok(CharacterEnvelope {
                    data: normalize_character(&item),
                    source: url,
                });
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Primary lookup failed, searching fallback collection");
            }
        }

        let body = self.get_json(&self.fallback.url, &[]).await.map_err(|e| {
            error!(id = %id, error = %e, "Fallback lookup failed");
            e
        })?;

        extract_items(body)
            .iter()
            .find(|item| matches_identifier(item, id))
            .map(|item| CharacterEnvelope {
                data: normalize_character(item),
                source: self.fallback.url.clone(),
            })
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }

    async fn fetch_primary_item(&self, id: &str) -> Result<(Value, String), UpstreamError> {
        let url = item_url(&self.primary.url, id)?;
        let body = self.get_json(&url, &[]).await?;
        let item = first_item(body).ok_or_else(|| UpstreamError::Empty(url.clone()))?;
        Ok((item, url))
    }

    /// Items for one page plus the collection total
    async fn fetch_source_page(
        &self,
        source: &SourceConfig,
        request: PageRequest,
    ) -> Result<(Vec<Value>, usize), UpstreamError> {
        if source.native_pagination {
            let query = [
                ("page", request.page.to_string()),
                ("limit", request.per_page.to_string()),
            ];
            let body = self.get_json(&source.url, &query).await?;
            let declared = declared_total(&body);
            let items = extract_items(body);

            // Source ignored the paging parameters and sent everything
            if items.len() > request.per_page {
                let total = declared.unwrap_or(items.len()).max(items.len());
                return Ok((request.slice(items), total));
            }
            let total = declared.unwrap_or(items.len());
            Ok((items, total))
        } else {
            let body = self.get_json(&source.url, &[]).await?;
            let items = extract_items(body);
            let total = items.len();
            Ok((request.slice(items), total))
        }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        debug!(url = %url, ?query, "Querying upstream");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| UpstreamError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// `{base}/{id}` with `id` percent-encoded as one path segment
///
/// `.` and `..` are refused: URL normalization would drop them and address
/// the collection itself.
fn item_url(base: &str, id: &str) -> Result<String, UpstreamError> {
    if id == "." || id == ".." {
        return Err(UpstreamError::InvalidUrl(format!("{}/{}", base, id)));
    }
    let mut url = Url::parse(base).map_err(|_| UpstreamError::InvalidUrl(base.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(id);
    Ok(url.into())
}

/// Character array from a bare array, `{ data: [...] }` or `{ characters: [...] }`
pub fn extract_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => COLLECTION_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn declared_total(body: &Value) -> Option<usize> {
    TOTAL_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_u64))
        .map(|total| total as usize)
}

/// Single-item body: an object, or the first element of an array
///
/// An object wrapping a collection is a listing, not a character.
fn first_item(body: Value) -> Option<Value> {
    match body {
        Value::Object(ref map)
            if COLLECTION_KEYS
                .iter()
                .any(|key| matches!(map.get(*key), Some(Value::Array(_)))) =>
        {
            None
        }
        Value::Object(_) => Some(body),
        Value::Array(items) => items.into_iter().find(|item| !item.is_null()),
        _ => None,
    }
}

/// Match on `id`/`_id` as strings, or on the name ignoring case (or its slug)
fn matches_identifier(item: &Value, id: &str) -> bool {
    let as_text = |value: Option<&Value>| match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    if as_text(item.get("id")).as_deref() == Some(id)
        || as_text(item.get("_id")).as_deref() == Some(id)
    {
        return true;
    }

    item.get("name")
        .and_then(Value::as_str)
        .map(|name| {
            let wanted = id.to_lowercase();
            name.to_lowercase() == wanted || slugify(name) == wanted
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_items_shapes() {
        assert_eq!(extract_items(json!([{ "a": 1 }])).len(), 1);
        assert_eq!(extract_items(json!({ "data": [1, 2] })).len(), 2);
        assert_eq!(extract_items(json!({ "characters": [1, 2, 3], "total": 9 })).len(), 3);
        assert_eq!(extract_items(json!({ "data": "nope", "characters": [1] })).len(), 1);
        assert!(extract_items(json!({ "other": [1] })).is_empty());
        assert!(extract_items(json!("text")).is_empty());
    }

    #[test]
    fn test_declared_total() {
        assert_eq!(declared_total(&json!({ "total": 1431 })), Some(1431));
        assert_eq!(declared_total(&json!({ "totalCharacters": 12 })), Some(12));
        assert_eq!(declared_total(&json!([1, 2])), None);
    }

    #[test]
    fn test_item_url_encodes_segment() {
        assert_eq!(
            item_url("https://api.test/characters", "42").unwrap(),
            "https://api.test/characters/42"
        );
        assert_eq!(
            item_url("https://api.test/characters/", "Rock Lee").unwrap(),
            "https://api.test/characters/Rock%20Lee"
        );
        assert!(item_url("not a url", "1").is_err());
    }

    #[test]
    fn test_item_url_refuses_dot_segments() {
        assert!(matches!(
            item_url("https://api.test/characters", "."),
            Err(UpstreamError::InvalidUrl(_))
        ));
        assert!(item_url("https://api.test/characters", "..").is_err());
        assert_eq!(
            item_url("https://api.test/characters", "...").unwrap(),
            "https://api.test/characters/..."
        );
    }

    #[test]
    fn test_first_item() {
        assert_eq!(first_item(json!({ "id": 1 })), Some(json!({ "id": 1 })));
        assert_eq!(first_item(json!([null, { "id": 2 }])), Some(json!({ "id": 2 })));
        assert_eq!(first_item(json!([])), None);
        assert_eq!(first_item(json!(null)), None);
        assert_eq!(first_item(json!({ "characters": [{ "id": 1 }], "total": 1 })), None);
        assert_eq!(first_item(json!({ "data": [] })), None);
        assert_eq!(
            first_item(json!({ "id": 3, "data": "notes" })),
            Some(json!({ "id": 3, "data": "notes" }))
        );
    }

    #[test]
    fn test_matches_identifier() {
        let item = json!({ "id": 1344, "_id": "abc", "name": "Naruto Uzumaki" });
        assert!(matches_identifier(&item, "1344"));
        assert!(matches_identifier(&item, "abc"));
        assert!(matches_identifier(&item, "NARUTO UZUMAKI"));
        assert!(matches_identifier(&item, "naruto-uzumaki"));
        assert!(!matches_identifier(&item, "sasuke"));
        assert!(!matches_identifier(&json!({}), "1"));
    }

    #[test]
    fn test_failed_envelope() {
        let envelope = PageEnvelope::failed(PageRequest::default(), "boom".to_string());
        assert!(envelope.is_upstream_failure());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["total"], 0);
        assert_eq!(value["perPage"], 50);
        assert!(value["source"].is_null());
        assert_eq!(value["error"], "boom");
    }
}
