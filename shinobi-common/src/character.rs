//! Character normalization
//!
//! The two upstream character APIs disagree on field names and shapes
//! (`id` vs `_id`, `rank` as a string or a per-arc object, `occupation` as a
//! string, array or nested object, some attributes under `personal`).
//! [`normalize_character`] maps any of those shapes into one flat
//! [`NormalizedCharacter`] used by both the JSON API and the HTML pages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tokens::{is_registration_number, Tokens};

/// Name used when no name alias is present
pub const UNKNOWN_NAME: &str = "Unknown";

const ID_KEYS: &[&str] = &["id", "_id"];
const NAME_KEYS: &[&str] = &["name", "fullName", "title"];
const VILLAGE_KEYS: &[&str] = &["village", "origin", "villageOf"];
const RANK_KEYS: &[&str] = &["rank", "ninjaRank"];
const CHAKRA_KEYS: &[&str] = &["chakraNature", "element", "natureType"];
const JUTSU_COUNT_KEYS: &[&str] = &["jutsuCount", "jutsu_count", "numJutsu"];
const JUTSU_LIST_KEYS: &[&str] = &["techniques", "jutsu", "jutsus"];
const CLAN_OBJECT_KEYS: &[&str] = &["clan", "name", "family", "clanName", "bloodline"];

/// Sub-object some sources use for biographical attributes
const PERSONAL_KEY: &str = "personal";

/// Fixed-shape character record served to clients
///
/// Only `name` is guaranteed. `image` serializes as `null` when absent; the
/// other optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCharacter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chakra_nature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jutsu_count: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
    /// Unmodified upstream record
    #[serde(default)]
    pub raw: Value,
}

impl NormalizedCharacter {
    /// First non-null top-level field of the raw record among `keys`
    ///
    /// Used for attributes that are displayed but not normalized
    /// (description, age, parents, plan). Falls back to the same keys under
    /// `personal`.
    pub fn extra(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .find_map(|key| field(&self.raw, key))
            .or_else(|| {
                let personal = field(&self.raw, PERSONAL_KEY)?;
                keys.iter().find_map(|key| field(personal, key))
            })
    }

    /// Path segment for this character's detail page: the id, else a name slug
    pub fn detail_key(&self) -> String {
        self.id.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

/// Lowercase `name` with whitespace runs replaced by `-`
///
/// ```
/// assert_eq!(shinobi_common::character::slugify("Rock  Lee"), "rock-lee");
/// ```
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalize one upstream record
///
/// Total: any JSON value is accepted, including non-objects, and the result
/// always carries a name.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use shinobi_common::normalize_character;
///
/// let c = normalize_character(&json!({ "name": "Sasuke", "chakraNature": ["Fire", "Lightning"] }));
/// assert_eq!(c.chakra_nature.as_deref(), Some("Fire, Lightning"));
/// assert_eq!(normalize_character(&json!({})).name, "Unknown");
/// ```
pub fn normalize_character(raw: &Value) -> NormalizedCharacter {
    NormalizedCharacter {
        id: ID_KEYS.iter().find_map(|key| field(raw, key).and_then(scalar_text)),
        name: NAME_KEYS
            .iter()
            .find_map(|key| field(raw, key).and_then(scalar_text))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        clan: with_personal(raw, &["clan"], "clan").find_map(resolve_clan),
        village: with_personal(raw, VILLAGE_KEYS, "affiliation").find_map(resolve_village),
        occupation: with_personal(raw, &["occupation"], "occupation").find_map(resolve_occupation),
        rank: RANK_KEYS
            .iter()
            .filter_map(|key| field(raw, key))
            .find_map(resolve_rank),
        chakra_nature: CHAKRA_KEYS
            .iter()
            .filter_map(|key| field(raw, key))
            .find_map(resolve_chakra),
        jutsu_count: resolve_jutsu_count(raw),
        image: resolve_image(raw),
        raw: raw.clone(),
    }
}

/// Non-null field lookup; non-objects have no fields
fn field<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| !value.is_null())
}

/// Top-level `keys` in order, then `personal.<personal_key>`
fn with_personal<'a>(
    raw: &'a Value,
    keys: &'a [&'a str],
    personal_key: &'a str,
) -> impl Iterator<Item = &'a Value> + 'a {
    keys.iter()
        .filter_map(move |key| field(raw, key))
        .chain(field(raw, PERSONAL_KEY).and_then(move |personal| field(personal, personal_key)))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn resolve_village(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(scalar_text),
        _ => None,
    }
}

/// Direct string, else first non-empty value one level into a keyed structure
fn resolve_rank(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) | Value::Array(_) => Tokens::new().depth(2).first(value),
        _ => None,
    }
}

fn resolve_chakra(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    }
}

fn resolve_jutsu_count(raw: &Value) -> Option<u64> {
    JUTSU_COUNT_KEYS
        .iter()
        .filter_map(|key| field(raw, key))
        .find_map(count_value)
        .or_else(|| {
            JUTSU_LIST_KEYS
                .iter()
                .find_map(|key| field(raw, key).and_then(Value::as_array))
                .map(|items| items.len() as u64)
        })
}

/// Positive integer from a number or numeric string; zero counts as absent
fn count_value(value: &Value) -> Option<u64> {
    let count = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    count.filter(|n| *n > 0)
}

fn resolve_occupation(value: &Value) -> Option<String> {
    let tokens = Tokens::new()
        .split_commas()
        .reject(is_registration_number)
        .dedupe()
        .collect(value);
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(", "))
    }
}

fn resolve_clan(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(_) => Tokens::new().depth(1).split_commas().first(value),
        Value::Object(map) => {
            let candidates = || CLAN_OBJECT_KEYS.iter().filter_map(|key| map.get(*key));
            candidates()
                .find_map(|candidate| match candidate {
                    Value::String(_) | Value::Number(_) => scalar_text(candidate),
                    _ => None,
                })
                .or_else(|| {
                    candidates()
                        .find_map(|candidate| candidate.as_array().and_then(|items| items.first()))
                        .and_then(|first| Tokens::new().first(first))
                })
                .or_else(|| Tokens::new().first(value))
        }
        _ => None,
    }
}

fn resolve_image(raw: &Value) -> Option<String> {
    field(raw, "images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(Value::as_str)
        .or_else(|| field(raw, "image").and_then(Value::as_str))
        .map(str::to_string)
}
