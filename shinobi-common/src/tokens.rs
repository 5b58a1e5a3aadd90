//! String token flattening for loosely-shaped JSON values
//!
//! Upstream character APIs report the same attribute as a string, an array,
//! or a nested object depending on the source. [`Tokens`] walks any JSON
//! value and produces a flat list of trimmed, non-empty string tokens, with
//! optional comma splitting, deduplication and a rejection predicate.

use serde_json::Value;

/// Rejection predicate for registration/ID numbers such as `012607` or `01-23`
///
/// A token made only of ASCII digits and hyphens is not a meaningful
/// display value.
pub fn is_registration_number(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Configurable flattener turning a JSON value into string tokens
///
/// # Examples
/// ```
/// use serde_json::json;
/// use shinobi_common::tokens::{is_registration_number, Tokens};
///
/// let value = json!({ "ninjaRank": "Genin, Chunin", "ninjaRegistration": "012345" });
/// let tokens = Tokens::new()
///     .split_commas()
///     .reject(is_registration_number)
///     .collect(&value);
/// assert_eq!(tokens, vec!["Genin", "Chunin"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tokens {
    depth: usize,
    split_commas: bool,
    dedupe: bool,
    reject: Option<fn(&str) -> bool>,
}

impl Default for Tokens {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokens {
    /// Unlimited depth, no splitting, no dedupe, no rejection
    pub fn new() -> Self {
        Self {
            depth: usize::MAX,
            split_commas: false,
            dedupe: false,
            reject: None,
        }
    }

    /// Limit how many array/object levels are opened
    ///
    /// `depth(1)` reads the elements of a top-level container but ignores
    /// containers nested inside it.
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Split string values on `,` before trimming
    pub fn split_commas(mut self) -> Self {
        self.split_commas = true;
        self
    }

    /// Drop repeated tokens, keeping the first occurrence
    pub fn dedupe(mut self) -> Self {
        self.dedupe = true;
        self
    }

    /// Drop every token for which `predicate` returns true
    pub fn reject(mut self, predicate: fn(&str) -> bool) -> Self {
        self.reject = Some(predicate);
        self
    }

    /// Flatten `value` into tokens in document order
    pub fn collect(&self, value: &Value) -> Vec<String> {
        let mut out = Vec::new();
        self.walk(value, self.depth, &mut out);
        out
    }

    /// First surviving token, if any
    pub fn first(&self, value: &Value) -> Option<String> {
        self.collect(value).into_iter().next()
    }

    fn walk(&self, value: &Value, remaining: usize, out: &mut Vec<String>) {
        match value {
            Value::Null => {}
            Value::String(s) => self.push(s, out),
            Value::Number(n) => self.push(&n.to_string(), out),
            Value::Bool(b) => self.push(&b.to_string(), out),
            Value::Array(items) if remaining > 0 => {
                for item in items {
                    self.walk(item, remaining - 1, out);
                }
            }
            Value::Object(map) if remaining > 0 => {
                for item in map.values() {
                    self.walk(item, remaining - 1, out);
                }
            }
            _ => {}
        }
    }

    fn push(&self, text: &str, out: &mut Vec<String>) {
        if self.split_commas {
            for piece in text.split(',') {
                self.accept(piece, out);
            }
        } else {
            self.accept(text, out);
        }
    }

    fn accept(&self, piece: &str, out: &mut Vec<String>) {
        let token = piece.trim();
        if token.is_empty() {
            return;
        }
        if let Some(reject) = self.reject {
            if reject(token) {
                return;
            }
        }
        if self.dedupe && out.iter().any(|seen| seen == token) {
            return;
        }
        out.push(token.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registration_number_predicate() {
        assert!(is_registration_number("012607"));
        assert!(is_registration_number("01-23-45"));
        assert!(!is_registration_number(""));
        assert!(!is_registration_number("Genin"));
        assert!(!is_registration_number("Team 7"));
    }

    #[test]
    fn test_scalars_become_tokens() {
        let tokens = Tokens::new().collect(&json!(["  Kage ", 7, true, null, ""]));
        assert_eq!(tokens, vec!["Kage", "7", "true"]);
    }

    #[test]
    fn test_depth_limit_skips_nested_containers() {
        let value = json!({ "a": "top", "b": { "c": "nested" } });
        assert_eq!(Tokens::new().depth(1).collect(&value), vec!["top"]);
        assert_eq!(Tokens::new().depth(2).collect(&value), vec!["top", "nested"]);
        assert!(Tokens::new().depth(0).collect(&value).is_empty());
    }

    #[test]
    fn test_split_and_dedupe() {
        let value = json!(["Hokage, Ninja", "Ninja", { "x": "Hokage" }]);
        let tokens = Tokens::new().split_commas().dedupe().collect(&value);
        assert_eq!(tokens, vec!["Hokage", "Ninja"]);
    }

    #[test]
    fn test_reject_predicate_applies_after_trim() {
        let value = json!("Genin,  012345 , Medic");
        let tokens = Tokens::new()
            .split_commas()
            .reject(is_registration_number)
            .collect(&value);
        assert_eq!(tokens, vec!["Genin", "Medic"]);
    }

    #[test]
    fn test_first_on_empty_input() {
        assert_eq!(Tokens::new().first(&json!({})), None);
        assert_eq!(Tokens::new().first(&json!(null)), None);
    }
}
