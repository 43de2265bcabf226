//! Common types used throughout syndicate
//!
//! HTTP method and query string types shared by the service, the
//! transport adapters and the pagers.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// A query parameter value: a single value or a sequence of values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

/// Ordered query parameters
///
/// Sequence values expand to repeated `key=value` pairs, never to a
/// comma-joined value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, QueryValue::Single(value.to_string()));
        self
    }

    /// Set a sequence-valued parameter
    #[must_use]
    pub fn values<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.insert(key, QueryValue::Many(values));
        self
    }

    /// Insert or replace a parameter, keeping its original position
    pub fn insert(&mut self, key: impl Into<String>, value: QueryValue) {
        let key = key.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Flatten into `key=value` pairs, repeating keys for sequences
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.params.len());
        for (key, value) in &self.params {
            match value {
                QueryValue::Single(v) => pairs.push((key.clone(), v.clone())),
                QueryValue::Many(vs) => {
                    pairs.extend(vs.iter().map(|v| (key.clone(), v.clone())));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(Method::PATCH), reqwest::Method::PATCH);
        assert_eq!(Method::default(), Method::GET);
        assert_eq!(Method::DELETE.to_string(), "DELETE");
    }

    #[test]
    fn test_query_sequence_expands_to_repeated_pairs() {
        let query = Query::new()
            .param("q", "rust")
            .values("tag", ["a", "b", "c"]);

        assert_eq!(
            query.to_pairs(),
            vec![
                ("q".to_string(), "rust".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
                ("tag".to_string(), "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_param_replaces_in_place() {
        let query = Query::new().param("a", 1).param("b", 2).param("a", 3);

        assert_eq!(query.len(), 2);
        assert_eq!(query.get("a"), Some(&QueryValue::Single("3".to_string())));
        assert_eq!(query.to_pairs()[0].0, "a");
    }

    #[test]
    fn test_query_empty() {
        let query = Query::new();
        assert!(query.is_empty());
        assert!(query.to_pairs().is_empty());
    }
}
