//! Serializer implementations

use super::types::Serializer;
use crate::error::{Error, Result};
use crate::value::Value;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Strict ISO-8601 datetime with an explicit offset
static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
        .expect("ISO datetime pattern is valid")
});

// ============================================================================
// JSON Serializer
// ============================================================================

/// JSON serializer
///
/// On decode, every string that looks like an ISO-8601 datetime becomes a
/// `Value::DateTime` in UTC. This is a heuristic: a string that merely has
/// the shape of a datetime is converted too. Datetimes encode back to
/// ISO-8601 strings with a `+00:00` offset.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    coerce_datetimes: bool,
}

impl JsonSerializer {
    /// Create a JSON serializer with datetime coercion
    pub fn new() -> Self {
        Self {
            coerce_datetimes: true,
        }
    }

    /// Create a JSON serializer that leaves strings untouched
    pub fn plain() -> Self {
        Self {
            coerce_datetimes: false,
        }
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer for JsonSerializer {
    fn mime(&self) -> &str {
        "application/json"
    }

    fn encode(&self, value: &Value) -> Result<Bytes> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| Error::serialization(format!("Failed to encode JSON: {e}")))
    }

    fn decode(&self, body: &[u8]) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| Error::serialization(format!("Failed to parse JSON: {e}")))?;
        let value = Value::from(json);
        if self.coerce_datetimes {
            Ok(coerce_datetimes(value))
        } else {
            Ok(value)
        }
    }
}

/// Replace datetime-looking strings, at any depth, with native datetimes
fn coerce_datetimes(value: Value) -> Value {
    match value {
        Value::String(s) => match parse_iso_datetime(&s) {
            Some(dt) => Value::DateTime(dt),
            None => Value::String(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_datetimes).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_datetimes(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Parse a strict ISO-8601 datetime string into UTC
pub(crate) fn parse_iso_datetime(s: &str) -> Option<DateTime<Utc>> {
    if !ISO_DATETIME.is_match(s) {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
