//! Result containers
//!
//! A [`Record`] is created fresh for every call and owned by the caller.

use crate::value::{Map, Value};
use std::ops::Deref;

/// Key/values from the envelope's `meta` object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Map,
}

impl Metadata {
    pub fn new(entries: Map) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// The `next` cursor, if the remote sent one as a string
    pub fn next(&self) -> Option<&str> {
        self.get("next").and_then(Value::as_str)
    }

    /// The `total_count` entry, if numeric
    pub fn total_count(&self) -> Option<u64> {
        self.get("total_count").and_then(Value::as_u64)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn into_inner(self) -> Map {
        self.entries
    }
}

impl From<Map> for Metadata {
    fn from(entries: Map) -> Self {
        Self::new(entries)
    }
}

/// Object-shaped `data` with its metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRecord {
    data: Map,
    meta: Metadata,
}

impl ObjectRecord {
    pub fn new(data: Map, meta: Metadata) -> Self {
        Self { data, meta }
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn into_inner(self) -> Map {
        self.data
    }

    pub fn into_parts(self) -> (Map, Metadata) {
        (self.data, self.meta)
    }
}

impl Deref for ObjectRecord {
    type Target = Map;

    fn deref(&self) -> &Map {
        &self.data
    }
}

/// Sequence-shaped `data` with its metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceRecord {
    items: Vec<Value>,
    meta: Metadata,
}

impl SequenceRecord {
    pub fn new(items: Vec<Value>, meta: Metadata) -> Self {
        Self { items, meta }
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.items
    }

    pub fn into_parts(self) -> (Vec<Value>, Metadata) {
        (self.items, self.meta)
    }
}

impl Deref for SequenceRecord {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.items
    }
}

impl IntoIterator for SequenceRecord {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Unwrapped response data
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// No data (absent, null, or an empty body)
    Null,
    /// Data that is neither an object nor an array; carries no metadata
    Scalar(Value),
    Object(ObjectRecord),
    Sequence(SequenceRecord),
}

impl Record {
    /// Wrap extracted data according to its shape
    pub fn from_data(data: Option<Value>, meta: Metadata) -> Self {
        match data {
            None | Some(Value::Null) => Record::Null,
            Some(Value::Object(map)) => Record::Object(ObjectRecord::new(map, meta)),
            Some(Value::Array(items)) => Record::Sequence(SequenceRecord::new(items, meta)),
            Some(other) => Record::Scalar(other),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Record::Null => "null",
            Record::Scalar(_) => "scalar",
            Record::Object(_) => "object",
            Record::Sequence(_) => "sequence",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Record::Null)
    }

    /// Metadata attached to object and sequence records
    pub fn meta(&self) -> Option<&Metadata> {
        match self {
            Record::Object(o) => Some(o.meta()),
            Record::Sequence(s) => Some(s.meta()),
            Record::Null | Record::Scalar(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRecord> {
        match self {
            Record::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceRecord> {
        match self {
            Record::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Record::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Drop the metadata and return the data as a plain value
    pub fn into_value(self) -> Value {
        match self {
            Record::Null => Value::Null,
            Record::Scalar(v) => v,
            Record::Object(o) => Value::Object(o.into_inner()),
            Record::Sequence(s) => Value::Array(s.into_inner()),
        }
    }
}
