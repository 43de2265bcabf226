//! Serializer trait and registry

use super::codecs::JsonSerializer;
use crate::error::{Error, Result};
use crate::value::Value;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the serializer used when none is configured
pub const DEFAULT_SERIALIZER: &str = "json";

/// Encodes request bodies and decodes response bodies
pub trait Serializer: Send + Sync + fmt::Debug {
    /// MIME type sent in `accept` and `content-type` headers
    fn mime(&self) -> &str;

    /// Encode a value into a request body
    fn encode(&self, value: &Value) -> Result<Bytes>;

    /// Decode a response body; malformed input fails with `Error::Serialization`
    fn decode(&self, body: &[u8]) -> Result<Value>;
}

/// Maps serializer names to implementations
#[derive(Clone)]
pub struct SerializerRegistry {
    serializers: HashMap<String, Arc<dyn Serializer>>,
}

impl SerializerRegistry {
    /// Create a registry with no serializers
    pub fn empty() -> Self {
        Self {
            serializers: HashMap::new(),
        }
    }

    /// Register (or replace) a serializer under a name
    pub fn register(&mut self, name: impl Into<String>, serializer: Arc<dyn Serializer>) {
        self.serializers.insert(name.into(), serializer);
    }

    /// Look up a serializer by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Serializer>> {
        self.serializers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSerializer {
                name: name.to_string(),
            })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.serializers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(DEFAULT_SERIALIZER, Arc::new(JsonSerializer::new()));
        registry
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("names", &self.names())
            .finish()
    }
}
