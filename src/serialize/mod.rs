//! Serializer module
//!
//! Supports: JSON (with ISO-8601 datetime coercion)
//!
//! # Overview
//!
//! A serializer turns request bodies into bytes and response bodies back
//! into [`Value`](crate::value::Value)s. Serializers are looked up by name
//! in a [`SerializerRegistry`]; the default registry knows `"json"`.

mod codecs;
mod types;

pub use codecs::JsonSerializer;
pub use types::{Serializer, SerializerRegistry, DEFAULT_SERIALIZER};

#[cfg(test)]
mod tests;
