//! Tests for serializer module

use super::codecs::parse_iso_datetime;
use super::*;
use crate::error::Error;
use crate::value::{Map, Value};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_default_registry_has_json() {
    let registry = SerializerRegistry::default();
    assert_eq!(registry.names(), vec!["json"]);

    let json = registry.get(DEFAULT_SERIALIZER).unwrap();
    assert_eq!(json.mime(), "application/json");
}

#[test]
fn test_registry_unknown_name() {
    let registry = SerializerRegistry::default();
    let err = registry.get("xml").unwrap_err();
    assert!(matches!(err, Error::UnknownSerializer { name } if name == "xml"));
}

#[test]
fn test_registry_register_custom() {
    let mut registry = SerializerRegistry::empty();
    registry.register("raw-json", Arc::new(JsonSerializer::plain()));

    assert!(registry.get("json").is_err());
    assert!(registry.get("raw-json").is_ok());
}

// ============================================================================
// JSON Serializer Tests
// ============================================================================

#[test]
fn test_json_round_trip_with_nested_datetimes() {
    let born = Utc::now();
    let mut duck = Map::new();
    duck.insert("talk".into(), Value::from("Quack!"));
    duck.insert("walk".into(), Value::from(json!(0.001)));
    duck.insert("is_duck".into(), Value::from(true));
    duck.insert("born".into(), Value::from(born));
    duck.insert(
        "sightings".into(),
        Value::from(vec![Value::from(born), Value::from("pond")]),
    );
    let mut input = Map::new();
    input.insert("duck".into(), Value::from(duck));
    let input = Value::from(input);

    let serializer = JsonSerializer::new();
    let encoded = serializer.encode(&input).unwrap();
    let decoded = serializer.decode(&encoded).unwrap();

    assert_eq!(decoded, input);
}

#[test]
fn test_json_decode_coerces_offsets_to_utc() {
    let serializer = JsonSerializer::new();
    let value = serializer
        .decode(br#"{"at": "2024-05-01T10:00:00+02:00", "z": "2024-05-01T08:00:00Z"}"#)
        .unwrap();

    let expected = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    assert_eq!(value.get("at").unwrap().as_datetime(), Some(&expected));
    assert_eq!(value.get("z").unwrap().as_datetime(), Some(&expected));
}

#[test]
fn test_json_decode_leaves_non_datetimes_alone() {
    let serializer = JsonSerializer::new();
    let value = serializer
        .decode(br#"{"date_only": "2024-05-01", "no_offset": "2024-05-01T10:00:00", "bad": "2024-13-01T10:00:00Z"}"#)
        .unwrap();

    assert_eq!(value.get("date_only").unwrap().as_str(), Some("2024-05-01"));
    assert_eq!(
        value.get("no_offset").unwrap().as_str(),
        Some("2024-05-01T10:00:00")
    );
    assert_eq!(
        value.get("bad").unwrap().as_str(),
        Some("2024-13-01T10:00:00Z")
    );
}

#[test]
fn test_json_plain_does_not_coerce() {
    let serializer = JsonSerializer::plain();
    let value = serializer.decode(br#"["2024-05-01T10:00:00Z"]"#).unwrap();
    assert_eq!(value, Value::from(json!(["2024-05-01T10:00:00Z"])));
}

#[test]
fn test_json_encode_datetime_as_utc_iso() {
    let serializer = JsonSerializer::new();
    let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
    let encoded = serializer.encode(&Value::from(dt)).unwrap();
    assert_eq!(&encoded[..], br#""2020-01-02T03:04:05+00:00""#);
}

#[test]
fn test_json_decode_malformed() {
    let serializer = JsonSerializer::new();
    let err = serializer.decode(b"{not json").unwrap_err();
    assert!(matches!(err, Error::Serialization { .. }));
}

#[test]
fn test_parse_iso_datetime_fractional_seconds() {
    let dt = parse_iso_datetime("2024-01-01T00:00:00.250Z").unwrap();
    assert_eq!(dt.timestamp_subsec_millis(), 250);
    assert!(parse_iso_datetime("yesterday").is_none());
}
