// src/utils/meta.rs

use serde::Serializer;
use serde_json::{Map, Value};

/// Parses the raw `meta` column of an attempt record.
///
/// Clients send either a JSON object or a string holding one, and older rows
/// may carry arbitrary text. Anything that does not yield an object becomes
/// an empty map.
pub fn parse_meta(raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw else {
        return Map::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

/// Returns `meta[key]` when it is a string.
pub fn meta_str<'a>(meta: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    meta.get(key).and_then(Value::as_str)
}

/// Serializes the stored `meta` text back into JSON for API responses.
/// Text that is not valid JSON is passed through as a plain string.
pub fn serialize_raw_meta<S>(raw: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match raw {
        None => serializer.serialize_none(),
        Some(text) => match serde_json::from_str::<Value>(text) {
            Ok(value) => serializer.serialize_some(&value),
            Err(_) => serializer.serialize_some(text),
        },
    }
}
