//! Empty-value elision for payload maps.

use serde_json::{Map, Value};

/// Whether a value carries information worth sending.
///
/// Nulls, empty strings, empty arrays and empty objects are blank.
/// Booleans and numbers never are, `false` and `0` included.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Return a copy of `dict` without blank entries.
///
/// Only the top level is inspected; nested maps are kept as they are as long
/// as they are not empty themselves.
pub fn filter_dict(dict: &Map<String, Value>) -> Map<String, Value> {
    dict.iter()
        .filter(|(_, value)| !is_blank(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Owned variant of [`filter_dict`], used while assembling payloads.
pub(crate) fn filtered(dict: Map<String, Value>) -> Map<String, Value> {
    dict.into_iter().filter(|(_, value)| !is_blank(value)).collect()
}
