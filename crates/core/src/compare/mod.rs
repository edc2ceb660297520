#![forbid(unsafe_code)]

mod maps;
mod requirements;

pub use maps::*;
pub use requirements::*;

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Recursively sorts object keys, and sorts arrays of records by their canonical
/// serialized form. Arrays holding only primitives keep their order.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), normalize(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            let mut normalized: Vec<Value> = items.iter().map(normalize).collect();
            if normalized.iter().any(is_composite) {
                normalized.sort_by(compare_by_sort_key);
            }
            Value::Array(normalized)
        }
        other => other.clone(),
    }
}

/// Recursively sorts object keys and leaves arrays in their given order.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                out.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Canonical serialization: normalized, compact JSON.
pub fn canonical_string(value: &Value) -> String {
    serialize(&normalize(value))
}

/// `None` (not asserted) and `Some(Value::Null)` are different values.
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => canonical_string(a) == canonical_string(b),
        _ => false,
    }
}

/// Checks only what the patch asserts: every key of an object patch must hold
/// against the same key of the canonical value, recursively. Non-object patch
/// values fall back to [`values_equal`].
pub fn compare_subset(patch: Option<&Value>, canonical: Option<&Value>) -> bool {
    let Some(patch) = patch else {
        return true;
    };
    match patch {
        Value::Object(patch_map) => {
            let Some(Value::Object(canonical_map)) = canonical else {
                return false;
            };
            patch_map
                .iter()
                .all(|(key, value)| compare_subset(Some(value), canonical_map.get(key)))
        }
        _ => values_equal(Some(patch), canonical),
    }
}

/// Short human-readable rendering for detail messages.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "<absent>".to_string(),
        Some(value) => canonical_string(value),
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Object(_) | Value::Array(_) => serialize(value),
    }
}

fn compare_by_sort_key(a: &Value, b: &Value) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn serialize(value: &Value) -> String {
    // Value's Display never fails; keys were already ordered by normalize.
    value.to_string()
}
