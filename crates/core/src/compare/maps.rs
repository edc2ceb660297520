#![forbid(unsafe_code)]

use serde_json::Value;
use std::collections::BTreeSet;

/// Variant locations that collapse to their base location.
pub const MAP_ALIASES: &[(&str, &str)] = &[
    ("Night Factory", "Factory"),
    ("night-factory", "factory"),
    ("Ground Zero 21+", "Ground Zero"),
    ("ground-zero-21", "ground-zero"),
];

pub fn resolve_map_alias(name: &str) -> &str {
    let name = name.trim();
    MAP_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, base)| *base)
        .unwrap_or(name)
}

/// Stable key for a map reference: aliased `name`, else `normalizedName`, else `id`.
/// A bare string is treated as a name. Absent or null references have no key.
pub fn canonical_map_key(map_ref: Option<&Value>) -> Option<String> {
    match map_ref? {
        Value::String(name) => non_empty(name).map(|name| resolve_map_alias(name).to_string()),
        Value::Object(obj) => {
            for field in ["name", "normalizedName"] {
                if let Some(name) = obj.get(field).and_then(Value::as_str).and_then(non_empty) {
                    return Some(resolve_map_alias(name).to_string());
                }
            }
            obj.get("id")
                .and_then(Value::as_str)
                .and_then(non_empty)
                .map(str::to_string)
        }
        _ => None,
    }
}

/// Collects canonical keys from a `maps` list (or a single map reference).
pub fn collect_map_keys(maps: Option<&Value>, out: &mut BTreeSet<String>) {
    match maps {
        Some(Value::Array(items)) => {
            for item in items {
                if let Some(key) = canonical_map_key(Some(item)) {
                    out.insert(key);
                }
            }
        }
        Some(single) => {
            if let Some(key) = canonical_map_key(Some(single)) {
                out.insert(key);
            }
        }
        None => {}
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
