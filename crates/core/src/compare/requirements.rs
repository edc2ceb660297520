#![forbid(unsafe_code)]

use serde_json::Value;
use std::collections::BTreeSet;

/// Requirement statuses that only hold while a task is in progress.
pub const INACTIVE_REQUIREMENT_STATUSES: &[&str] = &["active", "accepted"];

/// Referenced task ID of a requirement entry: `task.id`, else `id`.
pub fn requirement_id(entry: &Value) -> Option<&str> {
    entry
        .get("task")
        .and_then(|task| task.get("id"))
        .or_else(|| entry.get("id"))
        .and_then(Value::as_str)
}

/// Requirement lists compare as sorted sets of referenced IDs.
pub fn requirement_id_set<'a>(entries: impl IntoIterator<Item = &'a Value>) -> BTreeSet<String> {
    entries
        .into_iter()
        .filter_map(requirement_id)
        .map(str::to_string)
        .collect()
}

pub fn is_inactive_requirement(entry: &Value) -> bool {
    let inactive = |status: &str| {
        INACTIVE_REQUIREMENT_STATUSES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(status.trim()))
    };
    match entry.get("status") {
        Some(Value::Array(statuses)) => statuses.iter().filter_map(Value::as_str).any(inactive),
        Some(Value::String(status)) => inactive(status),
        _ => false,
    }
}
