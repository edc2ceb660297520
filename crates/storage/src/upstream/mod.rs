#![forbid(unsafe_code)]

use crate::StoreError;
use crate::source::parse_document;
use ov_core::CanonicalSet;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Source of the canonical upstream records, one set per entity class.
pub trait UpstreamProvider {
    fn fetch(&self) -> Result<UpstreamSnapshot, StoreError>;
}

/// A fully materialised upstream snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpstreamSnapshot {
    classes: BTreeMap<String, CanonicalSet>,
}

impl UpstreamSnapshot {
    pub fn new(classes: BTreeMap<String, CanonicalSet>) -> Self {
        Self { classes }
    }

    pub fn class(&self, class: &str) -> Option<&CanonicalSet> {
        self.classes.get(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Accepts `{class: [records]}`, `{class: {id: record}}` or either wrapped
    /// in a `{"data": ...}` envelope.
    pub fn from_value(value: Value) -> Result<Self, &'static str> {
        let value = match value {
            Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };
        let Value::Object(classes) = value else {
            return Err("snapshot must map entity classes to records");
        };

        let mut out = BTreeMap::new();
        for (class, records) in classes {
            let set = match records {
                Value::Array(items) => index_by_id(&class, items),
                Value::Object(map) => map.into_iter().collect(),
                _ => return Err("snapshot classes must be lists or id-keyed mappings"),
            };
            out.insert(class, set);
        }
        Ok(Self { classes: out })
    }
}

fn index_by_id(class: &str, items: Vec<Value>) -> CanonicalSet {
    let mut set = CanonicalSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let Some(id) = item.get("id").and_then(Value::as_str).map(str::to_string) else {
            tracing::warn!(class, index, "upstream record without id skipped");
            continue;
        };
        set.insert(id, item);
    }
    set
}

/// Snapshot saved to disk as JSON or YAML.
#[derive(Clone, Debug)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UpstreamProvider for SnapshotFile {
    fn fetch(&self) -> Result<UpstreamSnapshot, StoreError> {
        let raw =
            std::fs::read_to_string(&self.path).map_err(|err| StoreError::io(&self.path, err))?;
        let value = parse_document(&self.path, &raw)?;
        let snapshot =
            UpstreamSnapshot::from_value(value).map_err(|message| StoreError::InvalidShape {
                path: self.path.clone(),
                message: message.to_string(),
            })?;
        tracing::info!(
            path = %self.path.display(),
            classes = snapshot.classes.len(),
            "loaded upstream snapshot"
        );
        Ok(snapshot)
    }
}
