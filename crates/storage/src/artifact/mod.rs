#![forbid(unsafe_code)]

use crate::StoreError;
use crate::source::{ClassRecords, SourceStore};
use ov_core::compare::sort_keys;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// The compiled overlay: every override and addition in one versioned document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub version: String,
    pub generated_at: String,
    pub sha256: String,
    pub overrides: Map<String, Value>,
    pub additions: Map<String, Value>,
}

/// Merges the source store into an artifact. The hash covers the content only,
/// so rebuilding unchanged sources yields the same `sha256`.
pub fn compile(
    store: &SourceStore,
    version: &str,
    generated_at: OffsetDateTime,
) -> Result<Artifact, StoreError> {
    let version = version.trim();
    if version.is_empty() {
        return Err(StoreError::InvalidInput("artifact version must not be empty"));
    }
    let generated_at = generated_at
        .format(&Rfc3339)
        .map_err(|_| StoreError::InvalidInput("generated_at is not representable as RFC 3339"))?;

    let overrides = merge_classes(store.overrides());
    let additions = merge_classes(store.additions());
    let sha256 = content_hash(&overrides, &additions);
    tracing::info!(
        version,
        sha256 = %sha256,
        records = store.record_count(),
        "compiled artifact"
    );

    Ok(Artifact {
        version: version.to_string(),
        generated_at,
        sha256,
        overrides,
        additions,
    })
}

/// SHA-256 over the content with object keys sorted. Array order is part of
/// the shipped document, so it is part of the hash.
pub fn content_hash(overrides: &Map<String, Value>, additions: &Map<String, Value>) -> String {
    let content = json!({ "overrides": overrides, "additions": additions });
    let mut hasher = Sha256::new();
    hasher.update(sort_keys(&content).to_string().as_bytes());
    hex(&hasher.finalize())
}

pub fn write_artifact(path: &Path, artifact: &Artifact) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }
    let mut body = serde_json::to_string_pretty(artifact).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    body.push('\n');
    std::fs::write(path, body).map_err(|err| StoreError::io(path, err))?;
    tracing::info!(path = %path.display(), "wrote artifact");
    Ok(())
}

fn merge_classes(classes: &BTreeMap<String, ClassRecords>) -> Map<String, Value> {
    classes
        .iter()
        .map(|(class, records)| {
            let merged: Map<String, Value> = records
                .records()
                .iter()
                .map(|(id, record)| (id.clone(), record.clone()))
                .collect();
            (class.clone(), Value::Object(merged))
        })
        .collect()
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
