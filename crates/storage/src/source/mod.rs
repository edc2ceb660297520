#![forbid(unsafe_code)]

mod lint;
mod schema;

pub use lint::*;
pub use schema::*;

use crate::StoreError;
use ov_core::PatchSet;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const SUPPORTED_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Override,
    Addition,
}

impl SourceKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Override => "overrides",
            Self::Addition => "additions",
        }
    }
}

/// Records of one entity class, with the file each record came from.
#[derive(Clone, Debug, Default)]
pub struct ClassRecords {
    records: PatchSet,
    origins: BTreeMap<String, PathBuf>,
}

impl ClassRecords {
    pub fn records(&self) -> &PatchSet {
        &self.records
    }

    pub fn origin(&self, id: &str) -> Option<&Path> {
        self.origins.get(id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, class: &str, id: &str, record: Value, path: &Path) -> Result<(), StoreError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(StoreError::InvalidInput("record id must not be empty"));
        }
        if let Some(first) = self.origins.get(id) {
            return Err(StoreError::DuplicateId {
                class: class.to_string(),
                id: id.to_string(),
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        self.origins.insert(id.to_string(), path.to_path_buf());
        self.records.insert(id.to_string(), record);
        Ok(())
    }
}

/// Human-edited patch records read from `<root>/overrides` and `<root>/additions`.
///
/// Each class is either a single `<class>.json|yaml|yml` file or a `<class>/`
/// directory of such files; every file maps entity ID to record.
#[derive(Clone, Debug)]
pub struct SourceStore {
    root: PathBuf,
    overrides: BTreeMap<String, ClassRecords>,
    additions: BTreeMap<String, ClassRecords>,
}

impl SourceStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(StoreError::InvalidShape {
                path: root,
                message: "source root must be a directory".to_string(),
            });
        }
        let overrides = load_kind(&root, SourceKind::Override)?;
        let additions = load_kind(&root, SourceKind::Addition)?;
        tracing::info!(
            root = %root.display(),
            override_classes = overrides.len(),
            addition_classes = additions.len(),
            "loaded source store"
        );
        Ok(Self {
            root,
            overrides,
            additions,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn classes(&self, kind: SourceKind) -> &BTreeMap<String, ClassRecords> {
        match kind {
            SourceKind::Override => &self.overrides,
            SourceKind::Addition => &self.additions,
        }
    }

    pub fn overrides(&self) -> &BTreeMap<String, ClassRecords> {
        &self.overrides
    }

    pub fn additions(&self) -> &BTreeMap<String, ClassRecords> {
        &self.additions
    }

    pub fn override_class(&self, class: &str) -> Option<&PatchSet> {
        self.overrides.get(class).map(ClassRecords::records)
    }

    pub fn record_count(&self) -> usize {
        self.overrides
            .values()
            .chain(self.additions.values())
            .map(ClassRecords::len)
            .sum()
    }
}

fn load_kind(root: &Path, kind: SourceKind) -> Result<BTreeMap<String, ClassRecords>, StoreError> {
    let dir = root.join(kind.dir_name());
    let mut classes = BTreeMap::<String, ClassRecords>::new();
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no source directory");
        return Ok(classes);
    }

    for entry in sorted_entries(&dir)? {
        let Some(name) = entry.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if entry.is_dir() {
            let records = classes.entry(name.clone()).or_default();
            for file in sorted_entries(&entry)? {
                if file.is_file() && is_supported(&file) {
                    load_file(&name, &file, records)?;
                }
            }
        } else if is_supported(&entry) {
            let Some(class) = entry.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let records = classes.entry(class.clone()).or_default();
            load_file(&class, &entry, records)?;
        }
    }
    Ok(classes)
}

fn load_file(class: &str, path: &Path, records: &mut ClassRecords) -> Result<(), StoreError> {
    let raw = std::fs::read_to_string(path).map_err(|err| StoreError::io(path, err))?;
    let value = parse_document(path, &raw)?;
    let Value::Object(entries) = value else {
        return Err(StoreError::InvalidShape {
            path: path.to_path_buf(),
            message: "file must map entity ids to records".to_string(),
        });
    };
    tracing::debug!(class, path = %path.display(), records = entries.len(), "read source file");
    for (id, record) in entries {
        records.insert(class, &id, record, path)?;
    }
    Ok(())
}

/// Parses JSON or YAML depending on the file extension.
pub fn parse_document(path: &Path, raw: &str) -> Result<Value, StoreError> {
    match extension(path).as_deref() {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str::<Value>(raw).map_err(|source| StoreError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => serde_json::from_str::<Value>(raw).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|err| StoreError::io(dir, err))? {
        let entry = entry.map_err(|err| StoreError::io(dir, err))?;
        out.push(entry.path());
    }
    out.sort();
    Ok(out)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}
