#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("yaml in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid schema {name}: {message}")]
    InvalidSchema { name: String, message: String },
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid shape in {}: {message}", path.display())]
    InvalidShape { path: PathBuf, message: String },
    #[error("duplicate id {id} in class {class} ({} and {})", first.display(), second.display())]
    DuplicateId {
        class: String,
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
