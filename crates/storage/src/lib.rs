#![forbid(unsafe_code)]

//! File-backed collaborators of the reconciliation engine: the human-edited
//! source store, upstream snapshots, and the compiled overlay artifact.

pub mod artifact;
mod error;
pub mod source;
pub mod upstream;

pub use artifact::{Artifact, compile, write_artifact};
pub use error::StoreError;
pub use source::{ClassRecords, LintIssue, RecordValidator, SourceKind, SourceStore};
pub use upstream::{SnapshotFile, UpstreamProvider, UpstreamSnapshot};
