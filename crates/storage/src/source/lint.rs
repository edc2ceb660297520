#![forbid(unsafe_code)]

use super::{RecordValidator, SourceKind, SourceStore};
use crate::StoreError;
use ov_core::RecordLayout;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    pub kind: SourceKind,
    pub class: String,
    pub id: String,
    pub message: String,
}

impl SourceStore {
    /// Schema checks on every record; reconciliation assumes they pass.
    pub fn lint(&self, layout: &RecordLayout) -> Result<Vec<LintIssue>, StoreError> {
        let validator = RecordValidator::new(layout)?.with_class_schemas(&self.root)?;
        let mut issues = Vec::new();
        for kind in [SourceKind::Override, SourceKind::Addition] {
            for (class, records) in self.classes(kind) {
                for (id, record) in records.records() {
                    for message in validator.validate(class, record) {
                        issues.push(LintIssue {
                            kind,
                            class: class.clone(),
                            id: id.clone(),
                            message,
                        });
                    }
                }
            }
        }
        tracing::debug!(issues = issues.len(), "linted source store");
        Ok(issues)
    }
}
