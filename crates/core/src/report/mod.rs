#![forbid(unsafe_code)]

use crate::verdict::Verdict;
use serde::Serialize;

/// Disjoint partition of a verdict list.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorized {
    pub still_needed: Vec<Verdict>,
    pub fixed: Vec<Verdict>,
    pub removed_from_api: Vec<Verdict>,
}

impl Categorized {
    pub fn len(&self) -> usize {
        self.still_needed.len() + self.fixed.len() + self.removed_from_api.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> ReconcileSummary {
        ReconcileSummary {
            total: self.len(),
            still_needed: self.still_needed.len(),
            fixed: self.fixed.len(),
            removed_from_api: self.removed_from_api.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub total: usize,
    pub still_needed: usize,
    pub fixed: usize,
    pub removed_from_api: usize,
}

pub fn categorize(verdicts: &[Verdict]) -> Categorized {
    categorize_owned(verdicts.to_vec())
}

/// Same as [`categorize`] but takes ownership of the verdicts.
pub fn categorize_owned(verdicts: Vec<Verdict>) -> Categorized {
    let mut out = Categorized::default();
    for verdict in verdicts {
        if verdict.status.is_absent() {
            out.removed_from_api.push(verdict);
        } else if verdict.still_needed {
            out.still_needed.push(verdict);
        } else {
            out.fixed.push(verdict);
        }
    }
    out
}
