#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Needed,
    Fixed,
    NotFound,
    RemovedFromApi,
}

impl VerdictStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Needed => "NEEDED",
            Self::Fixed => "FIXED",
            Self::NotFound => "NOT_FOUND",
            Self::RemovedFromApi => "REMOVED_FROM_API",
        }
    }

    /// Entity is absent upstream; field comparison never ran.
    pub fn is_absent(self) -> bool {
        matches!(self, Self::NotFound | Self::RemovedFromApi)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailStatus {
    Needed,
    Fixed,
    Check,
    Info,
}

impl DetailStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Needed => "needed",
            Self::Fixed => "fixed",
            Self::Check => "check",
            Self::Info => "info",
        }
    }

    pub fn keeps_patch(self) -> bool {
        matches!(self, Self::Needed | Self::Check)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDetail {
    pub field: String,
    pub status: DetailStatus,
    pub message: String,
}

impl FieldDetail {
    pub fn new(field: impl Into<String>, status: DetailStatus, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            status,
            message: message.into(),
        }
    }

    pub fn needed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, DetailStatus::Needed, message)
    }

    pub fn fixed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, DetailStatus::Fixed, message)
    }

    pub fn check(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, DetailStatus::Check, message)
    }

    pub fn info(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, DetailStatus::Info, message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub id: String,
    pub display_name: String,
    pub status: VerdictStatus,
    pub still_needed: bool,
    pub details: Vec<FieldDetail>,
}

impl Verdict {
    /// Builds a verdict whose status follows from the details: any `needed` or
    /// `check` detail keeps the patch.
    pub fn from_details(
        id: impl Into<String>,
        display_name: impl Into<String>,
        details: Vec<FieldDetail>,
    ) -> Self {
        let still_needed = details.iter().any(|d| d.status.keeps_patch());
        let status = if still_needed {
            VerdictStatus::Needed
        } else {
            VerdictStatus::Fixed
        };
        Self {
            id: id.into(),
            display_name: display_name.into(),
            status,
            still_needed,
            details,
        }
    }

    pub fn terminal(
        id: impl Into<String>,
        display_name: impl Into<String>,
        status: VerdictStatus,
        detail: FieldDetail,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            status,
            still_needed: status == VerdictStatus::Needed,
            details: vec![detail],
        }
    }

    pub fn count(&self, status: DetailStatus) -> usize {
        self.details.iter().filter(|d| d.status == status).count()
    }
}
