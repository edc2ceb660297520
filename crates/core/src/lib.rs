#![forbid(unsafe_code)]

//! Reconciliation of community patch records against upstream game data.
//!
//! `compare` holds the value-level rules, `reconcile` walks one patch record
//! and produces a [`verdict::Verdict`], `report` partitions verdicts for
//! presentation. Nothing here performs I/O.

pub mod compare;
pub mod reconcile;
pub mod report;
pub mod verdict;

pub use reconcile::{
    CanonicalSet, DisabledPolicy, PatchSet, ReconcileOptions, RecordLayout, reconcile,
    reconcile_class,
};
pub use report::{Categorized, ReconcileSummary, categorize};
pub use verdict::{DetailStatus, FieldDetail, Verdict, VerdictStatus};
