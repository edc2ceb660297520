#![forbid(unsafe_code)]

mod rules;

pub use rules::*;

use crate::verdict::{FieldDetail, Verdict, VerdictStatus};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Upstream records of one entity class, keyed by entity ID.
pub type CanonicalSet = BTreeMap<String, Value>;

/// Patch records of one entity class, keyed by entity ID.
pub type PatchSet = BTreeMap<String, Value>;

/// Field names that carry special meaning in patch and canonical records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    pub disabled: String,
    pub name: String,
    pub objectives: String,
    pub added_objectives: String,
    pub requirements: String,
    pub map: String,
    pub objective_maps: String,
}

impl Default for RecordLayout {
    fn default() -> Self {
        Self {
            disabled: "disabled".to_string(),
            name: "name".to_string(),
            objectives: "objectives".to_string(),
            added_objectives: "objectivesAdd".to_string(),
            requirements: "taskRequirements".to_string(),
            map: "map".to_string(),
            objective_maps: "maps".to_string(),
        }
    }
}

/// What a `disabled: true` patch resolves to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisabledPolicy {
    /// Keep the patch and ask a human to confirm the entity left upstream.
    #[default]
    FlagForReview,
    /// Treat the patch as no longer needed without inspecting fields.
    ResolveAsFixed,
}

impl DisabledPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FlagForReview => "flag-for-review",
            Self::ResolveAsFixed => "resolve-as-fixed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownDisabledPolicy(pub String);

impl std::fmt::Display for UnknownDisabledPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown disabled policy '{}' (expected flag-for-review or resolve-as-fixed)",
            self.0
        )
    }
}

impl std::error::Error for UnknownDisabledPolicy {}

impl FromStr for DisabledPolicy {
    type Err = UnknownDisabledPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flag-for-review" | "flag" | "review" => Ok(Self::FlagForReview),
            "resolve-as-fixed" | "resolve" | "fixed" => Ok(Self::ResolveAsFixed),
            _ => Err(UnknownDisabledPolicy(value.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReconcileOptions {
    pub layout: RecordLayout,
    pub disabled_policy: DisabledPolicy,
}

/// Classifies one patch record against the upstream records of its class.
pub fn reconcile(
    id: &str,
    patch: &Value,
    canonical_set: &CanonicalSet,
    options: &ReconcileOptions,
) -> Verdict {
    let layout = &options.layout;
    let empty = Map::new();
    let patch_map = patch.as_object().unwrap_or(&empty);

    let Some(canonical) = canonical_set.get(id) else {
        tracing::trace!(id, "entity absent upstream");
        return Verdict::terminal(
            id,
            display_name(id, patch_map, None, layout),
            VerdictStatus::RemovedFromApi,
            FieldDetail::info("_entity", format!("{id} is no longer present in the API")),
        );
    };
    let canonical_map = canonical.as_object().unwrap_or(&empty);
    let name = display_name(id, patch_map, Some(canonical_map), layout);

    if patch_map.get(&layout.disabled) == Some(&Value::Bool(true)) {
        tracing::trace!(id, policy = options.disabled_policy.as_str(), "disabled patch");
        return match options.disabled_policy {
            DisabledPolicy::FlagForReview => Verdict::terminal(
                id,
                name,
                VerdictStatus::Needed,
                FieldDetail::check(
                    layout.disabled.as_str(),
                    "patch is disabled but the entity is still in the API; confirm upstream removal",
                ),
            ),
            DisabledPolicy::ResolveAsFixed => Verdict::terminal(
                id,
                name,
                VerdictStatus::Fixed,
                FieldDetail::info(
                    layout.disabled.as_str(),
                    "patch is disabled; no longer needed",
                ),
            ),
        };
    }

    let ctx = RuleContext {
        id,
        patch: patch_map,
        canonical: canonical_map,
        layout,
    };
    let details = walk_fields(&ctx);
    let verdict = Verdict::from_details(id, name, details);
    tracing::trace!(id, status = verdict.status.as_str(), "reconciled");
    verdict
}

/// Reconciles every patch of a class. A class with no upstream data at all
/// yields `NOT_FOUND` for each entity.
pub fn reconcile_class(
    patches: &PatchSet,
    canonical_set: Option<&CanonicalSet>,
    options: &ReconcileOptions,
) -> Vec<Verdict> {
    let Some(canonical_set) = canonical_set else {
        let empty = Map::new();
        return patches
            .iter()
            .map(|(id, patch)| {
                let patch_map = patch.as_object().unwrap_or(&empty);
                Verdict::terminal(
                    id.as_str(),
                    display_name(id, patch_map, None, &options.layout),
                    VerdictStatus::NotFound,
                    FieldDetail::info("_entity", "no upstream data for this entity class"),
                )
            })
            .collect();
    };
    patches
        .iter()
        .map(|(id, patch)| reconcile(id, patch, canonical_set, options))
        .collect()
}

fn display_name(
    id: &str,
    patch: &Map<String, Value>,
    canonical: Option<&Map<String, Value>>,
    layout: &RecordLayout,
) -> String {
    canonical
        .and_then(|c| c.get(&layout.name))
        .or_else(|| patch.get(&layout.name))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(id)
        .to_string()
}

#[cfg(test)]
mod tests;
