#![forbid(unsafe_code)]

use super::RecordLayout;
use crate::compare::{
    collect_map_keys, compare_subset, is_inactive_requirement, render_value, requirement_id,
    requirement_id_set,
};
use crate::verdict::FieldDetail;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One patch record paired with its upstream record.
pub struct RuleContext<'a> {
    pub id: &'a str,
    pub patch: &'a Map<String, Value>,
    pub canonical: &'a Map<String, Value>,
    pub layout: &'a RecordLayout,
}

impl RuleContext<'_> {
    fn canonical_objectives(&self) -> &[Value] {
        self.canonical
            .get(&self.layout.objectives)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn canonical_objective(&self, objective_id: &str) -> Option<&Map<String, Value>> {
        self.canonical_objectives()
            .iter()
            .filter_map(Value::as_object)
            .find(|obj| obj.get("id").and_then(Value::as_str) == Some(objective_id))
    }
}

/// A field rule claims declared patch fields and turns each into details.
pub struct FieldRule {
    pub name: &'static str,
    pub claims: fn(&str, &RecordLayout) -> bool,
    pub check: fn(&RuleContext<'_>, &str) -> Vec<FieldDetail>,
}

/// Ordered dispatch table; the first rule claiming a field handles it.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        name: "map",
        claims: |field, layout| field == layout.map,
        check: check_map,
    },
    FieldRule {
        name: "requirements",
        claims: |field, layout| field == layout.requirements,
        check: check_requirements,
    },
    FieldRule {
        name: "objectives",
        claims: |field, layout| field == layout.objectives,
        check: check_objectives,
    },
    FieldRule {
        name: "added_objectives",
        claims: |field, layout| field == layout.added_objectives,
        check: check_added_objectives,
    },
    FieldRule {
        name: "plain",
        claims: |_, _| true,
        check: check_plain,
    },
];

/// Runs every declared patch field through [`FIELD_RULES`]. An entity spread
/// over several locations is also held to the map rule when the patch leaves
/// `map` out.
pub fn walk_fields(ctx: &RuleContext<'_>) -> Vec<FieldDetail> {
    let mut details = Vec::new();
    for field in ctx.patch.keys() {
        if *field == ctx.layout.disabled {
            continue;
        }
        if let Some(rule) = FIELD_RULES.iter().find(|r| (r.claims)(field, ctx.layout)) {
            details.extend((rule.check)(ctx, field));
        }
    }
    if !ctx.patch.contains_key(&ctx.layout.map) && distinct_locations(ctx).len() > 1 {
        details.extend(check_map(ctx, &ctx.layout.map));
    }
    details
}

pub fn check_plain(ctx: &RuleContext<'_>, field: &str) -> Vec<FieldDetail> {
    let patch = ctx.patch.get(field);
    let canonical = ctx.canonical.get(field);
    vec![compare_field(field, patch, canonical)]
}

/// An entity spread over several maps must not carry a single top-level map.
pub fn check_map(ctx: &RuleContext<'_>, field: &str) -> Vec<FieldDetail> {
    let patch = ctx.patch.get(field);
    let canonical = ctx.canonical.get(field);
    let locations = distinct_locations(ctx);
    if locations.len() <= 1 {
        return vec![compare_field(field, patch, canonical)];
    }

    let listed = locations.into_iter().collect::<Vec<_>>().join(", ");
    let detail = match (patch, canonical) {
        (Some(Value::Null), Some(Value::Null)) => FieldDetail::fixed(
            field,
            format!("multiple maps ({listed}); API map is null as patched"),
        ),
        (Some(Value::Null), canonical) => FieldDetail::needed(
            field,
            format!(
                "multiple maps ({listed}); API map is {} | patch: null",
                render_value(canonical)
            ),
        ),
        (Some(concrete), _) => FieldDetail::needed(
            field,
            format!(
                "multiple maps ({listed}); patch should set map to null, not {}",
                render_value(Some(concrete))
            ),
        ),
        (None, _) => FieldDetail::needed(
            field,
            format!("multiple maps ({listed}); patch should set map to null"),
        ),
    };
    vec![detail]
}

/// Requirements compare as sets of referenced task IDs, ignoring entries that
/// only apply while a task is active or accepted.
pub fn check_requirements(ctx: &RuleContext<'_>, field: &str) -> Vec<FieldDetail> {
    let Some(Value::Array(patch_entries)) = ctx.patch.get(field) else {
        return vec![FieldDetail::needed(
            field,
            format!(
                "patch requirements must be a list, got {}",
                render_value(ctx.patch.get(field))
            ),
        )];
    };
    let unreferenced = patch_entries
        .iter()
        .filter(|entry| requirement_id(entry).is_none())
        .count();
    if unreferenced > 0 {
        return vec![FieldDetail::needed(
            field,
            format!("{unreferenced} patch requirement(s) reference no task id"),
        )];
    }
    let canonical_entries: Vec<&Value> = ctx
        .canonical
        .get(field)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter(|e| !is_inactive_requirement(e)).collect())
        .unwrap_or_default();

    if canonical_entries.is_empty() {
        if patch_entries.is_empty() {
            return vec![FieldDetail::fixed(field, "API and patch both list no requirements")];
        }
        return vec![FieldDetail::needed(
            field,
            format!(
                "API has 0 requirements (after filtering), patch has {}",
                patch_entries.len()
            ),
        )];
    }

    let api_ids = requirement_id_set(canonical_entries);
    let patch_ids = requirement_id_set(patch_entries);
    if api_ids == patch_ids {
        vec![FieldDetail::fixed(
            field,
            format!("API requirements match patch: [{}]", join_ids(&api_ids)),
        )]
    } else {
        vec![FieldDetail::needed(
            field,
            format!(
                "API: [{}] | patch: [{}]",
                join_ids(&api_ids),
                join_ids(&patch_ids)
            ),
        )]
    }
}

/// Objective patches are compared sub-field by sub-field against the upstream
/// objective with the same ID.
pub fn check_objectives(ctx: &RuleContext<'_>, field: &str) -> Vec<FieldDetail> {
    let Some(Value::Object(objective_patches)) = ctx.patch.get(field) else {
        return vec![FieldDetail::check(
            field,
            format!(
                "objective patches must be a mapping, got {}",
                render_value(ctx.patch.get(field))
            ),
        )];
    };

    let mut details = Vec::new();
    for (objective_id, objective_patch) in objective_patches {
        let prefix = format!("objective:{objective_id}");
        let Some(canonical_objective) = ctx.canonical_objective(objective_id) else {
            details.push(FieldDetail::check(
                prefix,
                format!("objective {objective_id} not found in API objectives"),
            ));
            continue;
        };
        let Some(objective_patch) = objective_patch.as_object() else {
            details.push(FieldDetail::check(
                prefix,
                format!(
                    "objective patch must be a mapping, got {}",
                    render_value(Some(objective_patch))
                ),
            ));
            continue;
        };
        for (sub_field, value) in objective_patch {
            details.push(compare_field(
                &format!("{prefix}:{sub_field}"),
                Some(value),
                canonical_objective.get(sub_field),
            ));
        }
    }
    details
}

/// New objectives are never diffed; they are redundant once upstream has an
/// objective with the same ID or description.
pub fn check_added_objectives(ctx: &RuleContext<'_>, field: &str) -> Vec<FieldDetail> {
    let Some(Value::Array(additions)) = ctx.patch.get(field) else {
        return vec![FieldDetail::check(
            field,
            format!(
                "added objectives must be a list, got {}",
                render_value(ctx.patch.get(field))
            ),
        )];
    };

    let canonical = ctx.canonical_objectives();
    additions
        .iter()
        .enumerate()
        .map(|(index, addition)| {
            let id = addition.get("id").and_then(Value::as_str);
            let description = addition.get("description").and_then(Value::as_str);
            let label = id.map(str::to_string).unwrap_or_else(|| index.to_string());
            let detail_field = format!("{field}:{label}");
            let present = canonical.iter().any(|objective| {
                let same_id = id.is_some() && objective.get("id").and_then(Value::as_str) == id;
                let same_description = description.is_some()
                    && objective.get("description").and_then(Value::as_str) == description;
                same_id || same_description
            });
            if present {
                FieldDetail::fixed(
                    detail_field,
                    "objective now present upstream: remove or promote to a patch",
                )
            } else {
                FieldDetail::needed(
                    detail_field,
                    format!(
                        "objective missing from API: {}",
                        description.unwrap_or("<no description>")
                    ),
                )
            }
        })
        .collect()
}

fn compare_field(field: &str, patch: Option<&Value>, canonical: Option<&Value>) -> FieldDetail {
    if compare_subset(patch, canonical) {
        FieldDetail::fixed(
            field,
            format!("API now matches patch: {}", render_value(patch)),
        )
    } else {
        FieldDetail::needed(
            field,
            format!(
                "API: {} | patch: {}",
                render_value(canonical),
                render_value(patch)
            ),
        )
    }
}

fn distinct_locations(ctx: &RuleContext<'_>) -> BTreeSet<String> {
    let maps_field = &ctx.layout.objective_maps;
    let mut keys = BTreeSet::new();
    for objective in ctx.canonical_objectives() {
        collect_map_keys(objective.get(maps_field), &mut keys);
    }
    if let Some(Value::Object(objective_patches)) = ctx.patch.get(&ctx.layout.objectives) {
        for objective_patch in objective_patches.values() {
            collect_map_keys(objective_patch.get(maps_field), &mut keys);
        }
    }
    keys
}

fn join_ids(ids: &BTreeSet<String>) -> String {
    ids.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
