use super::*;
use crate::verdict::DetailStatus;
use serde_json::json;

fn canonical(entries: Value) -> CanonicalSet {
    entries
        .as_object()
        .expect("object fixture")
        .iter()
        .map(|(id, record)| (id.clone(), record.clone()))
        .collect()
}

fn run(id: &str, patch: Value, upstream: Value) -> Verdict {
    reconcile(id, &patch, &canonical(upstream), &ReconcileOptions::default())
}

fn detail<'a>(verdict: &'a Verdict, field: &str) -> &'a FieldDetail {
    verdict
        .details
        .iter()
        .find(|d| d.field == field)
        .unwrap_or_else(|| panic!("missing detail {field}: {:?}", verdict.details))
}

#[test]
fn diverging_level_is_needed() {
    let verdict = run(
        "t1",
        json!({"minPlayerLevel": 10}),
        json!({"t1": {"id": "t1", "name": "Debut", "minPlayerLevel": 20}}),
    );
    assert_eq!(verdict.status, VerdictStatus::Needed);
    assert!(verdict.still_needed);
    assert_eq!(verdict.display_name, "Debut");
    assert_eq!(verdict.details.len(), 1);
    assert_eq!(verdict.details[0].field, "minPlayerLevel");
    assert_eq!(verdict.details[0].status, DetailStatus::Needed);
    assert!(verdict.details[0].message.contains("20"));
    assert!(verdict.details[0].message.contains("10"));
}

#[test]
fn matching_level_is_fixed() {
    let verdict = run(
        "t1",
        json!({"minPlayerLevel": 10}),
        json!({"t1": {"minPlayerLevel": 10}}),
    );
    assert_eq!(verdict.status, VerdictStatus::Fixed);
    assert!(!verdict.still_needed);
    assert_eq!(verdict.count(DetailStatus::Fixed), 1);
}

#[test]
fn absent_entity_is_removed_from_api() {
    let verdict = run(
        "X",
        json!({"minPlayerLevel": 10, "objectives": {"o": {"count": 1}}, "disabled": true}),
        json!({"Y": {"minPlayerLevel": 10}}),
    );
    assert_eq!(verdict.status, VerdictStatus::RemovedFromApi);
    assert!(!verdict.still_needed);
    assert_eq!(verdict.details.len(), 1);
    assert_eq!(verdict.details[0].status, DetailStatus::Info);
}

#[test]
fn requirements_against_empty_filtered_api_list() {
    let verdict = run(
        "t1",
        json!({"taskRequirements": [{"task": {"id": "A"}}]}),
        json!({"t1": {"taskRequirements": [
            {"task": {"id": "B"}, "status": ["active"]},
            {"task": {"id": "C"}, "status": ["accepted"]}
        ]}}),
    );
    let d = detail(&verdict, "taskRequirements");
    assert_eq!(d.status, DetailStatus::Needed);
    assert!(d.message.contains("API has 0"), "{}", d.message);
    assert!(d.message.contains("patch has 1"), "{}", d.message);
    assert_eq!(verdict.status, VerdictStatus::Needed);
}

#[test]
fn requirements_compare_as_id_sets() {
    let upstream = json!({"t1": {"taskRequirements": [
        {"task": {"id": "B", "name": "Second"}, "status": ["complete"]},
        {"task": {"id": "A", "name": "First"}, "status": ["complete"]},
        {"task": {"id": "Z"}, "status": ["active"]}
    ]}});

    let same = run(
        "t1",
        json!({"taskRequirements": [{"task": {"id": "A"}}, {"task": {"id": "B"}}]}),
        upstream.clone(),
    );
    assert_eq!(detail(&same, "taskRequirements").status, DetailStatus::Fixed);

    let different = run(
        "t1",
        json!({"taskRequirements": [{"task": {"id": "A"}}]}),
        upstream,
    );
    let d = detail(&different, "taskRequirements");
    assert_eq!(d.status, DetailStatus::Needed);
    assert!(d.message.contains("A, B"), "{}", d.message);
}

#[test]
fn objective_patch_matching_upstream_is_fixed() {
    let verdict = run(
        "t1",
        json!({"objectives": {"obj1": {"count": 4}}}),
        json!({"t1": {"objectives": [{"id": "obj1", "count": 4, "description": "Find"}]}}),
    );
    let d = detail(&verdict, "objective:obj1:count");
    assert_eq!(d.status, DetailStatus::Fixed);
    assert_eq!(verdict.status, VerdictStatus::Fixed);
}

#[test]
fn unknown_objective_needs_a_human() {
    let verdict = run(
        "t1",
        json!({"objectives": {"ghost": {"count": 4}}}),
        json!({"t1": {"objectives": [{"id": "obj1", "count": 4}]}}),
    );
    let d = detail(&verdict, "objective:ghost");
    assert_eq!(d.status, DetailStatus::Check);
    assert_eq!(verdict.status, VerdictStatus::Needed);
}

#[test]
fn null_map_across_multiple_locations_is_fixed() {
    let verdict = run(
        "t1",
        json!({
            "map": null,
            "objectives": {
                "o1": {"maps": [{"id": "m1", "name": "Customs"}]},
                "o2": {"maps": [{"id": "m2", "name": "Woods"}]}
            }
        }),
        json!({"t1": {
            "map": null,
            "objectives": [
                {"id": "o1", "maps": [{"id": "m1", "name": "Customs"}]},
                {"id": "o2", "maps": [{"id": "m2", "name": "Woods"}]}
            ]
        }}),
    );
    assert_eq!(detail(&verdict, "map").status, DetailStatus::Fixed);
    assert_eq!(verdict.status, VerdictStatus::Fixed);
}

#[test]
fn concrete_map_across_multiple_locations_is_wrong_shape() {
    let verdict = run(
        "t1",
        json!({"map": {"name": "Customs"}}),
        json!({"t1": {
            "map": {"name": "Customs"},
            "objectives": [
                {"id": "o1", "maps": [{"name": "Customs"}]},
                {"id": "o2", "maps": [{"name": "Woods"}]}
            ]
        }}),
    );
    let d = detail(&verdict, "map");
    assert_eq!(d.status, DetailStatus::Needed);
    assert!(d.message.contains("null"), "{}", d.message);
}

#[test]
fn null_map_while_upstream_keeps_single_map_is_needed() {
    let verdict = run(
        "t1",
        json!({"map": null}),
        json!({"t1": {
            "map": {"name": "Customs"},
            "objectives": [
                {"id": "o1", "maps": [{"name": "Customs"}]},
                {"id": "o2", "maps": [{"name": "Woods"}]}
            ]
        }}),
    );
    assert_eq!(detail(&verdict, "map").status, DetailStatus::Needed);
}

#[test]
fn omitted_map_across_multiple_locations_is_needed() {
    let verdict = run(
        "t1",
        json!({"objectives": {
            "o1": {"maps": [{"name": "Customs"}]},
            "o2": {"maps": [{"name": "Woods"}]}
        }}),
        json!({"t1": {
            "map": {"name": "Customs"},
            "objectives": [
                {"id": "o1", "maps": [{"name": "Customs"}]},
                {"id": "o2", "maps": [{"name": "Woods"}]}
            ]
        }}),
    );
    assert_eq!(detail(&verdict, "objective:o1:maps").status, DetailStatus::Fixed);
    assert_eq!(detail(&verdict, "objective:o2:maps").status, DetailStatus::Fixed);
    let d = detail(&verdict, "map");
    assert_eq!(d.status, DetailStatus::Needed);
    assert!(d.message.contains("Customs, Woods"), "{}", d.message);
    assert_eq!(verdict.status, VerdictStatus::Needed);
}

#[test]
fn omitted_map_on_single_location_adds_no_detail() {
    let verdict = run(
        "t1",
        json!({"minPlayerLevel": 5}),
        json!({"t1": {
            "minPlayerLevel": 5,
            "map": {"name": "Factory"},
            "objectives": [
                {"id": "o1", "maps": [{"name": "Factory"}]},
                {"id": "o2", "maps": [{"name": "Night Factory"}]}
            ]
        }}),
    );
    assert_eq!(verdict.details.len(), 1);
    assert_eq!(verdict.status, VerdictStatus::Fixed);
}

#[test]
fn null_map_against_absent_upstream_map_is_needed() {
    let verdict = run(
        "t1",
        json!({"map": null}),
        json!({"t1": {
            "objectives": [
                {"id": "o1", "maps": [{"name": "Customs"}]},
                {"id": "o2", "maps": [{"name": "Woods"}]}
            ]
        }}),
    );
    let d = detail(&verdict, "map");
    assert_eq!(d.status, DetailStatus::Needed);
    assert!(d.message.contains("<absent>"), "{}", d.message);
}

#[test]
fn map_variants_count_as_one_location() {
    // Factory and Night Factory collapse, so ordinary comparison applies.
    let verdict = run(
        "t1",
        json!({"map": {"name": "Factory"}}),
        json!({"t1": {
            "map": {"name": "Factory", "id": "f"},
            "objectives": [
                {"id": "o1", "maps": [{"name": "Factory"}]},
                {"id": "o2", "maps": [{"name": "Night Factory"}]}
            ]
        }}),
    );
    assert_eq!(detail(&verdict, "map").status, DetailStatus::Fixed);
}

#[test]
fn requirement_without_task_id_is_needed() {
    let verdict = run(
        "t1",
        json!({"taskRequirements": [{"task": {"id": "A"}}, {}]}),
        json!({"t1": {"taskRequirements": [{"task": {"id": "A"}, "status": ["complete"]}]}}),
    );
    let d = detail(&verdict, "taskRequirements");
    assert_eq!(d.status, DetailStatus::Needed);
    assert!(d.message.contains("1 patch requirement"), "{}", d.message);
}

#[test]
fn added_objectives_match_by_id_or_description() {
    let verdict = run(
        "t1",
        json!({"objectivesAdd": [
            {"id": "new1", "description": "Something else"},
            {"description": "Survive Woods"},
            {"id": "new3", "description": "Still missing"}
        ]}),
        json!({"t1": {"objectives": [
            {"id": "new1", "description": "Renamed"},
            {"id": "o9", "description": "Survive Woods"}
        ]}}),
    );
    let first = detail(&verdict, "objectivesAdd:new1");
    assert_eq!(first.status, DetailStatus::Fixed);
    assert!(first.message.contains("now present upstream"));
    assert_eq!(detail(&verdict, "objectivesAdd:1").status, DetailStatus::Fixed);
    assert_eq!(detail(&verdict, "objectivesAdd:new3").status, DetailStatus::Needed);
    assert_eq!(verdict.status, VerdictStatus::Needed);
}

#[test]
fn nested_subset_only_checks_asserted_sub_fields() {
    let verdict = run(
        "t1",
        json!({"trader": {"name": "Prapor"}}),
        json!({"t1": {"trader": {"id": "p", "name": "Prapor", "normalizedName": "prapor"}}}),
    );
    assert_eq!(verdict.status, VerdictStatus::Fixed);
}

#[test]
fn field_missing_upstream_is_needed() {
    let verdict = run("t1", json!({"kappaRequired": true}), json!({"t1": {"id": "t1"}}));
    let d = detail(&verdict, "kappaRequired");
    assert_eq!(d.status, DetailStatus::Needed);
    assert!(d.message.contains("<absent>"));
}

#[test]
fn disabled_patch_follows_policy() {
    let upstream = canonical(json!({"t1": {"minPlayerLevel": 1}}));
    let patch = json!({"disabled": true, "minPlayerLevel": 5});

    let flagged = reconcile("t1", &patch, &upstream, &ReconcileOptions::default());
    assert_eq!(flagged.status, VerdictStatus::Needed);
    assert_eq!(flagged.details.len(), 1);
    assert_eq!(flagged.details[0].status, DetailStatus::Check);

    let options = ReconcileOptions {
        disabled_policy: DisabledPolicy::ResolveAsFixed,
        ..ReconcileOptions::default()
    };
    let resolved = reconcile("t1", &patch, &upstream, &options);
    assert_eq!(resolved.status, VerdictStatus::Fixed);
    assert!(!resolved.still_needed);
    assert_eq!(resolved.details.len(), 1);
    assert_eq!(resolved.details[0].status, DetailStatus::Info);
}

#[test]
fn disabled_false_is_not_a_field() {
    let verdict = run(
        "t1",
        json!({"disabled": false, "minPlayerLevel": 1}),
        json!({"t1": {"minPlayerLevel": 1}}),
    );
    assert_eq!(verdict.details.len(), 1);
    assert_eq!(verdict.status, VerdictStatus::Fixed);
}

#[test]
fn malformed_shapes_degrade_instead_of_panicking() {
    let verdict = run(
        "t1",
        json!({"objectives": [1, 2], "objectivesAdd": {"x": 1}, "taskRequirements": "A"}),
        json!({"t1": "not an object"}),
    );
    assert_eq!(verdict.status, VerdictStatus::Needed);
    assert_eq!(verdict.details.len(), 3);
}

#[test]
fn class_without_upstream_data_is_not_found() {
    let mut patches = PatchSet::new();
    patches.insert("a".to_string(), json!({"name": "Alpha"}));
    patches.insert("b".to_string(), json!({}));
    let verdicts = reconcile_class(&patches, None, &ReconcileOptions::default());
    assert_eq!(verdicts.len(), 2);
    assert!(verdicts.iter().all(|v| v.status == VerdictStatus::NotFound));
    assert_eq!(verdicts[0].display_name, "Alpha");
    assert_eq!(verdicts[1].display_name, "b");
}

#[test]
fn disabled_policy_parses_from_cli_spelling() {
    assert_eq!(
        "resolve-as-fixed".parse::<DisabledPolicy>(),
        Ok(DisabledPolicy::ResolveAsFixed)
    );
    assert_eq!(
        " Flag-For-Review ".parse::<DisabledPolicy>(),
        Ok(DisabledPolicy::FlagForReview)
    );
    assert!("delete".parse::<DisabledPolicy>().is_err());
}

#[test]
fn rule_table_ends_with_catch_all() {
    let last = FIELD_RULES.last().expect("rules");
    assert_eq!(last.name, "plain");
    let layout = RecordLayout::default();
    assert!((last.claims)("anything", &layout));
    let map_rule = FIELD_RULES.iter().find(|r| r.name == "map").expect("map rule");
    assert!((map_rule.claims)("map", &layout));
    assert!(!(map_rule.claims)("maps", &layout));
}
