#![forbid(unsafe_code)]

use crate::StoreError;
use jsonschema::Draft;
use ov_core::RecordLayout;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::Path;

const SCHEMA_DIR: &str = "schemas";

/// JSON Schema every patch record must satisfy, keyed by the layout's field names.
pub fn record_schema(layout: &RecordLayout) -> Value {
    let mut properties = Map::new();
    properties.insert(layout.disabled.clone(), json!({ "type": "boolean" }));
    properties.insert(
        layout.objectives.clone(),
        json!({
            "type": "object",
            "propertyNames": { "pattern": "\\S" },
            "additionalProperties": { "type": "object" }
        }),
    );
    properties.insert(
        layout.added_objectives.clone(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "anyOf": [
                    { "required": ["id"], "properties": { "id": { "type": "string" } } },
                    {
                        "required": ["description"],
                        "properties": { "description": { "type": "string" } }
                    }
                ]
            }
        }),
    );
    properties.insert(
        layout.requirements.clone(),
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "required": ["task"],
                "properties": {
                    "task": {
                        "type": "object",
                        "required": ["id"],
                        "properties": { "id": { "type": "string", "pattern": "\\S" } }
                    }
                }
            }
        }),
    );
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": properties
    })
}

/// Compiled record schemas: the layout schema for every class, plus an optional
/// `<root>/schemas/<class>.json|yaml|yml` that a class's records must also pass.
#[derive(Debug)]
pub struct RecordValidator {
    base: jsonschema::Validator,
    classes: BTreeMap<String, jsonschema::Validator>,
}

impl RecordValidator {
    pub fn new(layout: &RecordLayout) -> Result<Self, StoreError> {
        Ok(Self {
            base: compile_schema("record", &record_schema(layout))?,
            classes: BTreeMap::new(),
        })
    }

    /// Adds the class schemas found under `<root>/schemas`.
    pub fn with_class_schemas(mut self, root: &Path) -> Result<Self, StoreError> {
        let dir = root.join(SCHEMA_DIR);
        if !dir.is_dir() {
            return Ok(self);
        }
        for path in super::sorted_entries(&dir)? {
            if !path.is_file() || !super::is_supported(&path) {
                continue;
            }
            let Some(class) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = std::fs::read_to_string(&path).map_err(|err| StoreError::io(&path, err))?;
            let schema = super::parse_document(&path, &raw)?;
            tracing::debug!(class, path = %path.display(), "loaded class schema");
            self.classes
                .insert(class.to_string(), compile_schema(class, &schema)?);
        }
        Ok(self)
    }

    pub fn has_class_schema(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    /// One message per schema violation, prefixed with the `$`-rooted instance path.
    pub fn validate(&self, class: &str, record: &Value) -> Vec<String> {
        let mut messages = violations(&self.base, record);
        if let Some(validator) = self.classes.get(class) {
            messages.extend(violations(validator, record));
        }
        messages
    }
}

fn compile_schema(name: &str, schema: &Value) -> Result<jsonschema::Validator, StoreError> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| StoreError::InvalidSchema {
            name: name.to_string(),
            message: err.to_string(),
        })
}

fn violations(validator: &jsonschema::Validator, record: &Value) -> Vec<String> {
    validator
        .iter_errors(record)
        .map(|error| format!("${}: {error}", error.instance_path))
        .collect()
}
