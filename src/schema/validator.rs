//! Input validation against the embedded schemas
//!
//! Loosely typed JSON input is checked in two passes: the static JSON Schema of
//! the collection (create or update shape) and the discriminated checks of the
//! polymorphic fields that need no stored context. Every violation of both
//! passes is reported together; typed deserialization only happens once the
//! input is clean.

use jsonschema::{
    error::ValidationErrorKind, validator_for, ValidationError as JsonSchemaError,
    Validator as JsonValidator,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::core::error::{Result, TaxonomyError, Violation};
use crate::core::identity::EntityKind;
use crate::entities::specification::SpecificationType;
use crate::schema::registry::SchemaRegistry;
use crate::schema::variants;

/// Which shape the input must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// All mandatory fields present
    Create,
    /// `uid` present, everything else optional
    Update,
}

/// Compiled creation and update schemas per collection
pub struct Validator {
    create: HashMap<EntityKind, JsonValidator>,
    update: HashMap<EntityKind, JsonValidator>,
}

impl Validator {
    /// Compile every schema of the registry
    pub fn new(registry: &SchemaRegistry) -> Self {
        let mut create = HashMap::new();
        let mut update = HashMap::new();

        for kind in EntityKind::all() {
            if let Some(compiled) = registry.create_schema(*kind).and_then(|s| compile(*kind, &s)) {
                create.insert(*kind, compiled);
            }
            if let Some(compiled) = registry.update_schema(*kind).and_then(|s| compile(*kind, &s)) {
                update.insert(*kind, compiled);
            }
        }

        Self { create, update }
    }

    /// Process-wide validator, compiled on first use
    pub fn shared() -> &'static Validator {
        static SHARED: OnceLock<Validator> = OnceLock::new();
        SHARED.get_or_init(Validator::default)
    }

    /// Static schema violations of `input`
    pub fn schema_violations(
        &self,
        kind: EntityKind,
        mode: Mode,
        input: &JsonValue,
    ) -> Vec<Violation> {
        let compiled = match mode {
            Mode::Create => self.create.get(&kind),
            // values are keyed, not identified: an update is a full replacement
            Mode::Update if kind == EntityKind::MachineSpecificationValue => self.create.get(&kind),
            Mode::Update => self.update.get(&kind),
        };
        match compiled {
            Some(schema) => schema
                .iter_errors(input)
                .map(|e| error_to_violation(&e))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Schema violations plus the discriminated checks that need no stored
    /// records
    pub fn check(&self, kind: EntityKind, mode: Mode, input: &JsonValue) -> Vec<Violation> {
        let mut violations = self.schema_violations(kind, mode, input);

        match kind {
            EntityKind::Specification => {
                let spec_type = input
                    .get("type")
                    .and_then(|t| serde_json::from_value::<SpecificationType>(t.clone()).ok());
                if let (Some(spec_type), Some(options)) = (spec_type, input.get("type_options")) {
                    violations.extend(variants::check_type_options(spec_type, options));
                }
                if let Some(pattern) = input.get("regexp_pattern").and_then(JsonValue::as_str) {
                    violations.extend(variants::check_regexp_pattern(pattern));
                }
            }
            EntityKind::SpecificationPreset => {
                if let Some(allowed) = input.get("allowed_values") {
                    violations.extend(variants::check_allowed_values(allowed));
                }
            }
            _ => {}
        }

        violations
    }

    /// Validate and deserialize in one go
    pub fn parse<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        mode: Mode,
        input: &JsonValue,
    ) -> Result<T> {
        let violations = self.check(kind, mode, input);
        finish(input, violations)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&SchemaRegistry)
    }
}

fn compile(kind: EntityKind, schema: &JsonValue) -> Option<JsonValidator> {
    match validator_for(schema) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::warn!(collection = kind.collection(), error = %e, "schema failed to compile");
            None
        }
    }
}

/// Turn collected violations into an error, or deserialize the clean input
pub fn finish<T: DeserializeOwned>(input: &JsonValue, violations: Vec<Violation>) -> Result<T> {
    if !violations.is_empty() {
        return Err(TaxonomyError::validation(violations));
    }
    serde_json::from_value(input.clone())
        .map_err(|e| TaxonomyError::validation(vec![Violation::new("", e.to_string())]))
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(error: &JsonSchemaError) -> Violation {
    let path = error.instance_path.to_string();
    match &error.kind {
        // report a missing field at its own path
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Violation::new(format!("{}/{}", path, name), "is required")
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => Violation::new(
            path,
            format!("unknown field(s): {}", unexpected.join(", ")),
        ),
        _ => Violation::new(path, format_schema_error(error)),
    }
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Type { kind } => format!("wrong type, expected {:?}", kind),
        ValidationErrorKind::Enum { options } => {
            format!("must be one of: {}", format_enum_options(options))
        }
        ValidationErrorKind::Pattern { pattern } => {
            if pattern.contains("0-9A-HJKMNP") {
                "must be a ULID or UUID".to_string()
            } else {
                format!("doesn't match pattern: {}", pattern)
            }
        }
        ValidationErrorKind::MinLength { limit } => {
            if *limit == 1 {
                "must not be empty".to_string()
            } else {
                format!("too short: minimum {} characters", limit)
            }
        }
        ValidationErrorKind::Minimum { limit } => format!("too small: minimum {}", limit),
        _ => error.to_string(),
    }
}

/// Format enum options as a string
fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::NewCategory;
    use serde_json::json;

    fn paths(violations: &[Violation]) -> Vec<String> {
        let mut p: Vec<String> = violations.iter().map(|v| v.path.clone()).collect();
        p.sort();
        p
    }

    #[test]
    fn test_create_reports_every_missing_field() {
        let v = Validator::shared().check(EntityKind::SpecificationGroup, Mode::Create, &json!({}));
        assert_eq!(
            paths(&v),
            vec!["/category_uid", "/label", "/name", "/type"]
        );
    }

    #[test]
    fn test_update_requires_only_uid() {
        let validator = Validator::shared();
        let v = validator.check(EntityKind::Model, Mode::Update, &json!({ "name": "x" }));
        assert_eq!(paths(&v), vec!["/uid"]);

        let v = validator.check(
            EntityKind::Model,
            Mode::Update,
            &json!({ "uid": "01J9ZQ3V6W8X9Y0Z1A2B3C4D5E" }),
        );
        assert!(v.is_empty());
    }

    #[test]
    fn test_bad_uid_and_unknown_field() {
        let v = Validator::shared().check(
            EntityKind::Model,
            Mode::Create,
            &json!({ "name": "m", "category_uid": "nope", "colour": "red" }),
        );
        assert_eq!(v.len(), 2);
        assert!(v.iter().any(|v| v.path == "/category_uid" && v.message.contains("ULID")));
        assert!(v.iter().any(|v| v.message.contains("colour")));
    }

    #[test]
    fn test_specification_type_options_checked_with_schema() {
        let v = Validator::shared().check(
            EntityKind::Specification,
            Mode::Create,
            &json!({
                "name": "",
                "specification_group_uid": "01J9ZQ3V6W8X9Y0Z1A2B3C4D5E",
                "label": { "en": "Format" },
                "type": "Numerical Range",
                "type_options": { "unit": "mm" },
                "regexp_pattern": "(["
            }),
        );
        assert_eq!(
            paths(&v),
            vec!["/name", "/regexp_pattern", "/type_options/range_type"]
        );
    }

    #[test]
    fn test_parse_applies_defaults() {
        let category: NewCategory = Validator::shared()
            .parse(
                EntityKind::Category,
                Mode::Create,
                &json!({ "name": "binders", "label": { "en": "Binders" } }),
            )
            .unwrap();
        assert_eq!(category.position_rank, 0);
    }

    #[test]
    fn test_parse_fails_with_all_violations() {
        let err = Validator::shared()
            .parse::<NewCategory>(EntityKind::Category, Mode::Create, &json!({ "name": "" }))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.violations().len(), 2);
    }
}
