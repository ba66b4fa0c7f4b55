//! Embedded JSON Schemas
//!
//! One creation schema per collection lives in `schemas/<collection>.schema.json`.
//! Update schemas are derived from it (every field optional, `uid` required)
//! unless a `<collection>.update.schema.json` override exists.

use rust_embed::RustEmbed;
use serde_json::{json, Value};

use crate::core::identity::EntityKind;

#[derive(RustEmbed)]
#[folder = "schemas/"]
struct SchemaAssets;

/// Access to the schemas compiled into the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// Raw schema text for a file name, if embedded
    pub fn raw(&self, file_name: &str) -> Option<String> {
        SchemaAssets::get(file_name)
            .and_then(|file| String::from_utf8(file.data.into_owned()).ok())
    }

    fn parsed(&self, file_name: &str) -> Option<Value> {
        let text = self.raw(file_name)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(file = file_name, error = %e, "embedded schema is not valid JSON");
                None
            }
        }
    }

    /// Creation schema of a collection
    pub fn create_schema(&self, kind: EntityKind) -> Option<Value> {
        self.parsed(&format!("{}.schema.json", kind.collection()))
    }

    /// Update schema of a collection
    pub fn update_schema(&self, kind: EntityKind) -> Option<Value> {
        if let Some(explicit) = self.parsed(&format!("{}.update.schema.json", kind.collection())) {
            return Some(explicit);
        }
        let mut schema = self.create_schema(kind)?;
        if let Value::Object(root) = &mut schema {
            if let Some(Value::Object(properties)) = root.get_mut("properties") {
                properties.insert("uid".to_string(), json!({ "$ref": "#/$defs/uid" }));
            }
            root.insert("required".to_string(), json!(["uid"]));
        }
        Some(schema)
    }

    /// File names of every embedded schema
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = SchemaAssets::iter().map(|f| f.into_owned()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_creation_schema() {
        let registry = SchemaRegistry;
        for kind in EntityKind::all() {
            assert!(registry.create_schema(*kind).is_some(), "{}", kind);
        }
    }

    #[test]
    fn test_update_schema_requires_only_uid() {
        let schema = SchemaRegistry.update_schema(EntityKind::Category).unwrap();
        assert_eq!(schema["required"], json!(["uid"]));
        assert!(schema["properties"]["uid"].is_object());
        assert!(schema["properties"]["name"].is_object());
    }

    #[test]
    fn test_instance_update_schema_is_explicit() {
        let schema = SchemaRegistry
            .update_schema(EntityKind::MachineModelInstance)
            .unwrap();
        assert!(schema["properties"].get("model_uid").is_none());
        assert!(schema["properties"]["position"].is_object());
    }
}
