//! Query tools: category trees, machine readiness, search and relations

use serde_json::{json, Value};

use super::{str_arg, to_value, uid_schema, ToolOutput, ToolRegistry};
use crate::catalog::Catalog;
use crate::core::error::{Result, TaxonomyError, Violation};

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(
        "get_category_tree",
        "Get a category with its specification groups and their specifications",
        uid_schema("category_uid", "UID of the category"),
        |catalog, input| ToolOutput::json(&catalog.category_tree(str_arg(input, "category_uid")?)?),
    );
    registry.register(
        "validate_machine",
        "Check if a machine is ready to publish (all required specs filled)",
        uid_schema("machine_uid", "UID of the machine"),
        validate_machine,
    );
    registry.register(
        "search_entities",
        "Search across entity types by name or label",
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "entity_types": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional: limit search to specific types"
                }
            },
            "required": ["query"]
        }),
        search_entities,
    );
    registry.register(
        "get_relationships",
        "Get the entities related to a UID of any kind",
        uid_schema("uid", "UID of any entity"),
        |catalog, input| ToolOutput::json(&catalog.relationships(str_arg(input, "uid")?)?),
    );
}

fn validate_machine(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let report = catalog.validate_machine(str_arg(input, "machine_uid")?)?;
    let text = if report.valid {
        format!(
            "✓ Machine is ready to publish!\nAll {} required specifications are filled.",
            report.required_count
        )
    } else {
        let blocks: Vec<String> = report
            .instances
            .iter()
            .filter(|i| !i.missing.is_empty())
            .map(|i| {
                let specs: Vec<String> = i
                    .missing
                    .iter()
                    .map(|m| format!("  - {} ({})", m.label.en, m.name))
                    .collect();
                format!("Instance {}:\n{}", i.instance_label, specs.join("\n"))
            })
            .collect();
        format!(
            "✗ Machine is NOT ready to publish.\nMissing {} required specification(s):\n\n{}",
            report.missing_count(),
            blocks.join("\n\n")
        )
    };
    Ok(ToolOutput::with_data(text, to_value(&report)?))
}

fn search_entities(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let query = str_arg(input, "query")?;
    let kinds: Option<Vec<String>> = match input.get("entity_types") {
        None | Some(Value::Null) => None,
        Some(types) => Some(serde_json::from_value(types.clone()).map_err(|_| {
            TaxonomyError::validation(vec![Violation::new(
                "/entity_types",
                "must be an array of strings",
            )])
        })?),
    };
    let hits = catalog.search(query, kinds.as_deref())?;
    let data = to_value(&hits)?;
    if hits.is_empty() {
        return Ok(ToolOutput::with_data(
            format!("No results found for \"{}\"", query),
            data,
        ));
    }
    let blocks: Vec<String> = hits
        .iter()
        .map(|h| format!("- [{}] {} ({})\n  UID: {}", h.kind.collection(), h.label, h.name, h.uid))
        .collect();
    Ok(ToolOutput::with_data(
        format!("Found {} results:\n\n{}", hits.len(), blocks.join("\n\n")),
        data,
    ))
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixtures;
    use crate::tools::{ToolError, ToolRegistry};
    use serde_json::json;

    #[test]
    fn test_validate_machine_text() {
        let fx = fixtures::catalog();
        let tools = ToolRegistry::new();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);
        fx.spec(&group.uid, "speed", "Numerical", json!({}), true);
        let model = fx.model(&cat.uid);
        let machine = fx.machine(&model.uid);

        let out = tools
            .call(&fx.catalog, "validate_machine", &json!({ "machine_uid": machine.machine.uid }))
            .unwrap();
        assert!(out.text.contains("NOT ready"));
        assert!(out.text.contains("Instance #0:"));
        assert!(out.text.contains("speed (speed)"));
        assert_eq!(out.data.unwrap()["valid"], false);
    }

    #[test]
    fn test_search_entity_types_must_be_strings() {
        let fx = fixtures::catalog();
        let tools = ToolRegistry::new();
        let err = tools
            .call(&fx.catalog, "search_entities", &json!({ "query": "x", "entity_types": [1] }))
            .unwrap_err();
        assert_eq!(err.code(), ToolError::INVALID_PARAMS);

        let out = tools
            .call(&fx.catalog, "search_entities", &json!({ "query": "nothing" }))
            .unwrap();
        assert_eq!(out.text, "No results found for \"nothing\"");
    }

    #[test]
    fn test_relationships_unknown_uid_is_internal_error() {
        let fx = fixtures::catalog();
        let tools = ToolRegistry::new();
        let err = tools
            .call(&fx.catalog, "get_relationships", &json!({ "uid": "01J9ZQ3V6W8X9Y0Z1A2B3C4D5E" }))
            .unwrap_err();
        assert_eq!(err.code(), ToolError::INTERNAL_ERROR);
        assert!(err.to_string().contains("no entity found"));
    }
}
