//! Tools over the taxonomy itself: categories, groups, specifications,
//! enum options, models and presets

use serde_json::Value;

use super::{
    created, deleted, filter_schema, get_entity, listed, parsed_filter, str_arg, uid_filter,
    uid_schema, updated, ToolOutput, ToolRegistry,
};
use crate::catalog::{Catalog, PresetFilter};
use crate::core::error::Result;
use crate::core::identity::EntityKind;
use crate::entities::{
    Category, EnumOption, Model, Specification, SpecificationGroup, SpecificationPreset,
};

pub(super) fn register(registry: &mut ToolRegistry) {
    categories(registry);
    specification_groups(registry);
    specifications(registry);
    enum_options(registry);
    models(registry);
    presets(registry);
}

fn categories(registry: &mut ToolRegistry) {
    let kind = EntityKind::Category;
    registry.register(
        "create_category",
        "Create a new category",
        registry.create_schema(kind),
        |catalog, input| created(&catalog.create_category(input)?),
    );
    registry.register(
        "update_category",
        "Update an existing category",
        registry.update_schema(kind),
        |catalog, input| updated(&catalog.update_category(input)?),
    );
    registry.register(
        "delete_category",
        "Delete a category (fails while groups, models or child categories reference it)",
        uid_schema("uid", "UID of the category to delete"),
        |catalog, input| {
            let uid = str_arg(input, "uid")?;
            catalog.delete_category(uid)?;
            Ok(deleted(EntityKind::Category, uid))
        },
    );
    registry.register(
        "list_categories",
        "List all categories or filter by parent category",
        filter_schema(&[("parent_category_uid", "Filter by parent category UID (optional)")]),
        |catalog, input| {
            let parent = uid_filter(input, "parent_category_uid")?;
            listed(EntityKind::Category, &catalog.list_categories(parent.as_ref())?)
        },
    );
    registry.register(
        "get_category",
        "Get a single category by UID",
        uid_schema("uid", "UID of the category"),
        get_entity::<Category>,
    );
}

fn specification_groups(registry: &mut ToolRegistry) {
    let kind = EntityKind::SpecificationGroup;
    registry.register(
        "create_specification_group",
        "Create a specification group within a category",
        registry.create_schema(kind),
        |catalog, input| created(&catalog.create_specification_group(input)?),
    );
    registry.register(
        "update_specification_group",
        "Update an existing specification group",
        registry.update_schema(kind),
        |catalog, input| updated(&catalog.update_specification_group(input)?),
    );
    registry.register(
        "delete_specification_group",
        "Delete a specification group without specifications",
        uid_schema("uid", "UID of the specification group to delete"),
        |catalog, input| {
            let uid = str_arg(input, "uid")?;
            catalog.delete_specification_group(uid)?;
            Ok(deleted(EntityKind::SpecificationGroup, uid))
        },
    );
    registry.register(
        "list_specification_groups",
        "List specification groups, optionally of one category",
        filter_schema(&[("category_uid", "Filter by category UID (optional)")]),
        |catalog, input| {
            let category = uid_filter(input, "category_uid")?;
            listed(
                EntityKind::SpecificationGroup,
                &catalog.list_specification_groups(category.as_ref())?,
            )
        },
    );
    registry.register(
        "get_specification_group",
        "Get a single specification group by UID",
        uid_schema("uid", "UID of the specification group"),
        get_entity::<SpecificationGroup>,
    );
}

fn specifications(registry: &mut ToolRegistry) {
    let kind = EntityKind::Specification;
    registry.register(
        "create_specification",
        "Create a specification; type_options must match the type",
        registry.create_schema(kind),
        |catalog, input| created(&catalog.create_specification(input)?),
    );
    registry.register(
        "update_specification",
        "Update a specification; a type change re-checks its type_options",
        registry.update_schema(kind),
        |catalog, input| updated(&catalog.update_specification(input)?),
    );
    registry.register(
        "delete_specification",
        "Delete a specification without enum options, presets or values",
        uid_schema("uid", "UID of the specification to delete"),
        |catalog, input| {
            let uid = str_arg(input, "uid")?;
            catalog.delete_specification(uid)?;
            Ok(deleted(EntityKind::Specification, uid))
        },
    );
    registry.register(
        "list_specifications",
        "List specifications, optionally of one group",
        filter_schema(&[(
            "specification_group_uid",
            "Filter by specification group UID (optional)",
        )]),
        |catalog, input| {
            let group = uid_filter(input, "specification_group_uid")?;
            listed(EntityKind::Specification, &catalog.list_specifications(group.as_ref())?)
        },
    );
    registry.register(
        "get_specification",
        "Get a single specification by UID",
        uid_schema("uid", "UID of the specification"),
        get_entity::<Specification>,
    );
}

fn enum_options(registry: &mut ToolRegistry) {
    let kind = EntityKind::EnumOption;
    registry.register(
        "create_enum_option",
        "Create an option for an Enum Plus specification",
        registry.create_schema(kind),
        |catalog, input| created(&catalog.create_enum_option(input)?),
    );
    registry.register(
        "update_enum_option",
        "Update an existing enum option",
        registry.update_schema(kind),
        |catalog, input| updated(&catalog.update_enum_option(input)?),
    );
    registry.register(
        "delete_enum_option",
        "Delete an enum option",
        uid_schema("uid", "UID of the enum option to delete"),
        |catalog, input| {
            let uid = str_arg(input, "uid")?;
            catalog.delete_enum_option(uid)?;
            Ok(deleted(EntityKind::EnumOption, uid))
        },
    );
    registry.register(
        "list_enum_options",
        "List enum options, optionally of one specification",
        filter_schema(&[("specification_uid", "Filter by specification UID (optional)")]),
        |catalog, input| {
            let spec = uid_filter(input, "specification_uid")?;
            listed(EntityKind::EnumOption, &catalog.list_enum_options(spec.as_ref())?)
        },
    );
    registry.register(
        "get_enum_option",
        "Get a single enum option by UID",
        uid_schema("uid", "UID of the enum option"),
        get_entity::<EnumOption>,
    );
}

fn models(registry: &mut ToolRegistry) {
    let kind = EntityKind::Model;
    registry.register(
        "create_model",
        "Create a machine model in a category",
        registry.create_schema(kind),
        |catalog, input| created(&catalog.create_model(input)?),
    );
    registry.register(
        "update_model",
        "Update an existing model",
        registry.update_schema(kind),
        |catalog, input| updated(&catalog.update_model(input)?),
    );
    registry.register(
        "delete_model",
        "Delete a model no preset, machine or instance refers to",
        uid_schema("uid", "UID of the model to delete"),
        |catalog, input| {
            let uid = str_arg(input, "uid")?;
            catalog.delete_model(uid)?;
            Ok(deleted(EntityKind::Model, uid))
        },
    );
    registry.register(
        "list_models",
        "List models, optionally of one category",
        filter_schema(&[("category_uid", "Filter by category UID (optional)")]),
        |catalog, input| {
            let category = uid_filter(input, "category_uid")?;
            listed(EntityKind::Model, &catalog.list_models(category.as_ref())?)
        },
    );
    registry.register(
        "get_model",
        "Get a single model by UID",
        uid_schema("uid", "UID of the model"),
        get_entity::<Model>,
    );
}

fn preset_filter(input: &Value) -> Result<PresetFilter> {
    Ok(PresetFilter {
        level: parsed_filter(input, "preset_level")?,
        target: uid_filter(input, "preset_target_uid")?,
        specification: uid_filter(input, "specification_uid")?,
    })
}

fn presets(registry: &mut ToolRegistry) {
    let kind = EntityKind::SpecificationPreset;
    registry.register(
        "create_specification_preset",
        "Create a category- or model-level preset constraining a specification",
        registry.create_schema(kind),
        |catalog, input| created(&catalog.create_specification_preset(input)?),
    );
    registry.register(
        "update_specification_preset",
        "Update an existing specification preset",
        registry.update_schema(kind),
        |catalog, input| updated(&catalog.update_specification_preset(input)?),
    );
    registry.register(
        "delete_specification_preset",
        "Delete a specification preset",
        uid_schema("uid", "UID of the preset to delete"),
        |catalog, input| {
            let uid = str_arg(input, "uid")?;
            catalog.delete_specification_preset(uid)?;
            Ok(deleted(EntityKind::SpecificationPreset, uid))
        },
    );
    registry.register(
        "list_specification_presets",
        "List specification presets, optionally filtered",
        filter_schema(&[
            ("preset_level", "category or model (optional)"),
            ("preset_target_uid", "Filter by target UID (optional)"),
            ("specification_uid", "Filter by specification UID (optional)"),
        ]),
        list_presets,
    );
    registry.register(
        "get_specification_preset",
        "Get a single specification preset by UID",
        uid_schema("uid", "UID of the preset"),
        get_entity::<SpecificationPreset>,
    );
}

fn list_presets(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let presets = catalog.list_specification_presets(&preset_filter(input)?)?;
    let data = super::to_value(&presets)?;
    if presets.is_empty() {
        return Ok(ToolOutput::with_data("No specification presets found", data));
    }
    let blocks: Vec<String> = presets
        .iter()
        .map(|p| {
            format!(
                "- Preset UID: {}\n  Level: {}\n  Target: {}\n  Specification: {}\n  Allowed: {}",
                p.uid,
                p.preset_level,
                p.preset_target_uid,
                p.specification_uid,
                p.allowed_values.type_name()
            )
        })
        .collect();
    Ok(ToolOutput::with_data(
        format!("Found {} presets:\n\n{}", presets.len(), blocks.join("\n\n")),
        data,
    ))
}

#[cfg(test)]
mod tests {
    use crate::catalog::fixtures;
    use crate::tools::{ToolError, ToolRegistry};
    use serde_json::json;

    #[test]
    fn test_specification_lifecycle_through_tools() {
        let fx = fixtures::catalog();
        let tools = ToolRegistry::new();
        let cat = fx.category("c", None);
        let group = fx.group(&cat.uid);

        let out = tools
            .call(
                &fx.catalog,
                "create_specification",
                &json!({
                    "name": "glue",
                    "specification_group_uid": group.uid,
                    "label": { "en": "Glue" },
                    "type": "Enum Plus",
                    "type_options": { "allow_multiple": true }
                }),
            )
            .unwrap();
        let spec_uid = out.data.unwrap()["uid"].as_str().unwrap().to_string();

        tools
            .call(
                &fx.catalog,
                "create_enum_option",
                &json!({ "name": "pur", "specification_uid": spec_uid, "label": { "en": "PUR" } }),
            )
            .unwrap();

        let out = tools
            .call(&fx.catalog, "list_enum_options", &json!({ "specification_uid": spec_uid }))
            .unwrap();
        assert!(out.text.contains("PUR (pur)"));

        let err = tools
            .call(&fx.catalog, "delete_specification", &json!({ "uid": spec_uid }))
            .unwrap_err();
        assert_eq!(err.code(), ToolError::INTERNAL_ERROR);
        assert!(err.to_string().contains("1 dependent enum option(s)"));
    }

    #[test]
    fn test_list_filter_must_be_a_uid() {
        let fx = fixtures::catalog();
        let tools = ToolRegistry::new();
        let err = tools
            .call(&fx.catalog, "list_models", &json!({ "category_uid": "nope" }))
            .unwrap_err();
        assert_eq!(err.code(), ToolError::INVALID_PARAMS);

        let err = tools
            .call(&fx.catalog, "list_specification_presets", &json!({ "preset_level": "plant" }))
            .unwrap_err();
        assert_eq!(err.code(), ToolError::INVALID_PARAMS);
    }

    #[test]
    fn test_get_tool_echoes_json() {
        let fx = fixtures::catalog();
        let tools = ToolRegistry::new();
        let cat = fx.category("binders", None);
        let out = tools
            .call(&fx.catalog, "get_category", &json!({ "uid": cat.uid }))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out.text).unwrap();
        assert_eq!(parsed["name"], "binders");
    }
}
