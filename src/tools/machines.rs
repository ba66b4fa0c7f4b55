//! Tools over machines, their model instances and stored values

use serde_json::{json, Value};

use super::{
    filter_schema, listed, parsed_filter, str_arg, to_value, uid_filter, uid_schema, updated,
    ToolOutput, ToolRegistry,
};
use crate::catalog::Catalog;
use crate::core::error::Result;
use crate::core::identity::EntityKind;
use crate::entities::MachineStatus;

pub(super) fn register(registry: &mut ToolRegistry) {
    registry.register(
        "create_machine",
        "Create a new machine with a primary model",
        registry.create_schema(EntityKind::Machine),
        create_machine,
    );
    registry.register(
        "update_machine",
        "Update an existing machine",
        registry.update_schema(EntityKind::Machine),
        update_machine,
    );
    registry.register(
        "delete_machine",
        "Delete a machine and all its model instances and specification values",
        uid_schema("uid", "UID of the machine to delete"),
        delete_machine,
    );
    registry.register(
        "list_machines",
        "List all machines",
        filter_schema(&[("status", "draft or published (optional)")]),
        |catalog, input| {
            let status: Option<MachineStatus> = parsed_filter(input, "status")?;
            listed(EntityKind::Machine, &catalog.list_machines(status)?)
        },
    );
    registry.register(
        "get_machine",
        "Get a single machine by UID with all model instances",
        uid_schema("uid", "UID of the machine"),
        |catalog, input| ToolOutput::json(&catalog.get_machine(str_arg(input, "uid")?)?),
    );
    registry.register(
        "add_model_instance",
        "Add a secondary model instance to a machine",
        registry.create_schema(EntityKind::MachineModelInstance),
        add_model_instance,
    );
    registry.register(
        "update_model_instance",
        "Move or relabel a model instance",
        registry.update_schema(EntityKind::MachineModelInstance),
        |catalog, input| updated(&catalog.update_model_instance(input)?),
    );
    registry.register(
        "remove_model_instance",
        "Remove a model instance from a machine (cannot remove primary)",
        uid_schema("instance_uid", "UID of the model instance"),
        remove_model_instance,
    );
    registry.register(
        "set_specification_value",
        "Set a specification value for a machine model instance",
        registry.create_schema(EntityKind::MachineSpecificationValue),
        set_specification_value,
    );
    registry.register(
        "list_specification_values",
        "List stored specification values, optionally of one model instance",
        filter_schema(&[("machine_model_instance_uid", "Filter by model instance UID (optional)")]),
        list_specification_values,
    );
}

fn create_machine(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let details = catalog.create_machine(input)?;
    let primary = details
        .primary()
        .map(|i| i.uid.to_string())
        .unwrap_or_default();
    Ok(ToolOutput::with_data(
        format!(
            "Machine created successfully!\nUID: {}\nName: {}\nPrimary Model: {}\nPrimary Instance UID: {}",
            details.machine.uid, details.machine.name, details.machine.primary_model_uid, primary
        ),
        to_value(&details)?,
    ))
}

fn update_machine(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let details = catalog.update_machine(input)?;
    Ok(ToolOutput::with_data(
        format!(
            "Machine updated successfully!\nUID: {}\nName: {}",
            details.machine.uid, details.machine.name
        ),
        to_value(&details)?,
    ))
}

fn delete_machine(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let uid = str_arg(input, "uid")?;
    let deletion = catalog.delete_machine(uid)?;
    Ok(ToolOutput::with_data(
        format!(
            "Machine deleted successfully (UID: {})\nDeleted {} model instances and {} specification values",
            uid, deletion.instances, deletion.values
        ),
        json!({ "uid": uid, "instances": deletion.instances, "values": deletion.values }),
    ))
}

fn add_model_instance(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let instance = catalog.add_model_instance(input)?;
    let mut text = format!(
        "Model instance added successfully!\nUID: {}\nModel: {}\nPosition: {}",
        instance.uid, instance.model_uid, instance.position
    );
    if let Some(label) = &instance.instance_label {
        text.push_str(&format!("\nLabel: {}", label));
    }
    Ok(ToolOutput::with_data(text, to_value(&instance)?))
}

fn remove_model_instance(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let uid = str_arg(input, "instance_uid")?;
    let values = catalog.remove_model_instance(uid)?;
    Ok(ToolOutput::with_data(
        format!(
            "Model instance removed successfully (UID: {})\nDeleted {} specification values",
            uid, values
        ),
        json!({ "uid": uid, "values": values }),
    ))
}

fn set_specification_value(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let write = catalog.set_specification_value(input)?;
    let row = write.row();
    Ok(ToolOutput::with_data(
        format!(
            "Specification value {} successfully!\nInstance: {}\nSpecification: {}\nValue: {}",
            write.verb(),
            row.machine_model_instance_uid,
            row.specification_uid,
            row.value.summary()
        ),
        to_value(row)?,
    ))
}

fn list_specification_values(catalog: &Catalog, input: &Value) -> Result<ToolOutput> {
    let instance = uid_filter(input, "machine_model_instance_uid")?;
    let values = catalog.list_specification_values(instance.as_ref())?;
    let data = to_value(&values)?;
    if values.is_empty() {
        return Ok(ToolOutput::with_data("No specification values found", data));
    }
    let blocks: Vec<String> = values
        .iter()
        .map(|v| {
            format!(
                "- {}\n  Instance: {}\n  Specification: {}{}",
                v.value.summary(),
                v.machine_model_instance_uid,
                v.specification_uid,
                if v.is_inherited { "\n  Inherited" } else { "" }
            )
        })
        .collect();
    Ok(ToolOutput::with_data(
        format!("Found {} specification values:\n\n{}", values.len(), blocks.join("\n\n")),
        data,
    ))
}
