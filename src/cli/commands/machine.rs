//! `taxo machine` command - Machines, model instances and specification values

use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::{json, Value};

use crate::catalog::MachineDetails;
use crate::cli::commands::common::{self, DeleteArgs, NewArgs, ShowArgs, UpdateArgs};
use crate::cli::helpers::{open_catalog, parse_json, print_json, print_record, print_written};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::Uid;
use crate::entities::{MachineModelInstance, MachineStatus};

#[derive(Subcommand, Debug)]
pub enum MachineCommands {
    /// List machines
    List(ListArgs),

    /// Show a machine with its model instances
    Show(ShowArgs),

    /// Create a machine; its primary instance is created with it
    New(NewArgs),

    /// Update a machine (a new primary model rebinds the primary instance)
    Update(UpdateArgs),

    /// Delete a machine with its instances and values
    Delete(DeleteArgs),

    /// Add a secondary model instance
    AddInstance(AddInstanceArgs),

    /// Move or relabel a model instance
    UpdateInstance(UpdateArgs),

    /// Remove a secondary model instance and its values
    RemoveInstance(DeleteArgs),

    /// Set the value of a specification for a model instance
    SetValue(SetValueArgs),

    /// List stored specification values
    Values(ValuesArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only machines with this status (draft or published)
    #[arg(long, short = 's')]
    pub status: Option<MachineStatus>,
}

#[derive(clap::Args, Debug)]
pub struct AddInstanceArgs {
    /// UID of the machine
    pub machine: String,

    /// UID of the model this unit is built from
    #[arg(long, short = 'm')]
    pub model: String,

    /// Position inside the machine (0 is the primary unit)
    #[arg(long, short = 'p')]
    pub position: u32,

    /// Label shown instead of the position
    #[arg(long, short = 'l')]
    pub label: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetValueArgs {
    /// UID of the model instance
    pub instance: String,

    /// UID of the specification
    pub spec: String,

    /// Value payload as JSON, e.g. '{"numerical": 42}' or '{"boolean": "yes"}'
    pub value: String,

    /// Mark the value as inherited from the model
    #[arg(long)]
    pub inherited: bool,
}

#[derive(clap::Args, Debug)]
pub struct ValuesArgs {
    /// Only values of this model instance
    #[arg(long, short = 'i')]
    pub instance: Option<Uid>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("NAME", 30),
    ColumnDef::new("STATUS", 11),
    ColumnDef::new("SERIAL", 16),
    ColumnDef::new("YEAR", 6),
    ColumnDef::new("PRIMARY MODEL", 28),
];

const INSTANCE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("POS", 5),
    ColumnDef::new("LABEL", 20),
    ColumnDef::new("MODEL", 28),
];

const VALUE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("INSTANCE", 28),
    ColumnDef::new("SPECIFICATION", 28),
    ColumnDef::new("TYPE", 17),
    ColumnDef::new("VALUE", 40),
    ColumnDef::new("INHERITED", 11),
];

pub fn run(cmd: MachineCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        MachineCommands::List(args) => run_list(args, global),
        MachineCommands::Show(args) => {
            let details = open_catalog(global)?.get_machine(&args.uid)?;
            show_details(&details, global)
        }
        MachineCommands::New(args) => {
            let details = open_catalog(global)?.create_machine(&args.input.to_value()?)?;
            written("Created", &details, global)
        }
        MachineCommands::Update(args) => {
            let details = open_catalog(global)?.update_machine(&args.to_value()?)?;
            written("Updated", &details, global)
        }
        MachineCommands::Delete(args) => run_delete(args, global),
        MachineCommands::AddInstance(args) => {
            let mut input = json!({
                "machine_uid": args.machine,
                "model_uid": args.model,
                "position": args.position,
            });
            if let Some(label) = args.label {
                input["instance_label"] = Value::String(label);
            }
            let instance = open_catalog(global)?.add_model_instance(&input)?;
            print_written("Added", "model instance", instance.uid.as_str(), &instance, global)
        }
        MachineCommands::UpdateInstance(args) => {
            let instance = open_catalog(global)?.update_model_instance(&args.to_value()?)?;
            common::updated(&instance, global)
        }
        MachineCommands::RemoveInstance(args) => {
            let values = open_catalog(global)?.remove_model_instance(&args.uid)?;
            removed(
                "model instance",
                &args.uid,
                json!({ "uid": args.uid, "values": values }),
                global,
                || format!("and {} specification value(s)", values),
            )
        }
        MachineCommands::SetValue(args) => run_set_value(args, global),
        MachineCommands::Values(args) => run_values(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let machines = open_catalog(global)?.list_machines(args.status)?;
    let rows = machines
        .iter()
        .map(|m| {
            TableRow::new(&m.uid)
                .cell(CellValue::Id(m.uid.to_string()))
                .cell(CellValue::Text(m.name.clone()))
                .cell(CellValue::Status(m.status))
                .cell(CellValue::optional(m.serial_number.as_ref()))
                .cell(CellValue::optional(m.year_of_construction))
                .cell(CellValue::Id(m.primary_model_uid.to_string()))
        })
        .collect();
    common::list_output(&machines, rows, COLUMNS, "machines", global)
}

fn written(verb: &str, details: &MachineDetails, global: &GlobalOpts) -> Result<()> {
    print_written(verb, "machine", details.machine.uid.as_str(), details, global)?;
    if matches!(global.format, OutputFormat::Auto | OutputFormat::Tsv) && !global.quiet {
        if let Some(primary) = details.primary() {
            println!("  primary instance {}", style(&primary.uid).cyan());
        }
    }
    Ok(())
}

fn show_details(details: &MachineDetails, global: &GlobalOpts) -> Result<()> {
    if global.format != OutputFormat::Auto {
        return print_record(details, details.machine.uid.as_str(), global.format);
    }

    let machine = &details.machine;
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("UID").bold(), style(&machine.uid).cyan());
    println!("{}: {}", style("Name").bold(), style(&machine.name).yellow());
    println!("{}: {}", style("Status").bold(), machine.status);
    if let Some(serial) = &machine.serial_number {
        println!("{}: {}", style("Serial").bold(), serial);
    }
    if let Some(year) = machine.year_of_construction {
        println!("{}: {}", style("Built").bold(), year);
    }
    println!("{}: {}", style("Primary model").bold(), machine.primary_model_uid);
    println!("{}", style("─".repeat(60)).dim());
    println!();

    let rows: Vec<TableRow> = details.instances.iter().map(instance_row).collect();
    TableFormatter::new(INSTANCE_COLUMNS, "model instances")
        .quiet(global.quiet)
        .output(&rows, OutputFormat::Tsv);
    Ok(())
}

fn instance_row(instance: &MachineModelInstance) -> TableRow {
    TableRow::new(&instance.uid)
        .cell(CellValue::Id(instance.uid.to_string()))
        .cell(CellValue::Number(i64::from(instance.position)))
        .cell(CellValue::Text(instance.display_label()))
        .cell(CellValue::Id(instance.model_uid.to_string()))
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let deletion = open_catalog(global)?.delete_machine(&args.uid)?;
    removed(
        "machine",
        &args.uid,
        json!({ "uid": args.uid, "instances": deletion.instances, "values": deletion.values }),
        global,
        || {
            format!(
                "with {} model instance(s) and {} specification value(s)",
                deletion.instances, deletion.values
            )
        },
    )
}

fn removed(
    noun: &str,
    uid: &str,
    data: Value,
    global: &GlobalOpts,
    detail: impl FnOnce() -> String,
) -> Result<()> {
    match global.format {
        OutputFormat::Json => print_json(&data),
        OutputFormat::Id => {
            println!("{}", uid);
            Ok(())
        }
        _ => {
            if !global.quiet {
                println!(
                    "{} Deleted {} {} {}",
                    style("✓").green(),
                    noun,
                    style(uid).cyan(),
                    detail()
                );
            }
            Ok(())
        }
    }
}

fn run_set_value(args: SetValueArgs, global: &GlobalOpts) -> Result<()> {
    let input = json!({
        "machine_model_instance_uid": args.instance,
        "specification_uid": args.spec,
        "value": parse_json(&args.value)?,
        "is_inherited": args.inherited,
    });
    let write = open_catalog(global)?.set_specification_value(&input)?;
    let row = write.row();
    match global.format {
        OutputFormat::Json => print_json(row),
        _ => {
            if !global.quiet {
                println!(
                    "{} {} value of {} on {}: {}",
                    style("✓").green(),
                    capitalize(write.verb()),
                    style(&row.specification_uid).cyan(),
                    style(&row.machine_model_instance_uid).cyan(),
                    row.value.summary()
                );
            }
            Ok(())
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn run_values(args: ValuesArgs, global: &GlobalOpts) -> Result<()> {
    let values = open_catalog(global)?.list_specification_values(args.instance.as_ref())?;
    if global.format == OutputFormat::Id {
        return Err(miette::miette!(
            "specification values have no UID of their own; use --format tsv or json"
        ));
    }
    let rows = values
        .iter()
        .map(|v| {
            TableRow::new(&v.machine_model_instance_uid)
                .cell(CellValue::Id(v.machine_model_instance_uid.to_string()))
                .cell(CellValue::Id(v.specification_uid.to_string()))
                .cell(CellValue::Type(v.value.shape().to_string()))
                .cell(CellValue::Text(v.value.summary()))
                .cell(CellValue::Flag(v.is_inherited))
        })
        .collect();
    common::list_output(&values, rows, VALUE_COLUMNS, "specification values", global)
}
