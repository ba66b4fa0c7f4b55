//! `taxo spec` command - Specification management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::common::{self, DeleteArgs, NewArgs, ShowArgs, UpdateArgs};
use crate::cli::helpers::open_catalog;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{Specification, SpecificationType};

#[derive(Subcommand, Debug)]
pub enum SpecCommands {
    /// List specifications
    List(ListArgs),

    /// Show a specification's details
    Show(ShowArgs),

    /// Create a new specification (`type` and matching `type_options`)
    New(NewArgs),

    /// Update a specification
    Update(UpdateArgs),

    /// Delete a specification without enum options, presets or values
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only specifications of this group
    #[arg(long, short = 'g')]
    pub group: Option<Uid>,

    /// Only specifications of this type (e.g. "Enum Plus")
    #[arg(long = "type", short = 't')]
    pub spec_type: Option<SpecificationType>,

    /// Only required specifications
    #[arg(long)]
    pub required: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("NAME", 24),
    ColumnDef::new("LABEL", 30),
    ColumnDef::new("TYPE", 17),
    ColumnDef::new("REQUIRED", 10),
    ColumnDef::new("GROUP", 28),
];

pub fn run(cmd: SpecCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SpecCommands::List(args) => run_list(args, global),
        SpecCommands::Show(args) => common::show::<Specification>(args, global),
        SpecCommands::New(args) => {
            let spec = open_catalog(global)?.create_specification(&args.input.to_value()?)?;
            common::created(&spec, global)
        }
        SpecCommands::Update(args) => {
            let spec = open_catalog(global)?.update_specification(&args.to_value()?)?;
            common::updated(&spec, global)
        }
        SpecCommands::Delete(args) => {
            common::delete(EntityKind::Specification, args, global, |c, uid| {
                c.delete_specification(uid)
            })
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut specs = open_catalog(global)?.list_specifications(args.group.as_ref())?;
    specs.retain(|s| {
        args.spec_type.map_or(true, |t| s.spec_type() == t) && (!args.required || s.required)
    });

    let rows = specs
        .iter()
        .map(|s| {
            TableRow::new(&s.uid)
                .cell(CellValue::Id(s.uid.to_string()))
                .cell(CellValue::Text(s.name.clone()))
                .cell(CellValue::Text(s.label.en.clone()))
                .cell(CellValue::Type(s.spec_type().to_string()))
                .cell(CellValue::Flag(s.required))
                .cell(CellValue::Id(s.specification_group_uid.to_string()))
        })
        .collect();
    common::list_output(&specs, rows, COLUMNS, "specifications", global)
}
