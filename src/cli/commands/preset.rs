//! `taxo preset` command - Specification preset management

use clap::Subcommand;
use miette::Result;

use crate::catalog::PresetFilter;
use crate::cli::commands::common::{self, DeleteArgs, NewArgs, ShowArgs, UpdateArgs};
use crate::cli::helpers::open_catalog;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::{PresetLevel, SpecificationPreset};

#[derive(Subcommand, Debug)]
pub enum PresetCommands {
    /// List presets
    List(ListArgs),

    /// Show a preset's details
    Show(ShowArgs),

    /// Create a category- or model-level preset
    New(NewArgs),

    /// Update a preset
    Update(UpdateArgs),

    /// Delete a preset
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only presets of this level (category or model)
    #[arg(long, short = 'l')]
    pub level: Option<PresetLevel>,

    /// Only presets targeting this category or model
    #[arg(long, short = 't')]
    pub target: Option<Uid>,

    /// Only presets constraining this specification
    #[arg(long, short = 's')]
    pub spec: Option<Uid>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("LEVEL", 10),
    ColumnDef::new("TARGET", 28),
    ColumnDef::new("SPECIFICATION", 28),
    ColumnDef::new("ALLOWED", 17),
];

pub fn run(cmd: PresetCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PresetCommands::List(args) => {
            let filter = PresetFilter {
                level: args.level,
                target: args.target,
                specification: args.spec,
            };
            let presets = open_catalog(global)?.list_specification_presets(&filter)?;
            let rows = presets
                .iter()
                .map(|p| {
                    TableRow::new(&p.uid)
                        .cell(CellValue::Id(p.uid.to_string()))
                        .cell(CellValue::Type(p.preset_level.to_string()))
                        .cell(CellValue::Id(p.preset_target_uid.to_string()))
                        .cell(CellValue::Id(p.specification_uid.to_string()))
                        .cell(CellValue::Type(p.allowed_values.type_name().to_string()))
                })
                .collect();
            common::list_output(&presets, rows, COLUMNS, "presets", global)
        }
        PresetCommands::Show(args) => common::show::<SpecificationPreset>(args, global),
        PresetCommands::New(args) => {
            let preset =
                open_catalog(global)?.create_specification_preset(&args.input.to_value()?)?;
            common::created(&preset, global)
        }
        PresetCommands::Update(args) => {
            let preset = open_catalog(global)?.update_specification_preset(&args.to_value()?)?;
            common::updated(&preset, global)
        }
        PresetCommands::Delete(args) => {
            common::delete(EntityKind::SpecificationPreset, args, global, |c, uid| {
                c.delete_specification_preset(uid)
            })
        }
    }
}
