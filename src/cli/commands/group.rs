//! `taxo group` command - Specification group management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::common::{self, DeleteArgs, NewArgs, ShowArgs, UpdateArgs};
use crate::cli::helpers::open_catalog;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::SpecificationGroup;

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// List specification groups
    List(ListArgs),

    /// Show a group's details
    Show(ShowArgs),

    /// Create a new specification group
    New(NewArgs),

    /// Update a specification group
    Update(UpdateArgs),

    /// Delete a group without specifications
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only groups of this category
    #[arg(long, short = 'c')]
    pub category: Option<Uid>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("NAME", 24),
    ColumnDef::new("LABEL", 30),
    ColumnDef::new("TYPE", 20),
    ColumnDef::new("CATEGORY", 28),
];

pub fn run(cmd: GroupCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        GroupCommands::List(args) => {
            let groups = open_catalog(global)?.list_specification_groups(args.category.as_ref())?;
            let rows = groups
                .iter()
                .map(|g| {
                    TableRow::new(&g.uid)
                        .cell(CellValue::Id(g.uid.to_string()))
                        .cell(CellValue::Text(g.name.clone()))
                        .cell(CellValue::Text(g.label.en.clone()))
                        .cell(CellValue::Type(g.group_type.to_string()))
                        .cell(CellValue::Id(g.category_uid.to_string()))
                })
                .collect();
            common::list_output(&groups, rows, COLUMNS, "specification groups", global)
        }
        GroupCommands::Show(args) => common::show::<SpecificationGroup>(args, global),
        GroupCommands::New(args) => {
            let group = open_catalog(global)?.create_specification_group(&args.input.to_value()?)?;
            common::created(&group, global)
        }
        GroupCommands::Update(args) => {
            let group = open_catalog(global)?.update_specification_group(&args.to_value()?)?;
            common::updated(&group, global)
        }
        GroupCommands::Delete(args) => {
            common::delete(EntityKind::SpecificationGroup, args, global, |c, uid| {
                c.delete_specification_group(uid)
            })
        }
    }
}
