//! `taxo model` command - Machine model management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::common::{self, DeleteArgs, NewArgs, ShowArgs, UpdateArgs};
use crate::cli::helpers::open_catalog;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::Model;

#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    /// List models
    List(ListArgs),

    /// Show a model's details
    Show(ShowArgs),

    /// Create a new model in a category
    New(NewArgs),

    /// Update a model
    Update(UpdateArgs),

    /// Delete a model no machine, instance or preset refers to
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only models of this category
    #[arg(long, short = 'c')]
    pub category: Option<Uid>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("NAME", 30),
    ColumnDef::new("CATEGORY", 28),
    ColumnDef::new("MANUFACTURER", 28),
];

pub fn run(cmd: ModelCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ModelCommands::List(args) => {
            let models = open_catalog(global)?.list_models(args.category.as_ref())?;
            let rows = models
                .iter()
                .map(|m| {
                    TableRow::new(&m.uid)
                        .cell(CellValue::Id(m.uid.to_string()))
                        .cell(CellValue::Text(m.name.clone()))
                        .cell(CellValue::Id(m.category_uid.to_string()))
                        .cell(CellValue::optional(m.manufacturer_uid.as_ref()))
                })
                .collect();
            common::list_output(&models, rows, COLUMNS, "models", global)
        }
        ModelCommands::Show(args) => common::show::<Model>(args, global),
        ModelCommands::New(args) => {
            let model = open_catalog(global)?.create_model(&args.input.to_value()?)?;
            common::created(&model, global)
        }
        ModelCommands::Update(args) => {
            let model = open_catalog(global)?.update_model(&args.to_value()?)?;
            common::updated(&model, global)
        }
        ModelCommands::Delete(args) => {
            common::delete(EntityKind::Model, args, global, |c, uid| c.delete_model(uid))
        }
    }
}
