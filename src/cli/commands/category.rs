//! `taxo category` command - Category management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::common::{self, DeleteArgs, NewArgs, ShowArgs, UpdateArgs};
use crate::cli::helpers::open_catalog;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::Category;

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories
    List(ListArgs),

    /// Show a category's details
    Show(ShowArgs),

    /// Create a new category
    New(NewArgs),

    /// Update a category
    Update(UpdateArgs),

    /// Delete a category without groups, models, children or presets
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only direct children of this category
    #[arg(long, short = 'p')]
    pub parent: Option<Uid>,

    /// Only categories without a primary parent
    #[arg(long, conflicts_with = "parent")]
    pub roots: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("NAME", 24),
    ColumnDef::new("LABEL", 32),
    ColumnDef::new("PARENT", 28),
    ColumnDef::new("RANK", 6),
    ColumnDef::new("META", 6),
];

pub fn run(cmd: CategoryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CategoryCommands::List(args) => run_list(args, global),
        CategoryCommands::Show(args) => common::show::<Category>(args, global),
        CategoryCommands::New(args) => {
            let category = open_catalog(global)?.create_category(&args.input.to_value()?)?;
            common::created(&category, global)
        }
        CategoryCommands::Update(args) => {
            let category = open_catalog(global)?.update_category(&args.to_value()?)?;
            common::updated(&category, global)
        }
        CategoryCommands::Delete(args) => {
            common::delete(EntityKind::Category, args, global, |c, uid| c.delete_category(uid))
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let mut categories = catalog.list_categories(args.parent.as_ref())?;
    if args.roots {
        categories.retain(|c| c.parent_category_uid.is_none());
    }
    categories.sort_by(|a, b| {
        a.position_rank
            .cmp(&b.position_rank)
            .then_with(|| a.name.cmp(&b.name))
    });

    let rows = categories
        .iter()
        .map(|c| {
            TableRow::new(&c.uid)
                .cell(CellValue::Id(c.uid.to_string()))
                .cell(CellValue::Text(c.name.clone()))
                .cell(CellValue::Text(c.label.en.clone()))
                .cell(CellValue::optional(c.parent_category_uid.as_ref()))
                .cell(CellValue::Number(c.position_rank))
                .cell(CellValue::Flag(c.is_meta_category))
        })
        .collect();
    common::list_output(&categories, rows, COLUMNS, "categories", global)
}
