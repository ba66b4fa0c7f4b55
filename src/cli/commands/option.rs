//! `taxo option` command - Enum option management

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::common::{self, DeleteArgs, NewArgs, ShowArgs, UpdateArgs};
use crate::cli::helpers::open_catalog;
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityKind, Uid};
use crate::entities::EnumOption;

#[derive(Subcommand, Debug)]
pub enum OptionCommands {
    /// List enum options
    List(ListArgs),

    /// Show an enum option's details
    Show(ShowArgs),

    /// Create an option for an Enum Plus specification
    New(NewArgs),

    /// Update an enum option
    Update(UpdateArgs),

    /// Delete an enum option
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only options of this specification
    #[arg(long, short = 's')]
    pub spec: Option<Uid>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("UID", 28),
    ColumnDef::new("NAME", 24),
    ColumnDef::new("LABEL", 30),
    ColumnDef::new("SPECIFICATION", 28),
];

pub fn run(cmd: OptionCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OptionCommands::List(args) => {
            let options = open_catalog(global)?.list_enum_options(args.spec.as_ref())?;
            let rows = options
                .iter()
                .map(|o| {
                    TableRow::new(&o.uid)
                        .cell(CellValue::Id(o.uid.to_string()))
                        .cell(CellValue::Text(o.name.clone()))
                        .cell(CellValue::Text(o.label.en.clone()))
                        .cell(CellValue::Id(o.specification_uid.to_string()))
                })
                .collect();
            common::list_output(&options, rows, COLUMNS, "enum options", global)
        }
        OptionCommands::Show(args) => common::show::<EnumOption>(args, global),
        OptionCommands::New(args) => {
            let option = open_catalog(global)?.create_enum_option(&args.input.to_value()?)?;
            common::created(&option, global)
        }
        OptionCommands::Update(args) => {
            let option = open_catalog(global)?.update_enum_option(&args.to_value()?)?;
            common::updated(&option, global)
        }
        OptionCommands::Delete(args) => {
            common::delete(EntityKind::EnumOption, args, global, |c, uid| c.delete_enum_option(uid))
        }
    }
}
