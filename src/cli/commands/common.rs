//! Argument shapes and output shared by the record commands

use console::style;
use miette::Result;
use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::cli::helpers::{open_catalog, print_json, print_record, print_written, InputArgs};
use crate::cli::table::{ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::EntityKind;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// UID of the record
    pub uid: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// UID of the record to update
    pub uid: String,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// UID of the record to delete
    pub uid: String,
}

impl UpdateArgs {
    /// Input object with `uid` set from the positional argument
    pub fn to_value(&self) -> Result<Value> {
        let mut value = self.input.to_value()?;
        value["uid"] = Value::String(self.uid.clone());
        Ok(value)
    }
}

pub fn show<E: Entity>(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let entity: E = catalog.get(&args.uid)?;
    print_record(&entity, entity.uid().as_str(), global.format)
}

pub fn created<E: Entity>(entity: &E, global: &GlobalOpts) -> Result<()> {
    print_written("Created", E::KIND.noun(), entity.uid().as_str(), entity, global)
}

pub fn updated<E: Entity>(entity: &E, global: &GlobalOpts) -> Result<()> {
    print_written("Updated", E::KIND.noun(), entity.uid().as_str(), entity, global)
}

/// Run a delete and report it
pub fn delete(
    kind: EntityKind,
    args: DeleteArgs,
    global: &GlobalOpts,
    op: impl FnOnce(&Catalog, &str) -> crate::core::error::Result<()>,
) -> Result<()> {
    let catalog = open_catalog(global)?;
    op(&catalog, &args.uid)?;
    match global.format {
        OutputFormat::Json => print_json(&json!({ "uid": args.uid, "deleted": true })),
        OutputFormat::Id => {
            println!("{}", args.uid);
            Ok(())
        }
        _ => {
            if !global.quiet {
                println!(
                    "{} Deleted {} {}",
                    style("✓").green(),
                    kind.noun(),
                    style(&args.uid).cyan()
                );
            }
            Ok(())
        }
    }
}

/// Print a listing: the records themselves as JSON/YAML, else a table
pub fn list_output<T: Serialize>(
    items: &[T],
    rows: Vec<TableRow>,
    columns: &[ColumnDef],
    plural: &str,
    global: &GlobalOpts,
) -> Result<()> {
    match global.format {
        OutputFormat::Json => print_json(&items),
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&items).map_err(|e| miette::miette!("{}", e))?);
            Ok(())
        }
        format => {
            TableFormatter::new(columns, plural)
                .quiet(global.quiet)
                .output(&rows, format);
            Ok(())
        }
    }
}
