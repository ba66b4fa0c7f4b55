//! `taxo tool` command - List and call the named tools

use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::json;

use crate::cli::helpers::{open_catalog, print_json, InputArgs};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::tools::ToolRegistry;

#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// List the available tools
    List,

    /// Show one tool's description and input schema
    Show(ShowArgs),

    /// Call a tool with a JSON input object
    Call(CallArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Tool name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct CallArgs {
    /// Tool name (e.g. create_category)
    pub name: String,

    #[command(flatten)]
    pub input: InputArgs,
}

const COLUMNS: &[ColumnDef] = &[ColumnDef::new("NAME", 30), ColumnDef::new("DESCRIPTION", 80)];

pub fn run(cmd: ToolCommands, global: &GlobalOpts) -> Result<()> {
    let registry = ToolRegistry::new();
    match cmd {
        ToolCommands::List => {
            let tools = registry.list();
            let rows = tools
                .iter()
                .map(|t| {
                    TableRow::new(t.name)
                        .cell(CellValue::Text(t.name.to_string()))
                        .cell(CellValue::Text(t.description.to_string()))
                })
                .collect();
            super::common::list_output(&tools, rows, COLUMNS, "tools", global)
        }
        ToolCommands::Show(args) => {
            let tool = registry
                .get(&args.name)
                .ok_or_else(|| miette::miette!("Tool not found: {}", args.name))?;
            print_json(tool)
        }
        ToolCommands::Call(args) => {
            let catalog = open_catalog(global)?;
            let input = args.input.to_value()?;
            match registry.call(&catalog, &args.name, &input) {
                Ok(output) => {
                    match global.format {
                        OutputFormat::Json => print_json(&json!({
                            "content": output.to_content()["content"],
                            "data": output.data,
                        }))?,
                        _ => println!("{}", output.text),
                    }
                    Ok(())
                }
                Err(err) => {
                    if global.format == OutputFormat::Json {
                        print_json(&json!({ "error": err.to_error_object() }))?;
                    } else if !global.quiet {
                        eprintln!("{} {}", style("error").red().bold(), style(err.code()).dim());
                    }
                    Err(err.into())
                }
            }
        }
    }
}
