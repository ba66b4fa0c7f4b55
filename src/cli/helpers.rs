//! Shared helper functions for CLI commands
//!
//! Project and catalog resolution, JSON input assembly from `--data` and
//! `--set`, and record output.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;

use crate::catalog::Catalog;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::project::{Project, ProjectError};

/// Project named by `--project`, else found by walking up
pub fn locate_project(global: &GlobalOpts) -> std::result::Result<Project, ProjectError> {
    match &global.project {
        Some(root) => Project::at(root),
        None => Project::discover(),
    }
}

/// Catalog over the project's configured data directory
pub fn open_catalog(global: &GlobalOpts) -> Result<Catalog> {
    let project = locate_project(global).map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(Some(&project));
    let data_dir = project.data_dir(config.data_dir());
    tracing::debug!(data_dir = %data_dir.display(), "opening catalog");
    Ok(Catalog::open(data_dir))
}

/// Record fields given on the command line
#[derive(clap::Args, Debug, Default)]
pub struct InputArgs {
    /// JSON object with the record's fields (`@path` reads a file, `-` reads stdin)
    #[arg(long, short = 'd', value_name = "JSON")]
    pub data: Option<String>,

    /// Set one field; dotted keys nest (`label.en=Binders`), values parse as JSON
    /// when they can and are taken as strings otherwise
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl InputArgs {
    /// Merge `--data` and every `--set` into one JSON object
    pub fn to_value(&self) -> Result<Value> {
        let mut object = match &self.data {
            Some(raw) => match parse_json(&read_source(raw)?)? {
                Value::Object(map) => map,
                _ => return Err(miette::miette!("--data must be a JSON object")),
            },
            None => Map::new(),
        };
        for assignment in &self.set {
            let (key, raw) = assignment
                .split_once('=')
                .ok_or_else(|| {
                    miette::miette!("invalid --set '{}': expected KEY=VALUE", assignment)
                })?;
            set_path(&mut object, key.trim(), scalar(raw))?;
        }
        Ok(Value::Object(object))
    }
}

fn read_source(raw: &str) -> Result<String> {
    if raw == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        Ok(buf)
    } else if let Some(path) = raw.strip_prefix('@') {
        std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("cannot read {}: {}", path, e))
    } else {
        Ok(raw.to_string())
    }
}

pub fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| miette::miette!("invalid JSON: {}", e))
}

fn scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_path(object: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    match key.split_once('.') {
        None if key.is_empty() => Err(miette::miette!("--set needs a field name")),
        None => {
            object.insert(key.to_string(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let child = object
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match child {
                Value::Object(inner) => set_path(inner, rest, value),
                _ => Err(miette::miette!("--set {}: '{}' is not an object", key, head)),
            }
        }
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

/// Print a single record; `auto` renders YAML
pub fn print_record<T: Serialize>(value: &T, uid: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Id => {
            println!("{}", uid);
            Ok(())
        }
        _ => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(())
        }
    }
}

/// Confirmation line after a write, or the record itself in json/id formats
pub fn print_written<T: Serialize>(
    verb: &str,
    noun: &str,
    uid: &str,
    value: &T,
    global: &GlobalOpts,
) -> Result<()> {
    match global.format {
        OutputFormat::Json | OutputFormat::Id => print_record(value, uid, global.format),
        _ => {
            if !global.quiet {
                println!(
                    "{} {} {} {}",
                    style("✓").green(),
                    verb,
                    noun,
                    style(uid).cyan()
                );
            }
            Ok(())
        }
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
