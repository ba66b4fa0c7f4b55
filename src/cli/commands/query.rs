//! Read-only queries: `taxo tree`, `taxo validate`, `taxo search`, `taxo related`

use console::style;
use miette::Result;

use crate::cli::helpers::{open_catalog, print_json, print_record, truncate_str};
use crate::cli::table::{CellValue, ColumnDef, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::EntityKind;

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// UID of the category
    pub category: String,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// UID of the machine
    pub machine: String,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search term (matched against names and labels, case-insensitive)
    pub query: String,

    /// Limit to these collections (e.g. category,spec,model)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    pub kinds: Vec<EntityKind>,

    /// Limit number of results
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,
}

#[derive(clap::Args, Debug)]
pub struct RelatedArgs {
    /// UID of any record
    pub uid: String,
}

pub fn run_tree(args: TreeArgs, global: &GlobalOpts) -> Result<()> {
    let tree = open_catalog(global)?.category_tree(&args.category)?;
    if global.format != OutputFormat::Auto {
        return print_record(&tree, tree.category.uid.as_str(), global.format);
    }

    println!(
        "{} {} {}",
        style(&tree.category.label.en).bold(),
        style(format!("({})", tree.category.name)).dim(),
        style(&tree.category.uid).cyan()
    );
    let last_group = tree.specification_groups.len().saturating_sub(1);
    for (i, entry) in tree.specification_groups.iter().enumerate() {
        let (branch, indent) = if i == last_group {
            ("└──", "    ")
        } else {
            ("├──", "│   ")
        };
        println!(
            "{} {} {}",
            branch,
            style(&entry.group.label.en).yellow(),
            style(format!("[{}]", entry.group.group_type)).dim()
        );
        let last_spec = entry.specifications.len().saturating_sub(1);
        for (j, spec) in entry.specifications.iter().enumerate() {
            let leaf = if j == last_spec { "└──" } else { "├──" };
            let required = if spec.required {
                style(" *").red().to_string()
            } else {
                String::new()
            };
            println!(
                "{}{} {}{} {}",
                indent,
                leaf,
                spec.label.en,
                required,
                style(format!("<{}>", spec.spec_type())).dim()
            );
        }
    }
    if !global.quiet {
        println!();
        println!(
            "{} group(s), {} specification(s); {} marks required",
            tree.specification_groups.len(),
            tree.specification_count(),
            style("*").red()
        );
    }
    Ok(())
}

pub fn run_validate(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let report = open_catalog(global)?.validate_machine(&args.machine)?;
    match global.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Yaml => print_record(&report, report.machine_uid.as_str(), global.format)?,
        _ => {
            if report.valid {
                println!(
                    "{} Machine {} is ready to publish ({} required specification(s) filled)",
                    style("✓").green(),
                    style(&report.machine_uid).cyan(),
                    report.required_count
                );
            } else {
                println!(
                    "{} Machine {} is missing {} required specification value(s)",
                    style("✗").red(),
                    style(&report.machine_uid).cyan(),
                    report.missing_count()
                );
                for instance in report.instances.iter().filter(|i| !i.missing.is_empty()) {
                    println!();
                    println!(
                        "  {} {}",
                        style(format!("Instance {}", instance.instance_label)).bold(),
                        style(&instance.instance_uid).dim()
                    );
                    for missing in &instance.missing {
                        println!(
                            "    {} {} ({}) {}",
                            style("•").red(),
                            missing.label.en,
                            missing.name,
                            style(&missing.uid).dim()
                        );
                    }
                }
            }
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(miette::miette!(
            "machine {} is not ready to publish",
            report.machine_uid
        ))
    }
}

const SEARCH_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("KIND", 24),
    ColumnDef::new("UID", 28),
    ColumnDef::new("NAME", 24),
    ColumnDef::new("LABEL", 36),
];

pub fn run_search(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let kinds: Option<Vec<String>> = if args.kinds.is_empty() {
        None
    } else {
        Some(args.kinds.iter().map(|k| k.collection().to_string()).collect())
    };
    let mut hits = open_catalog(global)?.search(&args.query, kinds.as_deref())?;
    hits.truncate(args.limit);

    let rows = hits
        .iter()
        .map(|h| {
            TableRow::new(&h.uid)
                .cell(CellValue::Type(h.kind.noun().to_string()))
                .cell(CellValue::Id(h.uid.clone()))
                .cell(CellValue::Text(h.name.clone()))
                .cell(CellValue::Text(h.label.clone()))
        })
        .collect();
    super::common::list_output(&hits, rows, SEARCH_COLUMNS, "results", global)
}

pub fn run_related(args: RelatedArgs, global: &GlobalOpts) -> Result<()> {
    let relations = open_catalog(global)?.relationships(&args.uid)?;
    match global.format {
        OutputFormat::Json => return print_json(&relations),
        OutputFormat::Yaml => return print_record(&relations, &args.uid, global.format),
        _ => {}
    }

    let title = relations
        .entity
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("");
    println!(
        "{} {} {}",
        style(relations.kind.noun()).bold(),
        style(&args.uid).cyan(),
        title
    );
    for (relation, records) in &relations.related {
        if records.is_empty() {
            continue;
        }
        println!();
        println!("  {} ({})", style(relation).yellow(), records.len());
        for record in records {
            let uid = record.get("uid").and_then(|u| u.as_str());
            let label = record
                .pointer("/label/en")
                .or_else(|| record.get("name"))
                .and_then(|l| l.as_str())
                .unwrap_or("");
            match uid {
                Some(uid) => println!("    {} {}", style(uid).cyan(), truncate_str(label, 48)),
                None => println!(
                    "    {} {}",
                    style("(value)").dim(),
                    record
                        .get("specification_uid")
                        .and_then(|s| s.as_str())
                        .unwrap_or("")
                ),
            }
        }
    }
    if !global.quiet && relations.related_count() == 0 {
        println!();
        println!("  {}", style("no related records").dim());
    }
    Ok(())
}
