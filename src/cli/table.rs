//! Table formatting for CLI list commands
//!
//! Every list command builds [`TableRow`]s and hands them to a
//! [`TableFormatter`], which renders aligned TSV for terminals, markdown
//! tables (via `tabled`) or bare UIDs.

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::entities::MachineStatus;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record UID (cyan)
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Specification type, group type, preset level and similar tags
    Type(String),
    /// Machine status with color coding
    Status(MachineStatus),
    /// Yes/no flag (yes highlighted)
    Flag(bool),
    /// Numeric value
    Number(i64),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Text for an optional value, `-` when absent
    pub fn optional(value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => CellValue::Text(v.to_string()),
            None => CellValue::Empty,
        }
    }

    fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Type(s) => s.clone(),
            CellValue::Status(status) => status.to_string(),
            CellValue::Flag(true) => "yes".to_string(),
            CellValue::Flag(false) => "no".to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty => "-".to_string(),
        }
    }

    /// Format for TSV output (with colors if terminal)
    fn format_tsv(&self, width: usize) -> String {
        let text = truncate_str(&self.raw(), width.saturating_sub(2));
        let styled = match self {
            CellValue::Id(_) => style(text).cyan(),
            CellValue::Status(MachineStatus::Published) => style(text).green(),
            CellValue::Status(MachineStatus::Draft) => style(text).dim(),
            CellValue::Flag(true) => style(text).yellow(),
            CellValue::Flag(false) | CellValue::Empty => style(text).dim(),
            CellValue::Number(_) => {
                return format!("{:>width$}", text, width = width);
            }
            CellValue::Text(_) | CellValue::Type(_) => style(text),
        };
        format!("{:<width$}", styled, width = width)
    }

    /// Format for Markdown output (no colors, escaped pipes)
    fn format_md(&self) -> String {
        self.raw().replace('|', "\\|")
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(header: &'static str, width: usize) -> Self {
        Self { header, width }
    }
}

/// A row of cell values, one per column
pub struct TableRow {
    pub uid: String,
    pub cells: Vec<CellValue>,
}

impl TableRow {
    pub fn new(uid: impl ToString) -> Self {
        Self {
            uid: uid.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, value: CellValue) -> Self {
        self.cells.push(value);
        self
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun_plural: &'a str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], noun_plural: &'a str) -> Self {
        Self {
            columns,
            noun_plural,
            show_summary: true,
        }
    }

    /// Skip the "N records found" line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        match format {
            OutputFormat::Md => self.output_md(rows),
            OutputFormat::Id => {
                for row in rows {
                    println!("{}", row.uid);
                }
            }
            _ => self.output_tsv(rows),
        }
    }

    /// Dynamic column widths: header or content, capped at the column width
    fn widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let content = rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.raw().chars().count())
                    .max()
                    .unwrap_or(0);
                col.header.len().max(content + 2).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        if rows.is_empty() {
            if self.show_summary {
                println!("No {} found.", self.noun_plural);
            }
            return;
        }

        let widths = self.widths(rows);
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        println!("{}", header.join(" "));
        println!("{}", style("-".repeat(widths.iter().sum::<usize>() + widths.len())).dim());

        for row in rows {
            let cells: Vec<String> = row
                .cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| cell.format_tsv(*w))
                .collect();
            println!("{}", cells.join(" "));
        }

        if self.show_summary {
            println!();
            println!(
                "{} {} found.",
                style(rows.len()).cyan(),
                self.noun_plural
            );
        }
    }

    fn output_md(&self, rows: &[TableRow]) {
        println!("{}", self.to_markdown(rows));
    }

    /// Markdown table of the rows
    pub fn to_markdown(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(row.cells.iter().map(|c| c.format_md()));
        }
        builder.build().with(Style::markdown()).to_string()
    }
}
