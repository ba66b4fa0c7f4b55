//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    category::CategoryCommands,
    group::GroupCommands,
    init::InitArgs,
    machine::MachineCommands,
    model::ModelCommands,
    option::OptionCommands,
    preset::PresetCommands,
    query::{RelatedArgs, SearchArgs, TreeArgs, ValidateArgs},
    spec::SpecCommands,
    tool::ToolCommands,
};

#[derive(Parser)]
#[command(name = "taxo")]
#[command(author, version, about = "Machine taxonomy toolkit")]
#[command(long_about = "Manage categories, specifications, presets and machines stored as plain JSON collections.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .taxo/)
    #[arg(long, global = true, env = "TAXO_PROJECT")]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new taxonomy project
    Init(InitArgs),

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Specification group management
    #[command(subcommand)]
    Group(GroupCommands),

    /// Specification management
    #[command(subcommand)]
    Spec(SpecCommands),

    /// Enum option management (options of Enum Plus specifications)
    #[command(name = "option")]
    #[command(subcommand)]
    EnumOption(OptionCommands),

    /// Machine model management
    #[command(subcommand)]
    Model(ModelCommands),

    /// Specification preset management (category- and model-level constraints)
    #[command(subcommand)]
    Preset(PresetCommands),

    /// Machine, model instance and specification value management
    #[command(subcommand)]
    Machine(MachineCommands),

    /// Show a category with its groups and specifications
    Tree(TreeArgs),

    /// Check that a machine has every required specification filled
    Validate(ValidateArgs),

    /// Search by name or label across collections
    Search(SearchArgs),

    /// Show every record related to a UID
    Related(RelatedArgs),

    /// List or call the named tools
    #[command(subcommand)]
    Tool(ToolCommands),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
    /// Just UIDs, one per line
    Id,
}
