use clap::{Parser, ValueEnum};
use miette::Result;
use taxo::cli::commands;
use taxo::cli::helpers::locate_project;
use taxo::cli::{Cli, Commands, OutputFormat};
use taxo::core::{logging, Config};

fn main() -> Result<()> {
    // Install miette's fancy error handler for diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .wrap_lines(false)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let mut global = cli.global;

    let project = locate_project(&global).ok();
    let config = Config::load(project.as_ref());
    logging::init(config.log_level(), global.verbose);

    if global.format == OutputFormat::Auto {
        if let Some(format) = config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
        {
            global.format = format;
        }
    }

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Category(cmd) => commands::category::run(cmd, &global),
        Commands::Group(cmd) => commands::group::run(cmd, &global),
        Commands::Spec(cmd) => commands::spec::run(cmd, &global),
        Commands::EnumOption(cmd) => commands::option::run(cmd, &global),
        Commands::Model(cmd) => commands::model::run(cmd, &global),
        Commands::Preset(cmd) => commands::preset::run(cmd, &global),
        Commands::Machine(cmd) => commands::machine::run(cmd, &global),
        Commands::Tree(args) => commands::query::run_tree(args, &global),
        Commands::Validate(args) => commands::query::run_validate(args, &global),
        Commands::Search(args) => commands::query::run_search(args, &global),
        Commands::Related(args) => commands::query::run_related(args, &global),
        Commands::Tool(cmd) => commands::tool::run(cmd, &global),
    }
}
