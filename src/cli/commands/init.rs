//! `taxo init` command - Initialize a new taxonomy project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::identity::EntityKind;
use crate::core::config::Config;
use crate::core::project::{Project, ProjectError, PROJECT_DIR};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Reinitialize even if .taxo/ already exists (collection files are kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    // an existing project's own config still counts on --force
    let existing = Project::at(&path).ok();
    let config = Config::load(existing.as_ref());
    let data_dir = config.data_dir();

    match Project::init(&path, args.force, data_dir) {
        Ok(project) => {
            println!(
                "{} Initialized taxonomy project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(&project, data_dir);
            println!();
            println!("Next steps:");
            println!(
                "  {} Create your first category",
                style("taxo category new --set name=... --set label.en=...").yellow()
            );
            println!(
                "  {} Browse the available tools",
                style("taxo tool list").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Taxonomy project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("taxo init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(project: &Project, data_dir: &str) {
    let config = format!("{}/config.yaml", PROJECT_DIR);
    println!("  {}", style(&config).dim());
    let dir = project.data_dir(data_dir);
    for kind in EntityKind::all() {
        if dir.join(kind.file_name()).exists() {
            println!("  {}", style(format!("{}/{}", data_dir, kind.file_name())).dim());
        }
    }
}
