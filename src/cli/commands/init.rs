//! `partkeep init` command - Initialize a new project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::attachments::UploadRoot;
use crate::core::project::{Project, ProjectError};
use crate::core::{Config, PartStore};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Reinitialize even if .partkeep/ already exists (keeps existing data)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            // Create the database and schema up front
            let config = Config::load(&project);
            PartStore::open(&config.database_path(&project))?;
            let upload_dir = config.upload_dir(&project);
            UploadRoot::new(&upload_dir).ensure()?;

            println!(
                "{} Initialized partkeep project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root(), &upload_dir);
            println!();
            println!("Next steps:");
            println!(
                "  {} Add your first part",
                style("partkeep part add --part-no P-100 --photo photo.jpg").yellow()
            );
            println!("  {} List all parts", style("partkeep part list").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} partkeep project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("partkeep init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path, upload_dir: &Path) {
    let entries = [".partkeep/", ".partkeep/config.yaml", ".partkeep/parts.db"];

    for entry in entries {
        if root.join(entry).exists() {
            let prefix = if entry.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(entry).dim());
        }
    }

    let uploads = upload_dir.strip_prefix(root).unwrap_or(upload_dir);
    println!("  📁 {}", style(format!("{}/", uploads.display())).dim());
}
