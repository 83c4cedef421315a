//! Shared helper functions for CLI commands

use clap::ValueEnum;
use console::style;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::attachments::{SkippedFile, UploadRoot};
use crate::core::{Category, Config, Inventory, PartStore, Project};

/// An opened project: its configuration and the inventory it points at
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub inventory: Inventory,
}

impl Workspace {
    /// Discover the project (or use `--project`), load config, open the store
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load(&project);
        let uploads = UploadRoot::new(config.upload_dir(&project));
        uploads.ensure()?;
        let store = PartStore::open(&config.database_path(&project))?;

        tracing::debug!(
            "project {} (uploads: {})",
            project.root().display(),
            uploads.path().display()
        );

        Ok(Self {
            project,
            config,
            inventory: Inventory::new(store, uploads),
        })
    }

    /// The requested format, then the configured default, then `fallback`
    pub fn format(&self, global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
        if global.format != OutputFormat::Auto {
            return global.format;
        }
        self.config
            .default_format
            .as_deref()
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
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

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Warn about uploads that were left out of an operation
pub fn print_skipped(skipped: &[(Category, SkippedFile)]) {
    for (category, file) in skipped {
        eprintln!(
            "{} Skipped {} upload {}: {}",
            style("!").yellow(),
            category,
            style(&file.file_name).cyan(),
            file.reason
        );
    }
}
