//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker directory identifying a project root
pub const PROJECT_DIR: &str = ".partkeep";

/// Represents a partkeep project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .partkeep/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let project_dir = root.join(PROJECT_DIR);
        if project_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        Self::write_structure(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .partkeep/ exists; existing data is kept
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Self::write_structure(&root)?;
        Ok(Self { root })
    }

    fn write_structure(root: &Path) -> Result<(), ProjectError> {
        let project_dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&project_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = project_dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# partkeep project configuration

# Directory holding attachment folders, relative to the project root
# upload_dir: uploads

# SQLite database file, relative to the project root
# database: .partkeep/parts.db

# Rows per page for `partkeep part list`
# page_size: 500

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .partkeep configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a partkeep project (searched from {searched_from:?}). Run 'partkeep init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("partkeep project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
