//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::Project;

const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_DATABASE: &str = ".partkeep/parts.db";
const DEFAULT_PAGE_SIZE: u32 = 500;

/// partkeep configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding attachment folders
    pub upload_dir: Option<PathBuf>,

    /// SQLite database file
    pub database: Option<PathBuf>,

    /// Rows per page for listings
    pub page_size: Option<u32>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: &Project) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. Global user config (~/.config/partkeep/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.partkeep/config.yaml)
        if let Some(project_config) = Self::read_file(&project.config_dir().join("config.yaml")) {
            config.merge(project_config);
        }

        // 4. Environment variables
        config.merge(Self::from_env());

        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring invalid config file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn from_env() -> Config {
        Config {
            upload_dir: std::env::var_os("PARTKEEP_UPLOAD_DIR").map(PathBuf::from),
            database: std::env::var_os("PARTKEEP_DATABASE").map(PathBuf::from),
            page_size: std::env::var("PARTKEEP_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok()),
            default_format: None,
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "partkeep")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.upload_dir.is_some() {
            self.upload_dir = other.upload_dir;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Absolute upload directory for a project
    pub fn upload_dir(&self, project: &Project) -> PathBuf {
        let dir = self
            .upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));
        project.resolve(&dir)
    }

    /// Absolute database path for a project
    pub fn database_path(&self, project: &Project) -> PathBuf {
        let db = self
            .database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
        project.resolve(&db)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.filter(|n| *n > 0).unwrap_or(DEFAULT_PAGE_SIZE)
    }
}
