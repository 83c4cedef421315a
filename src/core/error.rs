//! Error types for inventory operations

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::category::Category;

/// Errors surfaced by the part store, the attachment tree, and the
/// operations that combine them
#[derive(Debug, Error, Diagnostic)]
pub enum InventoryError {
    #[error("part number '{0}' already exists")]
    #[diagnostic(
        code(partkeep::duplicate_part_no),
        help("choose a different part number or update the existing part")
    )]
    DuplicatePartNo(String),

    #[error("part number must not be blank")]
    #[diagnostic(code(partkeep::blank_part_no))]
    BlankPartNo,

    #[error("part '{0}' not found")]
    #[diagnostic(
        code(partkeep::part_not_found),
        help("use a part number or numeric id from `partkeep part list`")
    )]
    PartNotFound(String),

    #[error("no {category} attachment named '{name}' on part '{part_no}'")]
    #[diagnostic(code(partkeep::attachment_not_found))]
    AttachmentNotFound {
        part_no: String,
        category: Category,
        name: String,
    },

    #[error("attachment folder for part '{part_no}' does not exist: {path:?}")]
    #[diagnostic(code(partkeep::folder_not_found))]
    FolderNotFound { part_no: String, path: PathBuf },

    #[error("could not find a free file name for '{name}' after {attempts} attempts")]
    #[diagnostic(code(partkeep::too_many_collisions))]
    TooManyCollisions { name: String, attempts: u32 },

    #[error("cannot move attachments to {target:?}: directory already exists")]
    #[diagnostic(
        code(partkeep::directory_conflict),
        help("another part already uses this folder name; pick a part number that sanitizes differently")
    )]
    DirectoryConflict { target: PathBuf },

    #[error("part number '{part_no}' would share attachment folder '{folder}' with part '{existing}'")]
    #[diagnostic(
        code(partkeep::shared_folder),
        help("part numbers that differ only in case or punctuation map to the same folder")
    )]
    SharedFolder {
        part_no: String,
        existing: String,
        folder: String,
    },

    #[error("{action} {path:?}: {source}")]
    #[diagnostic(code(partkeep::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    #[diagnostic(code(partkeep::database))]
    Database(#[from] rusqlite::Error),

    #[error("manifest encoding error: {0}")]
    #[diagnostic(code(partkeep::manifest))]
    Manifest(#[from] serde_json::Error),
}

impl InventoryError {
    /// Wrap an I/O error with the action that failed and the path it failed on
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InventoryError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;
