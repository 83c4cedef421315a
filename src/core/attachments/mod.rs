//! Per-part attachment trees and their manifests
//!
//! Layout on disk:
//!
//! ```text
//! {upload_root}/
//!   {sanitized part number}/
//!     photos/  drawings/  cad/  cnc/  invoice/
//! ```
//!
//! Every descriptor stored in a part's manifests points at a file inside that
//! part's folder. The functions in this module keep the two in lockstep:
//! ingestion writes files and hands back descriptors, renames move the folder
//! and rewrite paths, removal deletes the file behind a descriptor.

mod ingest;
mod manifest;
mod rename;
mod sanitize;

pub use ingest::{ingest, IncomingFile, IngestOutcome, SkippedFile, UploadSource, MAX_COLLISION_SUFFIX};
pub use manifest::{merge, AttachmentDescriptor, DecodedManifest, Manifest};
pub use rename::{propagate_rename, revert_rename, RenameOutcome};
pub use sanitize::{base_file_name, format_size, sanitize_identifier, FALLBACK_TOKEN};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::category::Category;
use crate::core::error::{InventoryError, InventoryResult};

/// What happened when deleting the file behind a descriptor
#[derive(Debug)]
pub enum FileRemoval {
    Deleted,
    AlreadyMissing,
    Failed(io::Error),
}

/// The directory all attachment trees live under
#[derive(Debug, Clone)]
pub struct UploadRoot {
    root: PathBuf,
}

impl UploadRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if missing
    pub fn ensure(&self) -> InventoryResult<()> {
        fs::create_dir_all(&self.root)
            .map_err(|e| InventoryError::io("creating upload directory", &self.root, e))
    }

    /// Folder holding every attachment of a part
    pub fn part_dir(&self, part_no: &str) -> PathBuf {
        self.root.join(sanitize_identifier(part_no))
    }

    pub fn category_dir(&self, part_no: &str, category: Category) -> PathBuf {
        self.part_dir(part_no).join(category.dir_name())
    }

    /// Absolute location of a manifest-relative path
    ///
    /// Empty, `.` and `..` segments are dropped so a stored path can never
    /// point outside the root.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relative
            .split(['/', '\\'])
            .filter(|seg| !matches!(*seg, "" | "." | ".."))
            .fold(self.root.clone(), |path, seg| path.join(seg))
    }

    /// Create a part folder with all five category subfolders
    pub fn create_part_tree(&self, part_no: &str) -> InventoryResult<PathBuf> {
        let part_dir = self.part_dir(part_no);
        for category in Category::ALL {
            let dir = part_dir.join(category.dir_name());
            fs::create_dir_all(&dir)
                .map_err(|e| InventoryError::io("creating attachment directory", &dir, e))?;
        }
        Ok(part_dir)
    }

    /// Remove a part folder and everything in it
    ///
    /// Returns `false` when there was nothing to remove.
    pub fn remove_part_tree(&self, part_no: &str) -> InventoryResult<bool> {
        let part_dir = self.part_dir(part_no);
        match fs::remove_dir_all(&part_dir) {
            Ok(()) => {
                tracing::info!("removed attachment directory {}", part_dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(InventoryError::io("removing attachment directory", &part_dir, e)),
        }
    }

    /// Delete the file a descriptor points at
    pub fn delete_file(&self, relative: &str) -> FileRemoval {
        let full_path = self.resolve(relative);
        match fs::remove_file(&full_path) {
            Ok(()) => {
                tracing::debug!("deleted attachment file {}", full_path.display());
                FileRemoval::Deleted
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("attachment file already missing: {}", full_path.display());
                FileRemoval::AlreadyMissing
            }
            Err(e) => {
                tracing::warn!("could not remove attachment file {}: {}", full_path.display(), e);
                FileRemoval::Failed(e)
            }
        }
    }
}

/// Relative manifest path for a file in a part's category folder
pub(crate) fn relative_path(sanitized_part: &str, category: Category, file_name: &str) -> String {
    format!("{}/{}/{}", sanitized_part, category.dir_name(), file_name)
}
