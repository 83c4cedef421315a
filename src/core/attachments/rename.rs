//! Moving a part's attachment folder when its part number changes

use std::fs;

use super::{sanitize_identifier, Manifest, UploadRoot};
use crate::core::category::PerCategory;
use crate::core::error::{InventoryError, InventoryResult};

/// Rewritten manifest texts and whether a folder was actually moved
#[derive(Debug, Clone)]
pub struct RenameOutcome {
    pub manifests: PerCategory<Option<String>>,
    pub moved: bool,
}

/// Relocate the attachment tree of `old_part_no` to `new_part_no`
///
/// If the old folder exists it is renamed (never copied) and the leading
/// segment of every stored path is replaced with the new folder name. If it
/// does not exist, an empty category tree is created at the new location and
/// the manifests are returned untouched. A new location that already exists
/// is refused in both cases. Any filesystem error is returned and
/// the caller must not persist the part in that case.
pub fn propagate_rename(
    root: &UploadRoot,
    old_part_no: &str,
    new_part_no: &str,
    manifests: &PerCategory<Option<String>>,
) -> InventoryResult<RenameOutcome> {
    let old_dir = root.part_dir(old_part_no);
    let new_dir = root.part_dir(new_part_no);

    if old_dir == new_dir {
        root.create_part_tree(new_part_no)?;
        return Ok(RenameOutcome {
            manifests: manifests.clone(),
            moved: false,
        });
    }

    if new_dir.exists() {
        return Err(InventoryError::DirectoryConflict { target: new_dir });
    }

    if !old_dir.exists() {
        root.create_part_tree(new_part_no)?;
        return Ok(RenameOutcome {
            manifests: manifests.clone(),
            moved: false,
        });
    }

    if let Some(parent) = new_dir.parent() {
        fs::create_dir_all(parent).map_err(|e| InventoryError::io("creating upload directory", parent, e))?;
    }
    fs::rename(&old_dir, &new_dir).map_err(|e| InventoryError::io("moving attachment directory", &old_dir, e))?;
    tracing::info!("moved {} to {}", old_dir.display(), new_dir.display());

    let prefix = sanitize_identifier(new_part_no);
    let mut rewritten = PerCategory::default();
    for (category, text) in manifests.iter() {
        *rewritten.get_mut(category) = text.as_deref().map(|text| rebase_text(text, &prefix));
    }

    Ok(RenameOutcome {
        manifests: rewritten,
        moved: true,
    })
}

/// Undo a completed [`propagate_rename`] by moving the folder back
pub fn revert_rename(root: &UploadRoot, old_part_no: &str, new_part_no: &str) -> InventoryResult<()> {
    let old_dir = root.part_dir(old_part_no);
    let new_dir = root.part_dir(new_part_no);
    fs::rename(&new_dir, &old_dir).map_err(|e| InventoryError::io("restoring attachment directory", &new_dir, e))
}

/// Rebase one manifest; text that does not decode is passed through as-is
fn rebase_text(text: &str, prefix: &str) -> String {
    let mut manifest = match Manifest::parse(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("leaving undecodable attachment list unchanged during rename: {}", e);
            return text.to_string();
        }
    };
    if manifest.is_empty() {
        return text.to_string();
    }

    manifest.rebase(prefix);
    match manifest.encode() {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::warn!("could not re-encode attachment list during rename: {}", e);
            text.to_string()
        }
    }
}
