//! Part operations that keep records and attachment folders in step
//!
//! Every mutation touches the filesystem first and the store last. When the
//! store write fails, files written by the operation are deleted and a moved
//! attachment folder is moved back, so the record and its folder never point
//! at each other inconsistently after an error.

use std::path::PathBuf;

use crate::core::attachments::{
    ingest, merge, propagate_rename, revert_rename, sanitize_identifier, AttachmentDescriptor, IncomingFile,
    RenameOutcome, SkippedFile, UploadRoot,
};
use crate::core::category::{Category, PerCategory};
use crate::core::error::{InventoryError, InventoryResult};
use crate::core::store::{PartPage, PartQuery, PartStore};
use crate::entities::part::{Part, PartChanges, PartFields};

/// Files to upload, grouped by category
pub type Uploads = PerCategory<Vec<IncomingFile>>;

/// A saved part plus the uploads that could not be stored
#[derive(Debug)]
pub struct PartOutcome {
    pub part: Part,
    pub skipped: Vec<(Category, SkippedFile)>,
}

/// Descriptors written during one operation, before they are persisted
#[derive(Debug, Default)]
struct IngestedBatch {
    stored: PerCategory<Vec<AttachmentDescriptor>>,
    skipped: Vec<(Category, SkippedFile)>,
}

/// The part inventory: a record store and the upload root it describes
pub struct Inventory {
    store: PartStore,
    uploads: UploadRoot,
}

impl Inventory {
    pub fn new(store: PartStore, uploads: UploadRoot) -> Self {
        Self { store, uploads }
    }

    pub fn store(&self) -> &PartStore {
        &self.store
    }

    pub fn upload_root(&self) -> &UploadRoot {
        &self.uploads
    }

    /// Find a part by exact part number, falling back to its numeric id
    pub fn resolve(&self, part_ref: &str) -> InventoryResult<Part> {
        let part_ref = part_ref.trim();
        if let Some(part) = self.store.find_by_part_no(part_ref)? {
            return Ok(part);
        }
        if let Ok(id) = part_ref.parse::<i64>() {
            if let Some(part) = self.store.get(id)? {
                return Ok(part);
            }
        }
        Err(InventoryError::PartNotFound(part_ref.to_string()))
    }

    pub fn get(&self, part_ref: &str) -> InventoryResult<Part> {
        self.resolve(part_ref)
    }

    pub fn list(&self, query: &PartQuery) -> InventoryResult<PartPage> {
        self.store.list(query)
    }

    /// Every part in export order
    pub fn export_rows(&self) -> InventoryResult<Vec<Part>> {
        self.store.all()
    }

    /// Create a part, its attachment folder, and its initial attachments
    pub fn create(&self, mut fields: PartFields, uploads: &Uploads) -> InventoryResult<PartOutcome> {
        fields.part_no = validated_part_no(&fields.part_no)?;
        if self.store.part_no_taken(&fields.part_no, None)? {
            return Err(InventoryError::DuplicatePartNo(fields.part_no));
        }
        self.ensure_folder_free(&fields.part_no, None)?;

        // A leftover folder with no record is reused; only a folder made here
        // is removed on failure.
        let fresh_tree = !self.uploads.part_dir(&fields.part_no).exists();
        self.uploads.create_part_tree(&fields.part_no)?;

        let batch = match self.ingest_all(&fields.part_no, uploads) {
            Ok(batch) => batch,
            Err(e) => {
                self.cleanup_tree(&fields.part_no, fresh_tree);
                return Err(e);
            }
        };

        let inserted = merge_batch(&empty_manifests(), &batch.stored)
            .and_then(|manifests| self.store.insert(&fields, &manifests));
        let id = match inserted {
            Ok(id) => id,
            Err(e) => {
                self.discard(&batch);
                self.cleanup_tree(&fields.part_no, fresh_tree);
                return Err(e);
            }
        };

        tracing::info!("created part {} (id {})", fields.part_no, id);
        Ok(PartOutcome {
            part: self.load(id)?,
            skipped: batch.skipped,
        })
    }

    /// Change attributes, relocate attachments on a part number change, and
    /// append new uploads
    pub fn update(&self, part_ref: &str, changes: &PartChanges, uploads: &Uploads) -> InventoryResult<PartOutcome> {
        let current = self.resolve(part_ref)?;
        let mut fields = changes.apply(&current.fields);
        fields.part_no = validated_part_no(&fields.part_no)?;

        let old_part_no = current.part_no();
        let renamed = fields.part_no != old_part_no;
        if renamed {
            if self.store.part_no_taken(&fields.part_no, Some(current.id))? {
                return Err(InventoryError::DuplicatePartNo(fields.part_no));
            }
            self.ensure_folder_free(&fields.part_no, Some(current.id))?;
        }

        // Relocate first so new uploads land in the folder the record will name
        let relocated = propagate_rename(&self.uploads, old_part_no, &fields.part_no, &current.manifests)?;

        let batch = match self.ingest_all(&fields.part_no, uploads) {
            Ok(batch) => batch,
            Err(e) => {
                self.undo_rename(&relocated, old_part_no, &fields.part_no);
                return Err(e);
            }
        };

        let persisted = merge_batch(&relocated.manifests, &batch.stored)
            .and_then(|manifests| self.store.update(current.id, &fields, &manifests));
        if let Err(e) = persisted {
            self.discard(&batch);
            self.undo_rename(&relocated, old_part_no, &fields.part_no);
            return Err(e);
        }

        if renamed {
            tracing::info!("renamed part {} to {}", old_part_no, fields.part_no);
        } else {
            tracing::info!("updated part {}", fields.part_no);
        }
        Ok(PartOutcome {
            part: self.load(current.id)?,
            skipped: batch.skipped,
        })
    }

    /// Add files to one category of an existing part
    pub fn attach(&self, part_ref: &str, category: Category, files: &[IncomingFile]) -> InventoryResult<PartOutcome> {
        let part = self.resolve(part_ref)?;
        let outcome = ingest(&self.uploads, category, part.part_no(), files)?;
        let skipped: Vec<_> = outcome.skipped.into_iter().map(|s| (category, s)).collect();

        if outcome.descriptors.is_empty() {
            return Ok(PartOutcome { part, skipped });
        }

        let persisted = merge(part.manifests.get(category).as_deref(), &outcome.descriptors)
            .map_err(InventoryError::from)
            .and_then(|text| self.store.update_manifest(part.id, category, &text));
        if let Err(e) = persisted {
            for descriptor in &outcome.descriptors {
                self.uploads.delete_file(&descriptor.path);
            }
            return Err(e);
        }

        Ok(PartOutcome {
            part: self.load(part.id)?,
            skipped,
        })
    }

    /// Remove the first attachment named `name` and delete its file
    ///
    /// A backing file that is already gone, or cannot be deleted, is logged
    /// and the descriptor is still removed.
    pub fn detach(&self, part_ref: &str, category: Category, name: &str) -> InventoryResult<AttachmentDescriptor> {
        let part = self.resolve(part_ref)?;
        let mut manifest = part.attachments(category).manifest;

        let removed = manifest
            .remove_named(name)
            .ok_or_else(|| InventoryError::AttachmentNotFound {
                part_no: part.part_no().to_string(),
                category,
                name: name.to_string(),
            })?;

        self.uploads.delete_file(&removed.path);
        self.store.update_manifest(part.id, category, &manifest.encode()?)?;

        tracing::info!("removed {} attachment {} from part {}", category, removed.name, part.part_no());
        Ok(removed)
    }

    /// Delete a part's attachment folder and then its record
    ///
    /// If the folder cannot be removed the record is kept.
    pub fn delete(&self, part_ref: &str) -> InventoryResult<Part> {
        let part = self.resolve(part_ref)?;
        self.uploads.remove_part_tree(part.part_no())?;
        self.store.delete(part.id)?;
        tracing::info!("deleted part {} (id {})", part.part_no(), part.id);
        Ok(part)
    }

    /// Absolute path of a part's attachment folder
    pub fn folder(&self, part_ref: &str) -> InventoryResult<PathBuf> {
        let part = self.resolve(part_ref)?;
        let path = self.uploads.part_dir(part.part_no());
        if !path.is_dir() {
            return Err(InventoryError::FolderNotFound {
                part_no: part.part_no().to_string(),
                path,
            });
        }
        Ok(path)
    }

    /// Refuse a part number whose folder already belongs to another part
    fn ensure_folder_free(&self, part_no: &str, except_id: Option<i64>) -> InventoryResult<()> {
        let folder = sanitize_identifier(part_no);
        let existing = self
            .store
            .part_numbers()?
            .into_iter()
            .find(|(id, other)| Some(*id) != except_id && sanitize_identifier(other) == folder);

        match existing {
            Some((_, existing)) => Err(InventoryError::SharedFolder {
                part_no: part_no.to_string(),
                existing,
                folder,
            }),
            None => Ok(()),
        }
    }

    fn load(&self, id: i64) -> InventoryResult<Part> {
        self.store
            .get(id)?
            .ok_or_else(|| InventoryError::PartNotFound(id.to_string()))
    }

    /// Ingest every category; on a batch-fatal error nothing written stays
    fn ingest_all(&self, part_no: &str, uploads: &Uploads) -> InventoryResult<IngestedBatch> {
        let mut batch = IngestedBatch::default();
        for (category, files) in uploads.iter() {
            match ingest(&self.uploads, category, part_no, files) {
                Ok(outcome) => {
                    batch
                        .skipped
                        .extend(outcome.skipped.into_iter().map(|s| (category, s)));
                    *batch.stored.get_mut(category) = outcome.descriptors;
                }
                Err(e) => {
                    self.discard(&batch);
                    return Err(e);
                }
            }
        }
        Ok(batch)
    }

    fn discard(&self, batch: &IngestedBatch) {
        for (_, descriptors) in batch.stored.iter() {
            for descriptor in descriptors {
                self.uploads.delete_file(&descriptor.path);
            }
        }
    }

    fn cleanup_tree(&self, part_no: &str, fresh_tree: bool) {
        if !fresh_tree {
            return;
        }
        if let Err(e) = self.uploads.remove_part_tree(part_no) {
            tracing::error!("could not clean up attachment folder for {}: {}", part_no, e);
        }
    }

    fn undo_rename(&self, relocated: &RenameOutcome, old_part_no: &str, new_part_no: &str) {
        if !relocated.moved {
            return;
        }
        if let Err(e) = revert_rename(&self.uploads, old_part_no, new_part_no) {
            tracing::error!(
                "attachment folder left at {} after failed update of {}: {}",
                self.uploads.part_dir(new_part_no).display(),
                old_part_no,
                e
            );
        }
    }
}

fn validated_part_no(raw: &str) -> InventoryResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::BlankPartNo);
    }
    Ok(trimmed.to_string())
}

/// Manifests of a new part: an empty list in every category
fn empty_manifests() -> PerCategory<Option<String>> {
    let mut manifests = PerCategory::default();
    for category in Category::ALL {
        *manifests.get_mut(category) = Some("[]".to_string());
    }
    manifests
}

/// Append freshly stored descriptors; categories without uploads keep their text
fn merge_batch(
    base: &PerCategory<Option<String>>,
    stored: &PerCategory<Vec<AttachmentDescriptor>>,
) -> InventoryResult<PerCategory<Option<String>>> {
    let mut merged = base.clone();
    for (category, descriptors) in stored.iter() {
        if !descriptors.is_empty() {
            *merged.get_mut(category) = Some(merge(base.get(category).as_deref(), descriptors)?);
        }
    }
    Ok(merged)
}
