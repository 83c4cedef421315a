//! Writing uploaded files into a part's category folder

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::{base_file_name, format_size, relative_path, sanitize_identifier, AttachmentDescriptor, UploadRoot};
use crate::core::category::Category;
use crate::core::error::{InventoryError, InventoryResult};

/// Highest `(n)` suffix tried before giving up on a file name
pub const MAX_COLLISION_SUFFIX: u32 = 10_000;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Where the bytes of an incoming file come from
#[derive(Debug, Clone)]
pub enum UploadSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file waiting to be stored as an attachment
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Name as supplied by the client, possibly with directory parts
    pub file_name: String,
    /// Declared MIME type
    pub content_type: String,
    pub source: UploadSource,
}

impl IncomingFile {
    /// A local file; the content type is guessed from its extension
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Self {
            file_name,
            content_type,
            source: UploadSource::Path(path),
        }
    }

    /// An in-memory payload with an explicit content type
    pub fn from_bytes(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            source: UploadSource::Bytes(bytes),
        }
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match &self.source {
            UploadSource::Path(path) => Ok(Box::new(File::open(path)?)),
            UploadSource::Bytes(bytes) => Ok(Box::new(bytes.as_slice())),
        }
    }
}

/// A file left out of a batch and why
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: String,
}

/// Descriptors for the files that were stored plus the ones that were not
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub descriptors: Vec<AttachmentDescriptor>,
    pub skipped: Vec<SkippedFile>,
}

impl IngestOutcome {
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty() && self.skipped.is_empty()
    }
}

/// Store `files` under `{root}/{sanitize(part_no)}/{category}/`
///
/// A file that cannot be read or written is logged, listed in
/// [`IngestOutcome::skipped`] and the rest of the batch carries on. Only a
/// failure to create the category folder aborts the batch.
pub fn ingest(
    root: &UploadRoot,
    category: Category,
    part_no: &str,
    files: &[IncomingFile],
) -> InventoryResult<IngestOutcome> {
    ingest_with_limit(root, category, part_no, files, MAX_COLLISION_SUFFIX)
}

fn ingest_with_limit(
    root: &UploadRoot,
    category: Category,
    part_no: &str,
    files: &[IncomingFile],
    max_suffix: u32,
) -> InventoryResult<IngestOutcome> {
    if part_no.trim().is_empty() {
        return Err(InventoryError::BlankPartNo);
    }

    let mut outcome = IngestOutcome::default();
    if files.is_empty() {
        return Ok(outcome);
    }

    let sanitized = sanitize_identifier(part_no);
    let dir = root.category_dir(part_no, category);
    fs::create_dir_all(&dir).map_err(|e| InventoryError::io("creating attachment directory", &dir, e))?;

    for file in files {
        match store_one(&dir, &sanitized, category, file, max_suffix) {
            Ok(descriptor) => {
                tracing::info!(
                    "stored {} as {}",
                    file.file_name,
                    dir.join(&descriptor.name).display()
                );
                outcome.descriptors.push(descriptor);
            }
            Err(e) => {
                tracing::warn!("skipping upload {}: {}", file.file_name, e);
                outcome.skipped.push(SkippedFile {
                    file_name: file.file_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

fn store_one(
    dir: &Path,
    sanitized_part: &str,
    category: Category,
    file: &IncomingFile,
    max_suffix: u32,
) -> InventoryResult<AttachmentDescriptor> {
    let mut reader = file
        .open()
        .map_err(|e| InventoryError::io("opening upload", &file.file_name, e))?;

    let (name, dest_path, mut dest) = create_unique(dir, &base_file_name(&file.file_name), max_suffix)?;

    let written = match io::copy(&mut reader, &mut dest).and_then(|n| dest.sync_all().map(|_| n)) {
        Ok(n) => n,
        Err(e) => {
            drop(dest);
            if let Err(cleanup) = fs::remove_file(&dest_path) {
                tracing::warn!("could not remove partial upload {}: {}", dest_path.display(), cleanup);
            }
            return Err(InventoryError::io("writing upload", dest_path, e));
        }
    };

    Ok(AttachmentDescriptor {
        size: format_size(written),
        content_type: file.content_type.clone(),
        path: relative_path(sanitized_part, category, &name),
        name,
    })
}

/// Create a file that did not exist before, adding `(n)` before the extension
/// on collision
///
/// `create_new` makes the existence check and the creation one step, so a
/// file that appears between probes is never truncated.
fn create_unique(dir: &Path, file_name: &str, max_suffix: u32) -> InventoryResult<(String, PathBuf, File)> {
    for attempt in 0..=max_suffix {
        let candidate = if attempt == 0 {
            file_name.to_string()
        } else {
            numbered_name(file_name, attempt)
        };
        let path = dir.join(&candidate);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((candidate, path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(InventoryError::io("creating upload", path, e)),
        }
    }

    Err(InventoryError::TooManyCollisions {
        name: file_name.to_string(),
        attempts: max_suffix,
    })
}

/// `photo.jpg` -> `photo(3).jpg`; the extension starts at the last dot
fn numbered_name(file_name: &str, n: u32) -> String {
    match file_name.rfind('.') {
        Some(dot) => format!("{}({}){}", &file_name[..dot], n, &file_name[dot..]),
        None => format!("{}({})", file_name, n),
    }
}
