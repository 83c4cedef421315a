//! Audit of stored manifests against the upload directory

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use walkdir::WalkDir;

use crate::core::attachments::Manifest;
use crate::core::category::Category;
use crate::core::error::InventoryResult;
use crate::core::inventory::Inventory;

/// One inconsistency between the store and the filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// Stored manifest text is not a valid attachment list
    InvalidManifest {
        part_no: String,
        category: Category,
        error: String,
    },

    /// A descriptor points at a file that does not exist
    MissingFile {
        part_no: String,
        category: Category,
        name: String,
        path: String,
    },

    /// A file under the upload root that no manifest references
    OrphanFile { path: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::InvalidManifest {
                part_no,
                category,
                error,
            } => write!(f, "{} {}: invalid attachment list ({})", part_no, category, error),
            Finding::MissingFile {
                part_no,
                category,
                name,
                path,
            } => write!(f, "{} {}: '{}' missing at {}", part_no, category, name, path),
            Finding::OrphanFile { path } => write!(f, "unreferenced file {}", path),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsistencyReport {
    pub parts_checked: usize,
    pub files_checked: usize,
    pub findings: Vec<Finding>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

impl Inventory {
    /// Compare every manifest with the upload directory; nothing is modified
    pub fn check(&self) -> InventoryResult<ConsistencyReport> {
        let root = self.upload_root();
        let parts = self.export_rows()?;
        let mut report = ConsistencyReport {
            parts_checked: parts.len(),
            ..Default::default()
        };
        let mut referenced = HashSet::new();

        for part in &parts {
            for (category, text) in part.manifests.iter() {
                let Some(text) = text.as_deref() else {
                    continue;
                };
                let manifest = match Manifest::parse(text) {
                    Ok(manifest) => manifest,
                    Err(e) => {
                        report.findings.push(Finding::InvalidManifest {
                            part_no: part.part_no().to_string(),
                            category,
                            error: e.to_string(),
                        });
                        continue;
                    }
                };

                for descriptor in &manifest {
                    let full_path = root.resolve(&descriptor.path);
                    if !full_path.is_file() {
                        report.findings.push(Finding::MissingFile {
                            part_no: part.part_no().to_string(),
                            category,
                            name: descriptor.name.clone(),
                            path: descriptor.path.clone(),
                        });
                    }
                    referenced.insert(full_path);
                }
            }
        }

        if !root.path().is_dir() {
            tracing::debug!("upload directory {} does not exist", root.path().display());
            return Ok(report);
        }

        for entry in WalkDir::new(root.path()).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry during check: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            report.files_checked += 1;
            if !referenced.contains(entry.path()) {
                let relative = entry.path().strip_prefix(root.path()).unwrap_or(entry.path());
                report.findings.push(Finding::OrphanFile {
                    path: relative.to_string_lossy().replace('\\', "/"),
                });
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attachments::{IncomingFile, UploadRoot};
    use crate::core::inventory::Uploads;
    use crate::core::store::PartStore;
    use crate::entities::part::PartFields;
    use std::fs;
    use tempfile::tempdir;

    fn inventory(root: &std::path::Path) -> Inventory {
        Inventory::new(PartStore::open_in_memory().unwrap(), UploadRoot::new(root))
    }

    fn create_with_photo(inv: &Inventory, part_no: &str, name: &str) {
        let fields = PartFields {
            part_no: part_no.to_string(),
            ..Default::default()
        };
        let uploads = Uploads {
            photos: vec![IncomingFile::from_bytes(name, "image/png", vec![1, 2, 3])],
            ..Default::default()
        };
        inv.create(fields, &uploads).unwrap();
    }

    #[test]
    fn test_clean_inventory_has_no_findings() {
        let tmp = tempdir().unwrap();
        let inv = inventory(tmp.path());
        create_with_photo(&inv, "P-1", "a.png");

        let report = inv.check().unwrap();
        assert!(report.is_clean(), "{:?}", report.findings);
        assert_eq!(report.parts_checked, 1);
        assert_eq!(report.files_checked, 1);
    }

    #[test]
    fn test_finds_missing_and_orphan_files() {
        let tmp = tempdir().unwrap();
        let inv = inventory(tmp.path());
        create_with_photo(&inv, "P-1", "a.png");
        fs::remove_file(tmp.path().join("p-1/photos/a.png")).unwrap();
        fs::write(tmp.path().join("p-1/cad/stray.step"), b"x").unwrap();

        let report = inv.check().unwrap();
        assert_eq!(
            report.findings,
            vec![
                Finding::MissingFile {
                    part_no: "P-1".to_string(),
                    category: Category::Photos,
                    name: "a.png".to_string(),
                    path: "p-1/photos/a.png".to_string(),
                },
                Finding::OrphanFile {
                    path: "p-1/cad/stray.step".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_reports_invalid_manifest() {
        let tmp = tempdir().unwrap();
        let inv = inventory(tmp.path());
        create_with_photo(&inv, "P-1", "a.png");
        let part = inv.get("P-1").unwrap();
        inv.store()
            .update_manifest(part.id, Category::Drawings, "{oops")
            .unwrap();

        let report = inv.check().unwrap();
        assert_eq!(report.findings.len(), 1);
        assert!(matches!(
            report.findings[0],
            Finding::InvalidManifest {
                category: Category::Drawings,
                ..
            }
        ));
    }
}
