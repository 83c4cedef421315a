//! SQLite-backed part record store
//!
//! Holds one row per part with its attributes and the five attachment
//! manifests as JSON text. The store knows nothing about the filesystem;
//! keeping manifests and attachment folders consistent is the job of
//! [`crate::core::inventory::Inventory`].

mod queries;
mod schema;
mod types;

pub use types::*;

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row};

use crate::core::category::PerCategory;
use crate::core::error::{InventoryError, InventoryResult};
use crate::entities::part::{Part, PartFields};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Column list shared by every query that builds a [`Part`]
const PART_COLUMNS: &str = "id, part_no, part_name, description, cost, qty, material, \
     material_size, material_cost, finishing_type, finishing_cost, \
     photos, drawing_2d, cad_3d, cnc_code, invoice, created_at, updated_at";

/// The part record store
pub struct PartStore {
    conn: Connection,
}

impl PartStore {
    /// Open or create the database file
    pub fn open(path: &Path) -> InventoryResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| InventoryError::io("creating database directory", parent, e))?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL lets readers proceed while a writer holds the lock
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self { conn };
        store.init_schema()?;
        tracing::debug!("opened parts database {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> InventoryResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }
}

/// Build a part from a row selected with [`PART_COLUMNS`]
fn part_from_row(row: &Row<'_>) -> rusqlite::Result<Part> {
    Ok(Part {
        id: row.get(0)?,
        fields: PartFields {
            part_no: row.get(1)?,
            part_name: row.get(2)?,
            description: row.get(3)?,
            cost: row.get(4)?,
            qty: row.get(5)?,
            material: row.get(6)?,
            material_size: row.get(7)?,
            material_cost: row.get(8)?,
            finishing_type: row.get(9)?,
            finishing_cost: row.get(10)?,
        },
        manifests: PerCategory {
            photos: row.get(11)?,
            drawings: row.get(12)?,
            cad: row.get(13)?,
            cnc: row.get(14)?,
            invoice: row.get(15)?,
        },
        created_at: parse_datetime(row.get::<_, String>(16)?),
        updated_at: parse_datetime(row.get::<_, String>(17)?),
    })
}

/// Current time in the stored text format
///
/// Fixed-width UTC with microseconds so text ordering matches time ordering.
fn now_text() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse datetime string to DateTime<Utc>
fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
