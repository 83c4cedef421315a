//! Database schema initialization

use rusqlite::params;

use super::{PartStore, SCHEMA_VERSION};
use crate::core::error::InventoryResult;

impl PartStore {
    /// Create tables if missing and record the schema version
    pub(super) fn init_schema(&self) -> InventoryResult<()> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- One row per part; attachment manifests are JSON text columns
            CREATE TABLE IF NOT EXISTS parts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                part_no TEXT NOT NULL UNIQUE,
                part_name TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                cost TEXT NOT NULL DEFAULT '',
                qty INTEGER NOT NULL DEFAULT 0,
                material TEXT NOT NULL DEFAULT '',
                material_size TEXT NOT NULL DEFAULT '',
                material_cost TEXT NOT NULL DEFAULT '',
                finishing_type TEXT NOT NULL DEFAULT '',
                finishing_cost TEXT NOT NULL DEFAULT '',
                photos TEXT,
                drawing_2d TEXT,
                cad_3d TEXT,
                cnc_code TEXT,
                invoice TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_parts_updated ON parts(updated_at);
            "#,
        )?;

        let current: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

        if current.is_none() {
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
        } else if current != Some(SCHEMA_VERSION) {
            tracing::warn!(
                "parts database schema version {:?} differs from {}",
                current,
                SCHEMA_VERSION
            );
        }

        Ok(())
    }
}
