//! Read and write operations on part rows

use rusqlite::{params, ErrorCode, OptionalExtension, ToSql};

use super::{now_text, part_from_row, PartPage, PartQuery, PartStore, PART_COLUMNS};
use crate::core::category::{Category, PerCategory};
use crate::core::error::{InventoryError, InventoryResult};
use crate::entities::part::{Part, PartFields};

impl PartStore {
    /// Whether a part number is used by any part other than `except_id`
    pub fn part_no_taken(&self, part_no: &str, except_id: Option<i64>) -> InventoryResult<bool> {
        let taken: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM parts WHERE part_no = ?1 AND id != ?2)",
            params![part_no, except_id.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    /// Id and part number of every part
    pub fn part_numbers(&self) -> InventoryResult<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare("SELECT id, part_no FROM parts")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Insert a new part and return its id
    pub fn insert(&self, fields: &PartFields, manifests: &PerCategory<Option<String>>) -> InventoryResult<i64> {
        let now = now_text();
        self.conn
            .execute(
                r#"INSERT INTO parts (
                    part_no, part_name, description, cost, qty, material,
                    material_size, material_cost, finishing_type, finishing_cost,
                    photos, drawing_2d, cad_3d, cnc_code, invoice,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)"#,
                params![
                    fields.part_no,
                    fields.part_name,
                    fields.description,
                    fields.cost,
                    fields.qty,
                    fields.material,
                    fields.material_size,
                    fields.material_cost,
                    fields.finishing_type,
                    fields.finishing_cost,
                    manifests.photos,
                    manifests.drawings,
                    manifests.cad,
                    manifests.cnc,
                    manifests.invoice,
                    now,
                ],
            )
            .map_err(|e| unique_violation(e, &fields.part_no))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get a part by internal id
    pub fn get(&self, id: i64) -> InventoryResult<Option<Part>> {
        let part = self
            .conn
            .query_row(
                &format!("SELECT {} FROM parts WHERE id = ?1", PART_COLUMNS),
                params![id],
                part_from_row,
            )
            .optional()?;
        Ok(part)
    }

    /// Get a part by exact part number
    pub fn find_by_part_no(&self, part_no: &str) -> InventoryResult<Option<Part>> {
        let part = self
            .conn
            .query_row(
                &format!("SELECT {} FROM parts WHERE part_no = ?1", PART_COLUMNS),
                params![part_no],
                part_from_row,
            )
            .optional()?;
        Ok(part)
    }

    /// Replace all attributes and manifests of a part
    pub fn update(
        &self,
        id: i64,
        fields: &PartFields,
        manifests: &PerCategory<Option<String>>,
    ) -> InventoryResult<()> {
        let changed = self
            .conn
            .execute(
                r#"UPDATE parts
                   SET part_no = ?1, part_name = ?2, description = ?3, cost = ?4, qty = ?5,
                       material = ?6, material_size = ?7, material_cost = ?8,
                       finishing_type = ?9, finishing_cost = ?10,
                       photos = ?11, drawing_2d = ?12, cad_3d = ?13, cnc_code = ?14, invoice = ?15,
                       updated_at = ?16
                   WHERE id = ?17"#,
                params![
                    fields.part_no,
                    fields.part_name,
                    fields.description,
                    fields.cost,
                    fields.qty,
                    fields.material,
                    fields.material_size,
                    fields.material_cost,
                    fields.finishing_type,
                    fields.finishing_cost,
                    manifests.photos,
                    manifests.drawings,
                    manifests.cad,
                    manifests.cnc,
                    manifests.invoice,
                    now_text(),
                    id,
                ],
            )
            .map_err(|e| unique_violation(e, &fields.part_no))?;

        if changed == 0 {
            return Err(InventoryError::PartNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Store one category's manifest text and refresh the update time
    pub fn update_manifest(&self, id: i64, category: Category, manifest: &str) -> InventoryResult<()> {
        // Column names come from a closed enum, never from input
        let sql = format!(
            "UPDATE parts SET {} = ?1, updated_at = ?2 WHERE id = ?3",
            category.column()
        );
        let changed = self.conn.execute(&sql, params![manifest, now_text(), id])?;
        if changed == 0 {
            return Err(InventoryError::PartNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Delete a part row; returns whether a row existed
    pub fn delete(&self, id: i64) -> InventoryResult<bool> {
        let changed = self.conn.execute("DELETE FROM parts WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Count all parts
    pub fn count(&self) -> InventoryResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM parts", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Search, sort and paginate parts
    pub fn list(&self, query: &PartQuery) -> InventoryResult<PartPage> {
        let mut where_clause = String::new();
        let mut params_vec: Vec<Box<dyn ToSql>> = vec![];

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            where_clause.push_str(
                " WHERE part_no LIKE ?1 ESCAPE '\\' OR part_name LIKE ?1 ESCAPE '\\' \
                 OR description LIKE ?1 ESCAPE '\\' OR material LIKE ?1 ESCAPE '\\'",
            );
            params_vec.push(Box::new(format!("%{}%", escape_like(search))));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM parts{}", where_clause),
            rusqlite::params_from_iter(params_vec.iter()),
            |row| row.get(0),
        )?;

        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let sql = format!(
            "SELECT {} FROM parts{} ORDER BY {} {}, id {} LIMIT {} OFFSET {}",
            PART_COLUMNS,
            where_clause,
            query.sort.as_sql(),
            query.order.as_sql(),
            query.order.as_sql(),
            limit,
            query.offset(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let parts = stmt
            .query_map(rusqlite::params_from_iter(params_vec.iter()), part_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let total_count = total.max(0) as u64;
        Ok(PartPage {
            parts,
            has_more: u64::from(page) * u64::from(limit) < total_count,
            total_count,
            current_page: page,
        })
    }

    /// Every part, ordered by part number
    pub fn all(&self) -> InventoryResult<Vec<Part>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM parts ORDER BY part_no", PART_COLUMNS))?;
        let parts = stmt
            .query_map([], part_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts)
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Map a UNIQUE(part_no) violation to a domain error
fn unique_violation(err: rusqlite::Error, part_no: &str) -> InventoryError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            InventoryError::DuplicatePartNo(part_no.to_string())
        }
        _ => InventoryError::Database(err),
    }
}
