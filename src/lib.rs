//! partkeep: a parts inventory with per-part attachment folders
//!
//! Each part is a row in a SQLite database. Its photos, drawings, CAD models,
//! CNC programs and invoices live in a folder named after the part number,
//! and the row keeps a manifest of those files per category.

pub mod cli;
pub mod core;
pub mod entities;
