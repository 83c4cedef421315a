//! Spreadsheet export of the part list

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::part::Part;

/// Column headers, in output order
pub const EXPORT_HEADERS: [&str; 12] = [
    "PartNo",
    "PartName",
    "Description",
    "Cost",
    "Quantity",
    "Material",
    "Material Size",
    "Material Cost",
    "Finishing Type",
    "Finishing Cost",
    "Created At",
    "Updated At",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    part_no: &'a str,
    part_name: &'a str,
    description: &'a str,
    cost: &'a str,
    qty: i64,
    material: &'a str,
    material_size: &'a str,
    material_cost: &'a str,
    finishing_type: &'a str,
    finishing_cost: &'a str,
    created_at: String,
    updated_at: String,
}

impl<'a> From<&'a Part> for ExportRow<'a> {
    fn from(part: &'a Part) -> Self {
        let f = &part.fields;
        Self {
            part_no: &f.part_no,
            part_name: &f.part_name,
            description: &f.description,
            cost: &f.cost,
            qty: f.qty,
            material: &f.material,
            material_size: &f.material_size,
            material_cost: &f.material_cost,
            finishing_type: &f.finishing_type,
            finishing_cost: &f.finishing_cost,
            created_at: format_timestamp(&part.created_at),
            updated_at: format_timestamp(&part.updated_at),
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Write the header and one row per part; returns the number of rows
pub fn write_csv<W: Write>(parts: &[Part], writer: W) -> Result<usize, csv::Error> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for part in parts {
        wtr.serialize(ExportRow::from(part))?;
    }
    wtr.flush()?;
    Ok(parts.len())
}
