//! Part entity type - A manufactured item and its attachment manifests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::attachments::{DecodedManifest, Manifest};
use crate::core::category::{Category, PerCategory};

/// Editable attributes of a part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartFields {
    /// Unique business identifier
    pub part_no: String,
    pub part_name: String,
    pub description: String,
    /// Stored verbatim; no arithmetic is done on costs
    pub cost: String,
    pub qty: i64,
    pub material: String,
    pub material_size: String,
    pub material_cost: String,
    pub finishing_type: String,
    pub finishing_cost: String,
}

/// A stored part
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: i64,

    #[serde(flatten)]
    pub fields: PartFields,

    /// Raw manifest text per category, as stored
    #[serde(skip)]
    pub manifests: PerCategory<Option<String>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    pub fn part_no(&self) -> &str {
        &self.fields.part_no
    }

    /// Decoded attachments of one category
    pub fn attachments(&self, category: Category) -> DecodedManifest {
        Manifest::decode(self.manifests.get(category).as_deref())
    }

    pub fn attachment_count(&self, category: Category) -> usize {
        self.attachments(category).manifest.len()
    }

    pub fn has_attachments(&self) -> bool {
        Category::ALL.iter().any(|c| self.attachment_count(*c) > 0)
    }
}

/// Partial update of a part; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct PartChanges {
    pub part_no: Option<String>,
    pub part_name: Option<String>,
    pub description: Option<String>,
    pub cost: Option<String>,
    pub qty: Option<i64>,
    pub material: Option<String>,
    pub material_size: Option<String>,
    pub material_cost: Option<String>,
    pub finishing_type: Option<String>,
    pub finishing_cost: Option<String>,
}

impl PartChanges {
    /// Apply the changes on top of existing fields
    pub fn apply(&self, fields: &PartFields) -> PartFields {
        fn pick(change: &Option<String>, current: &str) -> String {
            change.clone().unwrap_or_else(|| current.to_string())
        }

        PartFields {
            part_no: pick(&self.part_no, &fields.part_no),
            part_name: pick(&self.part_name, &fields.part_name),
            description: pick(&self.description, &fields.description),
            cost: pick(&self.cost, &fields.cost),
            qty: self.qty.unwrap_or(fields.qty),
            material: pick(&self.material, &fields.material),
            material_size: pick(&self.material_size, &fields.material_size),
            material_cost: pick(&self.material_cost, &fields.material_cost),
            finishing_type: pick(&self.finishing_type, &fields.finishing_type),
            finishing_cost: pick(&self.finishing_cost, &fields.finishing_cost),
        }
    }
}
