//! Query and result types for the part store

use serde::Serialize;

use crate::entities::part::Part;

/// Columns the listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Id,
    PartNo,
    PartName,
    Description,
    Cost,
    Qty,
    Material,
    MaterialSize,
    MaterialCost,
    FinishingType,
    FinishingCost,
    CreatedAt,
    #[default]
    UpdatedAt,
}

impl SortColumn {
    /// Column name in the parts table
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::PartNo => "part_no",
            SortColumn::PartName => "part_name",
            SortColumn::Description => "description",
            SortColumn::Cost => "cost",
            SortColumn::Qty => "qty",
            SortColumn::Material => "material",
            SortColumn::MaterialSize => "material_size",
            SortColumn::MaterialCost => "material_cost",
            SortColumn::FinishingType => "finishing_type",
            SortColumn::FinishingCost => "finishing_cost",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
        }
    }
}

impl std::str::FromStr for SortColumn {
    type Err = String;

    /// Accepts both the column name and the camelCase field name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortColumn::Id),
            "part_no" | "partNo" | "part-no" => Ok(SortColumn::PartNo),
            "part_name" | "partName" | "part-name" => Ok(SortColumn::PartName),
            "description" => Ok(SortColumn::Description),
            "cost" => Ok(SortColumn::Cost),
            "qty" => Ok(SortColumn::Qty),
            "material" => Ok(SortColumn::Material),
            "material_size" | "materialSize" | "material-size" => Ok(SortColumn::MaterialSize),
            "material_cost" | "materialCost" | "material-cost" => Ok(SortColumn::MaterialCost),
            "finishing_type" | "finishingType" | "finishing-type" => Ok(SortColumn::FinishingType),
            "finishing_cost" | "finishingCost" | "finishing-cost" => Ok(SortColumn::FinishingCost),
            "created_at" | "createdAt" | "created" => Ok(SortColumn::CreatedAt),
            "updated_at" | "updatedAt" | "updated" => Ok(SortColumn::UpdatedAt),
            _ => Err(format!("Unknown sort column: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter, sort and page selection for listing parts
#[derive(Debug, Clone)]
pub struct PartQuery {
    /// Substring matched against part number, name, description and material
    pub search: Option<String>,
    pub sort: SortColumn,
    pub order: SortOrder,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Default for PartQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: SortColumn::default(),
            order: SortOrder::default(),
            page: 1,
            limit: 500,
        }
    }
}

impl PartQuery {
    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit.max(1))
    }
}

/// One page of listing results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartPage {
    pub parts: Vec<Part>,
    pub has_more: bool,
    pub total_count: u64,
    pub current_page: u32,
}
