//! Attachment categories and their fixed storage names

use serde::{Deserialize, Serialize};

/// The five attachment groups every part carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Photos,
    Drawings,
    Cad,
    Cnc,
    Invoice,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 5] = [
        Category::Photos,
        Category::Drawings,
        Category::Cad,
        Category::Cnc,
        Category::Invoice,
    ];

    /// Subdirectory name under a part's attachment folder
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Photos => "photos",
            Category::Drawings => "drawings",
            Category::Cad => "cad",
            Category::Cnc => "cnc",
            Category::Invoice => "invoice",
        }
    }

    /// Column holding this category's manifest in the parts table
    pub fn column(&self) -> &'static str {
        match self {
            Category::Photos => "photos",
            Category::Drawings => "drawing_2d",
            Category::Cad => "cad_3d",
            Category::Cnc => "cnc_code",
            Category::Invoice => "invoice",
        }
    }

    /// Human label for tables and detail output
    pub fn label(&self) -> &'static str {
        match self {
            Category::Photos => "Photos",
            Category::Drawings => "2D Drawings",
            Category::Cad => "3D CAD",
            Category::Cnc => "CNC Code",
            Category::Invoice => "Invoice",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "photos" | "photo" => Ok(Category::Photos),
            "drawings" | "drawing" | "drawing_2d" => Ok(Category::Drawings),
            "cad" | "cad_3d" => Ok(Category::Cad),
            "cnc" | "cnc_code" => Ok(Category::Cnc),
            "invoice" | "invoices" => Ok(Category::Invoice),
            _ => Err(format!(
                "Invalid category: {}. Use photos, drawings, cad, cnc or invoice",
                s
            )),
        }
    }
}

/// One value per category, indexable by [`Category`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerCategory<T> {
    pub photos: T,
    pub drawings: T,
    pub cad: T,
    pub cnc: T,
    pub invoice: T,
}

impl<T> PerCategory<T> {
    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Photos => &self.photos,
            Category::Drawings => &self.drawings,
            Category::Cad => &self.cad,
            Category::Cnc => &self.cnc,
            Category::Invoice => &self.invoice,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Photos => &mut self.photos,
            Category::Drawings => &mut self.drawings,
            Category::Cad => &mut self.cad,
            Category::Cnc => &mut self.cnc,
            Category::Invoice => &mut self.invoice,
        }
    }

    /// Iterate `(category, value)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
