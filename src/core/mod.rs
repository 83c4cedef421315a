//! Core module - storage, attachment folders, and the operations over both

pub mod attachments;
pub mod category;
pub mod config;
pub mod consistency;
pub mod error;
pub mod export;
pub mod inventory;
pub mod project;
pub mod store;

pub use category::{Category, PerCategory};
pub use config::Config;
pub use consistency::{ConsistencyReport, Finding};
pub use error::{InventoryError, InventoryResult};
pub use inventory::{Inventory, PartOutcome, Uploads};
pub use project::{Project, ProjectError};
pub use store::{PartPage, PartQuery, PartStore, SortColumn, SortOrder};
