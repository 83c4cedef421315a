//! Entity type definitions

pub mod part;

pub use part::{Part, PartChanges, PartFields};
