//! CLI command implementations

pub mod check;
pub mod completions;
pub mod export;
pub mod init;
pub mod part;
