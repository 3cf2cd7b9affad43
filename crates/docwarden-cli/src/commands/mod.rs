//! CLI command implementations

pub mod collection;
pub mod completions;
pub mod config;
pub mod doc;
pub mod maintain;
pub mod serve;
