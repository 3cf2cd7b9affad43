//! Docwarden Storage - Collection store backends
//!
//! This crate defines the [`CollectionStore`] interface the maintenance
//! passes run against, plus in-memory, ReDB and SQLite implementations.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod migration;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use migration::{Migratable, Migration, CURRENT_VERSION};
pub use traits::CollectionStore;

#[cfg(feature = "redb")]
pub use redb::RedbStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

pub use memory::MemoryStore;
