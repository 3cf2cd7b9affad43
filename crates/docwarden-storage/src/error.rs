//! Errors raised by collection store backends

use thiserror::Error;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Collection already exists: {0}")]
    DuplicateCollection(String),

    #[error("Document {id} already exists in collection {collection}")]
    DuplicateDocument { collection: String, id: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The backend is closed or its files cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Database(String),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Record encoding error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "redb")]
    #[error("redb: {0}")]
    Redb(#[from] ::redb::Error),

    #[cfg(feature = "redb")]
    #[error("redb open: {0}")]
    RedbDatabase(#[from] ::redb::DatabaseError),

    #[cfg(feature = "redb")]
    #[error("redb table: {0}")]
    RedbTable(#[from] ::redb::TableError),

    #[cfg(feature = "redb")]
    #[error("redb storage: {0}")]
    RedbStorage(#[from] ::redb::StorageError),

    #[cfg(feature = "redb")]
    #[error("redb commit: {0}")]
    RedbCommit(#[from] ::redb::CommitError),

    #[cfg(feature = "redb")]
    #[error("redb transaction: {0}")]
    RedbTransaction(#[from] ::redb::TransactionError),

    #[cfg(feature = "sqlite")]
    #[error("sqlite: {0}")]
    Sqlite(#[from] ::rusqlite::Error),
}

impl StorageError {
    /// Whether the error means the backend itself could not be reached
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

impl From<docwarden_core::limits::ValidationError> for StorageError {
    fn from(e: docwarden_core::limits::ValidationError) -> Self {
        Self::InvalidRequest(e.to_string())
    }
}
