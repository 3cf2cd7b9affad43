//! Maintenance error types

use docwarden_storage::StorageError;
use thiserror::Error;

/// Result type alias for maintenance passes
pub type MaintResult<T> = std::result::Result<T, MaintenanceError>;

/// Maintenance error types
#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl From<StorageError> for MaintenanceError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::CollectionNotFound(name) => Self::CollectionNotFound(name),
            e if e.is_unavailable() => Self::StoreUnavailable(e.to_string()),
            e => Self::Operation(e.to_string()),
        }
    }
}

impl From<docwarden_core::limits::ValidationError> for MaintenanceError {
    fn from(e: docwarden_core::limits::ValidationError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}
