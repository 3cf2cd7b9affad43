//! Collection (named document set) types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::limits::MAX_COLLECTION_NAME_LEN;

/// A named set of documents within a database root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Opaque identifier
    pub id: Ulid,

    /// Collection name (unique within a store)
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Collection {
    /// Create a new collection descriptor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Ulid::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Validate collection name (alphanumeric, underscores, hyphens, dots)
    pub fn validate_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= MAX_COLLECTION_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    }
}
