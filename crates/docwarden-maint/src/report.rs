//! Options and result records of the maintenance passes

use docwarden_core::limits::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use serde::{Deserialize, Serialize};

use crate::error::MaintResult;

/// Options for the length pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthOptions {
    /// Documents whose trimmed text is shorter are removed
    pub min_length: usize,
    /// Documents whose text is longer are split or removed
    pub max_length: usize,
    pub split_large: bool,
    /// Takes precedence over `split_large`
    pub delete_large: bool,
}

impl Default for LengthOptions {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            split_large: true,
            delete_large: false,
        }
    }
}

/// Result of the length pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthReport {
    pub removed_empty: Vec<String>,
    pub removed_large: Vec<String>,
    pub split_large_count: usize,
    pub added_ids: Vec<String>,
}

/// Where the keyword pass looks for its keyword
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordField {
    #[default]
    Documents,
    Metadatas,
}

impl KeywordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Metadatas => "metadatas",
        }
    }
}

impl std::fmt::Display for KeywordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeywordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "documents" => Ok(Self::Documents),
            "metadatas" => Ok(Self::Metadatas),
            other => Err(format!(
                "unknown field '{}', expected documents or metadatas",
                other
            )),
        }
    }
}

/// Result of the keyword pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordDeleteReport {
    pub deleted_count: usize,
    pub deleted_ids: Vec<String>,
    pub message: String,
}

/// Result of the invalid-id cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidIdReport {
    pub removed_count: usize,
    pub removed_ids: Vec<String>,
}

/// Wire shape of a pass result: `success` plus the report fields on
/// success, or `success: false` and a `message` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T> From<MaintResult<T>> for Outcome<T> {
    fn from(result: MaintResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MaintenanceError;
    use serde_json::json;

    #[test]
    fn test_outcome_success_shape() {
        let outcome = Outcome::ok(InvalidIdReport {
            removed_count: 1,
            removed_ids: vec!["42".to_string()],
        });
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "removed_count": 1, "removed_ids": ["42"]})
        );
    }

    #[test]
    fn test_outcome_failure_shape() {
        let outcome: Outcome<LengthReport> =
            Err(MaintenanceError::CollectionNotFound("docs".into())).into();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "message": "Collection not found: docs"})
        );
    }

    #[test]
    fn test_keyword_field_parse() {
        assert_eq!("metadatas".parse::<KeywordField>().unwrap(), KeywordField::Metadatas);
        assert!("titles".parse::<KeywordField>().is_err());
        assert_eq!(
            serde_json::from_str::<KeywordField>("\"documents\"").unwrap(),
            KeywordField::Documents
        );
    }
}
