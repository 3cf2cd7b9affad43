//! Input validation limits for maintenance and store operations

/// Maximum length for collection names (128 chars)
pub const MAX_COLLECTION_NAME_LEN: usize = 128;

/// Maximum documents accepted by a single add call
pub const MAX_BATCH_DOCUMENTS: usize = 10_000;

/// Maximum neighbours returned per query text
pub const MAX_QUERY_RESULTS: usize = 1000;

/// Maximum keyword length (1024 chars)
pub const MAX_KEYWORD_LEN: usize = 1024;

/// Default minimum document length for a maintenance pass
pub const DEFAULT_MIN_LENGTH: usize = 1;

/// Default maximum document length for a maintenance pass
pub const DEFAULT_MAX_LENGTH: usize = 10_000;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyCollectionName,
    InvalidCollectionName(String),
    LengthBoundsInverted { min: usize, max: usize },
    ZeroMaxLength,
    EmptyKeyword,
    KeywordTooLong { len: usize, max: usize },
    TooManyDocuments { count: usize, max: usize },
    TooManyResults { count: usize, max: usize },
    ZeroResults,
    EmptyDocumentId,
    DuplicateDocumentId(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCollectionName => write!(f, "Collection name cannot be empty"),
            Self::InvalidCollectionName(name) => write!(
                f,
                "Invalid collection name '{}': use letters, digits, '_', '-' or '.' (max {})",
                name, MAX_COLLECTION_NAME_LEN
            ),
            Self::LengthBoundsInverted { min, max } => {
                write!(f, "Minimum length {} exceeds maximum length {}", min, max)
            }
            Self::ZeroMaxLength => write!(f, "Maximum length must be greater than zero"),
            Self::EmptyKeyword => write!(f, "Keyword cannot be empty"),
            Self::KeywordTooLong { len, max } => {
                write!(f, "Keyword too long: {} chars (max {})", len, max)
            }
            Self::TooManyDocuments { count, max } => {
                write!(f, "Too many documents in batch: {} (max {})", count, max)
            }
            Self::TooManyResults { count, max } => {
                write!(f, "Too many results requested: {} (max {})", count, max)
            }
            Self::ZeroResults => write!(f, "n_results must be at least 1"),
            Self::EmptyDocumentId => write!(f, "Document id cannot be empty"),
            Self::DuplicateDocumentId(id) => write!(f, "Duplicate document id in batch: {}", id),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for crate::Error {
    fn from(e: ValidationError) -> Self {
        crate::Error::Validation(e.to_string())
    }
}

/// Validate collection name
pub fn validate_collection_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyCollectionName);
    }
    if !crate::Collection::validate_name(name) {
        return Err(ValidationError::InvalidCollectionName(name.to_string()));
    }
    Ok(())
}

/// Validate the length bounds of a maintenance pass
pub fn validate_length_bounds(min: usize, max: usize) -> Result<(), ValidationError> {
    if max == 0 {
        return Err(ValidationError::ZeroMaxLength);
    }
    if min > max {
        return Err(ValidationError::LengthBoundsInverted { min, max });
    }
    Ok(())
}

/// Validate keyword
pub fn validate_keyword(keyword: &str) -> Result<(), ValidationError> {
    if keyword.is_empty() {
        return Err(ValidationError::EmptyKeyword);
    }
    let len = keyword.chars().count();
    if len > MAX_KEYWORD_LEN {
        return Err(ValidationError::KeywordTooLong {
            len,
            max: MAX_KEYWORD_LEN,
        });
    }
    Ok(())
}

/// Validate batch document count
pub fn validate_batch_documents(count: usize) -> Result<(), ValidationError> {
    if count > MAX_BATCH_DOCUMENTS {
        return Err(ValidationError::TooManyDocuments {
            count,
            max: MAX_BATCH_DOCUMENTS,
        });
    }
    Ok(())
}

/// Validate requested neighbour count
pub fn validate_n_results(n: usize) -> Result<(), ValidationError> {
    if n == 0 {
        return Err(ValidationError::ZeroResults);
    }
    if n > MAX_QUERY_RESULTS {
        return Err(ValidationError::TooManyResults {
            count: n,
            max: MAX_QUERY_RESULTS,
        });
    }
    Ok(())
}

/// Validate ids of a batch add: non-empty and unique within the batch
pub fn validate_document_ids<'a>(
    ids: impl IntoIterator<Item = &'a str>,
) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(ValidationError::EmptyDocumentId);
        }
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateDocumentId(id.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_collection_name() {
        assert!(validate_collection_name("docs").is_ok());
        assert_eq!(
            validate_collection_name(""),
            Err(ValidationError::EmptyCollectionName)
        );
        assert!(validate_collection_name("bad name").is_err());
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!(validate_length_bounds(1, 10_000).is_ok());
        assert!(validate_length_bounds(10, 10).is_ok());
        assert!(validate_length_bounds(0, 0).is_err());
        assert_eq!(
            validate_length_bounds(50, 10),
            Err(ValidationError::LengthBoundsInverted { min: 50, max: 10 })
        );
    }

    #[test]
    fn test_validate_keyword() {
        assert!(validate_keyword("错误").is_ok());
        assert!(validate_keyword("").is_err());
        assert!(validate_keyword(&"k".repeat(2000)).is_err());
    }

    #[test]
    fn test_validate_document_ids() {
        assert!(validate_document_ids(["a", "b"]).is_ok());
        assert_eq!(
            validate_document_ids(["a", "a"]),
            Err(ValidationError::DuplicateDocumentId("a".into()))
        );
        assert!(validate_document_ids([""]).is_err());
    }

    #[test]
    fn test_validate_n_results() {
        assert!(validate_n_results(5).is_ok());
        assert!(validate_n_results(0).is_err());
        assert!(validate_n_results(5000).is_err());
    }
}
