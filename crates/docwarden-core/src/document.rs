//! Document records and their metadata

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key that links a fragment back to the document it was split from
pub const SPLIT_FROM_KEY: &str = "split_from";

/// Document metadata: string keys mapped to scalar values
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A scalar metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetadataValue {
    /// Numeric view used by range comparisons
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a CLI-style literal: booleans, integers and floats are
    /// recognised, everything else stays a string.
    pub fn parse_literal(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::Str(raw.to_string())
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            // keeps the fraction, so 1.0 prints as "1.0"
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for MetadataValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Identifier of a stored record.
///
/// Well-formed records carry a string id. Anything else that made it into
/// a collection (numbers, nulls, nested values) is kept as `Other` so it
/// can be found and removed by the invalid-id cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Other(serde_json::Value),
}

impl RecordId {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Other(_) => None,
        }
    }

    /// Stable key used by persistent backends
    pub fn storage_key(&self) -> String {
        // A JSON encoding keeps "5" and 5 distinct
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()).to_string(),
            Self::Other(v) => v.to_string(),
        }
    }
}

impl std::hash::Hash for RecordId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.storage_key().hash(state);
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for RecordId {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

/// A document to be added to a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert(key.into(), value.into());
        self
    }

    /// Convert into a stored record carrying the given embedding
    pub fn into_record(self, embedding: Option<Vec<f32>>) -> StoredRecord {
        StoredRecord {
            id: RecordId::Text(self.id),
            document: Some(self.text),
            metadata: self.metadata,
            embedding,
        }
    }
}

/// A record as it lives inside a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl StoredRecord {
    /// Document text, empty when the record has none
    pub fn text(&self) -> &str {
        self.document.as_deref().unwrap_or("")
    }

    /// Metadata, treating an absent mapping as empty
    pub fn metadata_or_empty(&self) -> Metadata {
        self.metadata.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_untagged() {
        let text: RecordId = serde_json::from_str("\"doc-1\"").unwrap();
        assert_eq!(text, RecordId::Text("doc-1".into()));

        let number: RecordId = serde_json::from_str("42").unwrap();
        assert!(!number.is_text());
        assert_eq!(number.to_string(), "42");
    }

    #[test]
    fn test_storage_key_distinguishes_types() {
        let text = RecordId::from("5");
        let number = RecordId::Other(serde_json::json!(5));
        assert_ne!(text.storage_key(), number.storage_key());
    }

    #[test]
    fn test_metadata_value_untagged() {
        let meta: Metadata =
            serde_json::from_str(r#"{"a": true, "b": 3, "c": 1.5, "d": "x"}"#).unwrap();
        assert_eq!(meta["a"], MetadataValue::Bool(true));
        assert_eq!(meta["b"], MetadataValue::Int(3));
        assert_eq!(meta["c"], MetadataValue::Float(1.5));
        assert_eq!(meta["d"], MetadataValue::Str("x".into()));
    }

    #[test]
    fn test_metadata_value_display() {
        assert_eq!(MetadataValue::Float(1.0).to_string(), "1.0");
        assert_eq!(MetadataValue::Float(0.25).to_string(), "0.25");
        assert_eq!(MetadataValue::Int(1).to_string(), "1");
        assert_eq!(MetadataValue::Bool(true).to_string(), "true");
        assert_eq!(MetadataValue::from("x y").to_string(), "x y");
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(MetadataValue::parse_literal("true"), MetadataValue::Bool(true));
        assert_eq!(MetadataValue::parse_literal("12"), MetadataValue::Int(12));
        assert_eq!(MetadataValue::parse_literal("0.25"), MetadataValue::Float(0.25));
        assert_eq!(
            MetadataValue::parse_literal("report.pdf"),
            MetadataValue::Str("report.pdf".into())
        );
    }

    #[test]
    fn test_document_builder() {
        let doc = Document::new("a", "hello").with_meta("source", "wiki");
        let record = doc.into_record(None);
        assert_eq!(record.text(), "hello");
        assert_eq!(
            record.metadata_or_empty().get("source"),
            Some(&MetadataValue::Str("wiki".into()))
        );
    }
}
