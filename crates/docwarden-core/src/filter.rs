//! Typed metadata filters ("where" clauses)
//!
//! Tool callers send filters in the operator dialect vector stores
//! commonly accept:
//!
//! ```json
//! {"$and": [{"source": "wiki"}, {"year": {"$gte": 2020, "$lte": 2024}}]}
//! ```
//!
//! [`Filter::from_json`] turns that into a [`Filter`] tree and
//! [`Filter::to_json`] renders it back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::document::{Metadata, MetadataValue};
use crate::error::{Error, Result};

/// Comparison operator of a single-field predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn operator(&self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
        }
    }

    fn from_operator(op: &str) -> Option<Self> {
        Some(match op {
            "$eq" => Self::Eq,
            "$ne" => Self::Ne,
            "$gt" => Self::Gt,
            "$gte" => Self::Gte,
            "$lt" => Self::Lt,
            "$lte" => Self::Lte,
            _ => return None,
        })
    }
}

/// Metadata filter expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Filter {
    /// `field <op> value`
    Compare {
        field: String,
        op: Comparison,
        value: MetadataValue,
    },
    /// field value is one of `values`
    In {
        field: String,
        values: Vec<MetadataValue>,
    },
    /// field value is none of `values`
    NotIn {
        field: String,
        values: Vec<MetadataValue>,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn compare(field: impl Into<String>, op: Comparison, value: impl Into<MetadataValue>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self::compare(field, Comparison::Eq, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self::compare(field, Comparison::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self::compare(field, Comparison::Lte, value)
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Evaluate the filter against a record's metadata.
    ///
    /// A predicate on a field the record does not have never matches.
    pub fn matches(&self, metadata: &Metadata) -> bool {
        match self {
            Self::Compare { field, op, value } => metadata
                .get(field)
                .is_some_and(|actual| compare(actual, *op, value)),
            Self::In { field, values } => metadata
                .get(field)
                .is_some_and(|actual| values.iter().any(|v| values_equal(actual, v))),
            Self::NotIn { field, values } => metadata
                .get(field)
                .is_some_and(|actual| !values.iter().any(|v| values_equal(actual, v))),
            Self::And(parts) => parts.iter().all(|f| f.matches(metadata)),
            Self::Or(parts) => parts.iter().any(|f| f.matches(metadata)),
        }
    }

    /// Parse the JSON operator dialect
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidFilter(format!("expected an object, got {}", value)))?;
        if obj.is_empty() {
            return Err(Error::InvalidFilter("empty filter object".into()));
        }

        let mut clauses = Vec::with_capacity(obj.len());
        for (key, inner) in obj {
            clauses.push(match key.as_str() {
                "$and" => Self::And(parse_list(key, inner)?),
                "$or" => Self::Or(parse_list(key, inner)?),
                op if op.starts_with('$') => {
                    return Err(Error::InvalidFilter(format!("unknown logical operator {}", op)))
                }
                field => parse_field(field, inner)?,
            });
        }

        Ok(if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            Self::And(clauses)
        })
    }

    /// Render the filter in the JSON operator dialect
    pub fn to_json(&self) -> Value {
        match self {
            Self::Compare { field, op, value } => {
                json_field(field, op.operator(), metadata_to_json(value))
            }
            Self::In { field, values } => json_field(
                field,
                "$in",
                Value::Array(values.iter().map(metadata_to_json).collect()),
            ),
            Self::NotIn { field, values } => json_field(
                field,
                "$nin",
                Value::Array(values.iter().map(metadata_to_json).collect()),
            ),
            Self::And(parts) => {
                serde_json::json!({ "$and": parts.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
            Self::Or(parts) => {
                serde_json::json!({ "$or": parts.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
        }
    }
}

impl TryFrom<Value> for Filter {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

impl From<Filter> for Value {
    fn from(filter: Filter) -> Self {
        filter.to_json()
    }
}

fn parse_list(op: &str, value: &Value) -> Result<Vec<Filter>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::InvalidFilter(format!("{} expects an array", op)))?;
    if items.is_empty() {
        return Err(Error::InvalidFilter(format!("{} expects at least one clause", op)));
    }
    items.iter().map(Filter::from_json).collect()
}

fn parse_field(field: &str, value: &Value) -> Result<Filter> {
    let Some(ops) = value.as_object() else {
        return Ok(Filter::equals(field, json_to_metadata(value)?));
    };
    if ops.is_empty() {
        return Err(Error::InvalidFilter(format!("no operator given for field '{}'", field)));
    }

    let mut clauses = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let clause = match op.as_str() {
            "$in" | "$nin" => {
                let values = operand
                    .as_array()
                    .ok_or_else(|| Error::InvalidFilter(format!("{} expects an array", op)))?
                    .iter()
                    .map(json_to_metadata)
                    .collect::<Result<Vec<_>>>()?;
                if op == "$in" {
                    Filter::In {
                        field: field.to_string(),
                        values,
                    }
                } else {
                    Filter::NotIn {
                        field: field.to_string(),
                        values,
                    }
                }
            }
            other => {
                let cmp = Comparison::from_operator(other).ok_or_else(|| {
                    Error::InvalidFilter(format!("unknown operator {} on field '{}'", other, field))
                })?;
                Filter::compare(field, cmp, json_to_metadata(operand)?)
            }
        };
        clauses.push(clause);
    }

    Ok(if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        Filter::And(clauses)
    })
}

fn json_field(field: &str, op: &str, operand: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(op.to_string(), operand);
    let mut outer = Map::new();
    outer.insert(field.to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Convert a JSON scalar into a metadata value
pub fn json_to_metadata(value: &Value) -> Result<MetadataValue> {
    match value {
        Value::Bool(b) => Ok(MetadataValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(MetadataValue::Int(i)),
            None => n
                .as_f64()
                .map(MetadataValue::Float)
                .ok_or_else(|| Error::InvalidFilter(format!("unsupported number {}", n))),
        },
        Value::String(s) => Ok(MetadataValue::Str(s.clone())),
        other => Err(Error::InvalidFilter(format!(
            "filter operands must be scalars, got {}",
            other
        ))),
    }
}

fn metadata_to_json(value: &MetadataValue) -> Value {
    match value {
        MetadataValue::Bool(b) => Value::Bool(*b),
        MetadataValue::Int(i) => Value::from(*i),
        MetadataValue::Float(f) => Value::from(*f),
        MetadataValue::Str(s) => Value::String(s.clone()),
    }
}

fn values_equal(a: &MetadataValue, b: &MetadataValue) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn ordering(a: &MetadataValue, b: &MetadataValue) -> Option<Ordering> {
    match (a, b) {
        (MetadataValue::Str(x), MetadataValue::Str(y)) => Some(x.cmp(y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn compare(actual: &MetadataValue, op: Comparison, expected: &MetadataValue) -> bool {
    match op {
        Comparison::Eq => values_equal(actual, expected),
        Comparison::Ne => !values_equal(actual, expected),
        Comparison::Gt => ordering(actual, expected) == Some(Ordering::Greater),
        Comparison::Gte => matches!(
            ordering(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparison::Lt => ordering(actual, expected) == Some(Ordering::Less),
        Comparison::Lte => matches!(
            ordering(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(pairs: &[(&str, MetadataValue)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parse_and_range() {
        let filter = Filter::from_json(&json!({
            "$and": [
                {"source": "wiki"},
                {"year": {"$gte": 2020, "$lte": 2024}}
            ]
        }))
        .unwrap();

        let hit = meta(&[("source", "wiki".into()), ("year", 2022i64.into())]);
        let miss = meta(&[("source", "wiki".into()), ("year", 2019i64.into())]);
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&miss));
    }

    #[test]
    fn test_or_and_in() {
        let filter = Filter::from_json(&json!({
            "$or": [{"lang": {"$in": ["en", "de"]}}, {"pinned": true}]
        }))
        .unwrap();

        assert!(filter.matches(&meta(&[("lang", "de".into())])));
        assert!(filter.matches(&meta(&[("pinned", true.into())])));
        assert!(!filter.matches(&meta(&[("lang", "fr".into())])));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let filter = Filter::compare("score", Comparison::Ne, 1i64);
        assert!(!filter.matches(&Metadata::new()));
    }

    #[test]
    fn test_int_float_equality() {
        let filter = Filter::equals("page", 3.0);
        assert!(filter.matches(&meta(&[("page", 3i64.into())])));
    }

    #[test]
    fn test_builder_composition() {
        let filter = Filter::gte("year", 2020i64)
            .and(Filter::lte("year", 2024i64))
            .and(Filter::equals("source", "wiki"));
        match &filter {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_json_round_trip_through_serde() {
        let raw = json!({"$or": [{"a": {"$eq": 1}}, {"b": {"$nin": ["x"]}}]});
        let filter: Filter = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&filter).unwrap(), raw);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Filter::from_json(&json!([])).is_err());
        assert!(Filter::from_json(&json!({})).is_err());
        assert!(Filter::from_json(&json!({"$xor": []})).is_err());
        assert!(Filter::from_json(&json!({"a": {"$near": 1}})).is_err());
        assert!(Filter::from_json(&json!({"a": {"b": 1}})).is_err());
        assert!(Filter::from_json(&json!({"a": [1, 2]})).is_err());
    }
}
