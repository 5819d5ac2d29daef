// ABOUTME: Core document model for schemaless user records
// ABOUTME: Defines FieldValue, Record and the conversions between store payloads and typed fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Data Models
//!
//! Documents in the store are schemaless maps written by mobile and web
//! clients, so every field arrives with an unknown shape. `FieldValue`
//! gives those payloads a closed set of variants that the rest of the
//! server can match on, and `Record` wraps a sorted field map so that
//! iteration order is deterministic everywhere.
//!
//! ## Core Models
//!
//! - `FieldValue`: One document field (scalar, timestamp, list or map)
//! - `Record`: A full document, keyed by field name in sorted order

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::errors::{AppError, AppResult};

/// A single document field value
///
/// Integer and floating-point numbers collapse into `Number` because the
/// clients writing these documents do not distinguish them reliably.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value (integers included)
    Number(f64),
    /// UTF-8 text
    String(String),
    /// Point in time, always UTC
    Timestamp(DateTime<Utc>),
    /// Ordered list of nested values
    List(Vec<FieldValue>),
    /// Nested document, keyed by field name in sorted order
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Check whether this value is the explicit null
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Extract a boolean
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract a number, coercing numeric strings
    ///
    /// Mobile clients store weights and heights as strings in older
    /// documents, so `"70.5"` counts as a number here.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Extract a string slice
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a timestamp, parsing ISO-8601 strings when needed
    ///
    /// Documents hold a mix of native timestamps and `isoformat()` style
    /// strings without a timezone suffix. Naive values are taken as UTC.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(dt) => Some(*dt),
            Self::String(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Extract a list
    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Extract a nested map
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Convert a JSON value into a field value
    ///
    /// JSON has no timestamp type, so strings stay strings here and
    /// timestamp interpretation happens lazily via [`Self::as_datetime`].
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(fields) => Self::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert this field value into JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s.clone()),
            Self::Timestamp(dt) => Value::String(dt.to_rfc3339()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Render this value as prose for a context statement
    ///
    /// Returns `None` for null, which callers use to skip the field
    /// entirely. Whole numbers render without a decimal point and
    /// timestamps render as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Timestamp(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Self::List(_) | Self::Map(_) => Some(self.to_json().to_string()),
        }
    }
}

/// Parse the timestamp formats that appear in stored documents
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// A full document from the store
///
/// Fields are kept in a `BTreeMap` so iteration over a record is always
/// sorted by field name, independent of insertion or wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Look up a top-level field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Look up a profile field, falling back to the `currentData` map
    ///
    /// Older profile documents keep live metrics nested under a
    /// `currentData` field while newer ones write them at the top level.
    #[must_use]
    pub fn current_field(&self, key: &str) -> Option<&FieldValue> {
        if let Some(value) = self.fields.get(key) {
            if !value.is_null() {
                return Some(value);
            }
        }
        self.fields
            .get("currentData")
            .and_then(FieldValue::as_map)
            .and_then(|nested| nested.get(key))
    }

    /// Insert a field, returning the previous value if present
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(key.into(), value)
    }

    /// Number of top-level fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in sorted key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Build a record from a JSON object
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the value is not a JSON object.
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields: fields
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::from_json(v)))
                    .collect(),
            }),
            other => Err(AppError::serialization(format!(
                "expected a JSON object for a document, got {other}"
            ))),
        }
    }

    /// Convert this record into a JSON object
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, FieldValue>> for Record {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }
}
