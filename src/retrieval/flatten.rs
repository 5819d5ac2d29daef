// ABOUTME: Record flattener collapsing nested maps into underscore-joined leaf keys
// ABOUTME: First stage of the context pipeline, feeding statement rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Record flattening
//!
//! Profile documents nest live metrics under maps like `currentData`, so
//! before a record can become a statement its nested maps are collapsed
//! into flat `parent_child` keys. Lists and scalars are leaves; only maps
//! recurse.

use crate::models::{FieldValue, Record};

/// Separator joining parent and child keys
pub const KEY_SEPARATOR: char = '_';

/// Flatten a record into leaf key/value pairs
///
/// Keys of nested maps concatenate with [`KEY_SEPARATOR`]. Iteration is
/// depth-first in sorted key order at every level, so output order is
/// deterministic for a given record. Values are borrowed untouched;
/// lists stay whole for the caller to stringify.
#[must_use]
pub fn flatten(record: &Record) -> Vec<(String, &FieldValue)> {
    let mut leaves = Vec::new();
    for (key, value) in record.iter() {
        flatten_into(key, value, &mut leaves);
    }
    leaves
}

fn flatten_into<'a>(key: &str, value: &'a FieldValue, leaves: &mut Vec<(String, &'a FieldValue)>) {
    match value {
        FieldValue::Map(nested) => {
            // An empty map has no leaves and vanishes from the output
            for (child_key, child) in nested {
                let flat_key = format!("{key}{KEY_SEPARATOR}{child_key}");
                flatten_into(&flat_key, child, leaves);
            }
        }
        leaf => leaves.push((key.to_owned(), leaf)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[test]
    fn test_flat_record_passes_through_unchanged() {
        let input = record(json!({"age": 29, "name": "Asha", "weight": 70.5}));
        let leaves = flatten(&input);
        let keys: Vec<&str> = leaves.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["age", "name", "weight"]);
        assert_eq!(leaves[0].1.as_f64(), Some(29.0));
        assert_eq!(leaves[1].1.as_str(), Some("Asha"));
    }

    #[test]
    fn test_nested_maps_join_keys_with_underscore() {
        let input = record(json!({
            "currentData": {"bmi": 22.9, "weight": 70},
            "name": "Asha"
        }));
        let leaves = flatten(&input);
        let keys: Vec<&str> = leaves.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["currentData_bmi", "currentData_weight", "name"]);
    }

    #[test]
    fn test_deeply_nested_maps_recurse_fully() {
        let input = record(json!({"a": {"b": {"c": 1}}}));
        let leaves = flatten(&input);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0, "a_b_c");
        assert_eq!(leaves[0].1.as_f64(), Some(1.0));
    }

    #[test]
    fn test_lists_are_leaves_not_recursed() {
        let input = record(json!({"goals": ["strength", {"phase": 2}]}));
        let leaves = flatten(&input);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0, "goals");
        assert!(matches!(leaves[0].1, FieldValue::List(_)));
    }

    #[test]
    fn test_leaf_count_matches_terminal_values() {
        // Every non-map value reachable in the input appears exactly once
        let input = record(json!({
            "a": 1,
            "b": {"c": 2, "d": {"e": 3, "f": null}},
            "g": [4, 5],
            "h": true
        }));
        // Terminals: a, b_c, b_d_e, b_d_f, g (one list leaf), h
        assert_eq!(flatten(&input).len(), 6);
    }

    #[test]
    fn test_empty_record_yields_no_leaves() {
        assert!(flatten(&Record::new()).is_empty());
    }

    #[test]
    fn test_empty_nested_map_vanishes() {
        let input = record(json!({"currentData": {}, "name": "Asha"}));
        let leaves = flatten(&input);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].0, "name");
    }
}
