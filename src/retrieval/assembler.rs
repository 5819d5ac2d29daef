// ABOUTME: Context assembler turning a user's documents into candidate statements
// ABOUTME: Renders profile, history and meal records as prose lines for ranking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Candidate statement assembly
//!
//! One statement per document: the profile yields a single aggregated
//! line, and every history or meal document yields its own line. The
//! ranker decides afterwards which lines are worth keeping, so this
//! stage only guarantees content and grouping, not relevance order.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::flatten::flatten;
use crate::errors::AppResult;
use crate::models::Record;
use crate::store::{CollectionPath, DocumentPath, DocumentStore};

/// Logical group a statement came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLabel {
    /// The profile document itself
    UserProfile,
    /// A document from the `history` sub-collection
    History,
    /// A document from the `meals` sub-collection
    Meals,
}

impl SourceLabel {
    /// Prefix text rendered in front of the statement
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserProfile => "User Profile",
            Self::History => "History",
            Self::Meals => "Meals",
        }
    }

    const fn subcollection(self) -> Option<&'static str> {
        match self {
            Self::UserProfile => None,
            Self::History => Some("history"),
            Self::Meals => Some("meals"),
        }
    }
}

impl std::fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered candidate line
///
/// `text` carries the full statement including its source prefix and is
/// never empty; records with zero renderable fields produce no statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatStatement {
    /// Which logical group produced this statement
    pub source: SourceLabel,
    /// The rendered line, e.g. `User Profile → User name: Asha, weight: 70`
    pub text: String,
}

/// Assembles candidate statements from a user's stored documents
pub struct ContextAssembler {
    store: Arc<dyn DocumentStore>,
}

impl ContextAssembler {
    /// Create an assembler reading through the given store
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Build every candidate statement for a user
    ///
    /// Output order is profile statement first, then history documents,
    /// then meal documents. An absent profile yields an empty vec, which
    /// callers treat as "no data" rather than an error. A sub-collection
    /// read failure contributes zero statements and never aborts the
    /// rest of the assembly.
    ///
    /// # Errors
    ///
    /// Returns an error when the profile read itself fails or the user
    /// id is malformed.
    #[instrument(skip(self))]
    pub async fn build_candidates(&self, user_id: &str) -> AppResult<Vec<FlatStatement>> {
        let profile_path = DocumentPath::user(user_id)?;
        let Some(profile) = self.store.get_document(&profile_path).await? else {
            debug!(user_id, "profile document absent");
            return Ok(Vec::new());
        };

        let mut statements = Vec::new();
        if let Some(statement) = render_statement(SourceLabel::UserProfile, &profile, true) {
            statements.push(statement);
        }

        // The two streams are independent reads, issued together
        let (history, meals) = tokio::join!(
            self.collect_subcollection(user_id, SourceLabel::History),
            self.collect_subcollection(user_id, SourceLabel::Meals),
        );
        statements.extend(history);
        statements.extend(meals);

        Ok(statements)
    }

    /// Stream one sub-collection into statements, swallowing read errors
    async fn collect_subcollection(&self, user_id: &str, label: SourceLabel) -> Vec<FlatStatement> {
        let Some(name) = label.subcollection() else {
            return Vec::new();
        };
        let path = match CollectionPath::user_subcollection(user_id, name) {
            Ok(path) => path,
            Err(error) => {
                warn!(user_id, collection = name, %error, "skipping sub-collection with invalid path");
                return Vec::new();
            }
        };

        match self.store.stream_collection(&path).await {
            Ok(documents) => documents
                .into_iter()
                .filter_map(|doc| render_statement(label, &doc.record, false))
                .collect(),
            Err(error) => {
                // Deliberate catch-and-continue: one broken sub-collection
                // must not cost the user their profile context
                warn!(user_id, collection = name, %error, "sub-collection read failed, contributing zero statements");
                Vec::new()
            }
        }
    }
}

/// Render one record as a statement line
///
/// Fields join as `key: value` pairs with underscores shown as spaces.
/// Null fields are skipped; `None` when nothing renders. The profile's
/// `name` field renders as `User name: <value>` so the generator can
/// anchor identity questions on it.
fn render_statement(
    label: SourceLabel,
    record: &Record,
    emphasize_name: bool,
) -> Option<FlatStatement> {
    let mut parts = Vec::new();
    for (key, value) in flatten(record) {
        let Some(rendered) = value.render() else {
            continue;
        };
        if emphasize_name && key.eq_ignore_ascii_case("name") {
            parts.push(format!("User name: {rendered}"));
        } else {
            parts.push(format!("{}: {rendered}", key.replace('_', " ")));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(FlatStatement {
            source: label,
            text: format!("{} → {}", label.as_str(), parts.join(", ")),
        })
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
    fn test_profile_statement_emphasizes_name() {
        let statement = render_statement(
            SourceLabel::UserProfile,
            &record(json!({"name": "Alex", "weight": 70})),
            true,
        )
        .unwrap();
        assert_eq!(statement.text, "User Profile → User name: Alex, weight: 70");
        assert_eq!(statement.source, SourceLabel::UserProfile);
    }

    #[test]
    fn test_subcollection_statement_has_plain_keys() {
        let statement = render_statement(
            SourceLabel::Meals,
            &record(json!({"meal_name": "Oats", "protein": 20})),
            false,
        )
        .unwrap();
        assert_eq!(statement.text, "Meals → meal name: Oats, protein: 20");
    }

    #[test]
    fn test_name_not_emphasized_for_subcollections() {
        let statement = render_statement(
            SourceLabel::History,
            &record(json!({"name": "entry"})),
            false,
        )
        .unwrap();
        assert_eq!(statement.text, "History → name: entry");
    }

    #[test]
    fn test_nested_fields_flatten_into_statement() {
        let statement = render_statement(
            SourceLabel::UserProfile,
            &record(json!({"currentData": {"bmi": 22.9}})),
            true,
        )
        .unwrap();
        assert_eq!(statement.text, "User Profile → currentData bmi: 22.9");
    }

    #[test]
    fn test_null_fields_are_skipped() {
        let statement = render_statement(
            SourceLabel::UserProfile,
            &record(json!({"goal": null, "weight": 70})),
            true,
        )
        .unwrap();
        assert_eq!(statement.text, "User Profile → weight: 70");
    }

    #[test]
    fn test_all_null_record_produces_no_statement() {
        assert!(render_statement(
            SourceLabel::Meals,
            &record(json!({"protein": null})),
            false
        )
        .is_none());
        assert!(render_statement(SourceLabel::Meals, &Record::new(), false).is_none());
    }
}
