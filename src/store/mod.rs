// ABOUTME: Document store abstraction over Firestore and SQLite backends
// ABOUTME: Defines path newtypes and the DocumentStore trait the server reads through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::models::Record;

pub mod factory;
pub mod firestore;
pub mod sqlite;

pub use factory::Store;
pub use firestore::FirestoreStore;
pub use sqlite::SqliteStore;

/// Path to a single document, e.g. `users/{uid}`
///
/// Made of slash-joined segments with an even segment count, matching
/// Firestore's collection/document alternation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Build a document path from segments
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for empty segments, embedded
    /// slashes, or an odd segment count.
    pub fn new(segments: &[&str]) -> AppResult<Self> {
        validate_segments(segments)?;
        if segments.len() % 2 != 0 {
            return Err(AppError::invalid_input(format!(
                "document path needs an even number of segments, got {}",
                segments.len()
            )));
        }
        Ok(Self(segments.join("/")))
    }

    /// Path to a user's profile document
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for an empty or malformed user id.
    pub fn user(user_id: &str) -> AppResult<Self> {
        Self::new(&["users", user_id])
    }

    /// The slash-joined path
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final segment, the document id
    #[must_use]
    pub fn document_id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The collection this document belongs to
    #[must_use]
    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_owned()),
            None => CollectionPath(self.0.clone()),
        }
    }
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path to a collection, e.g. `users/{uid}/meals`
///
/// Odd segment count, the complement of [`DocumentPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Build a collection path from segments
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for empty segments, embedded
    /// slashes, or an even segment count.
    pub fn new(segments: &[&str]) -> AppResult<Self> {
        validate_segments(segments)?;
        if segments.len() % 2 == 0 {
            return Err(AppError::invalid_input(format!(
                "collection path needs an odd number of segments, got {}",
                segments.len()
            )));
        }
        Ok(Self(segments.join("/")))
    }

    /// Path to a sub-collection under a user document
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for malformed segments.
    pub fn user_subcollection(user_id: &str, name: &str) -> AppResult<Self> {
        Self::new(&["users", user_id, name])
    }

    /// The slash-joined path
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path to a document inside this collection
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for a malformed document id.
    pub fn document(&self, id: &str) -> AppResult<DocumentPath> {
        validate_segments(&[id])?;
        Ok(DocumentPath(format!("{}/{id}", self.0)))
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_segments(segments: &[&str]) -> AppResult<()> {
    if segments.is_empty() {
        return Err(AppError::invalid_input("path needs at least one segment"));
    }
    for segment in segments {
        if segment.is_empty() {
            return Err(AppError::invalid_input("path segments must be non-empty"));
        }
        if segment.contains('/') {
            return Err(AppError::invalid_input(format!(
                "path segment must not contain '/': {segment}"
            )));
        }
    }
    Ok(())
}

/// A document together with its id, as returned by collection reads
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document id (the final path segment)
    pub id: String,
    /// Document fields
    pub record: Record,
}

/// Core document store abstraction
///
/// All backends implement this trait so the application layer reads
/// user data without knowing where it lives. Implementations must be
/// safe to share across tasks; reads never mutate backend state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Fetch a single document, `None` when it does not exist
    async fn get_document(&self, path: &DocumentPath) -> AppResult<Option<Record>>;

    /// Fetch every document in a collection
    ///
    /// An empty or missing collection yields an empty vec, not an error.
    async fn stream_collection(&self, path: &CollectionPath) -> AppResult<Vec<StoredDocument>>;
}
