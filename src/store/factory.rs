// ABOUTME: Store factory with runtime backend selection from the configured URL
// ABOUTME: Wraps SQLite and Firestore stores behind one enum implementing DocumentStore
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Document store factory
//!
//! Detects the backend from the configured store URL and constructs the
//! matching implementation.

use async_trait::async_trait;
use tracing::info;

use super::firestore::FirestoreStore;
use super::sqlite::SqliteStore;
use super::{CollectionPath, DocumentPath, DocumentStore, StoredDocument};
use crate::config::StoreUrl;
use crate::errors::AppResult;
use crate::models::Record;

/// Store instance wrapper that delegates to the selected backend
#[derive(Debug, Clone)]
pub enum Store {
    /// SQLite backend (local development, tests)
    Sqlite(SqliteStore),
    /// Firestore backend (production)
    Firestore(FirestoreStore),
}

impl Store {
    /// Create a store from the configured URL
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot connect or is missing
    /// required credentials.
    pub async fn new(url: &StoreUrl) -> AppResult<Self> {
        match url {
            StoreUrl::Sqlite { .. } | StoreUrl::Memory => {
                info!("Initializing SQLite document store");
                let store = SqliteStore::new(&url.to_connection_string()).await?;
                info!("SQLite document store ready");
                Ok(Self::Sqlite(store))
            }
            StoreUrl::Firestore { project_id } => {
                info!(project_id = %project_id, "Initializing Firestore document store");
                let store = FirestoreStore::new(project_id)?;
                info!("Firestore document store ready");
                Ok(Self::Firestore(store))
            }
        }
    }

    /// Get a descriptive string for the current backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "SQLite (Local Development)",
            Self::Firestore(_) => "Firestore (Production)",
        }
    }
}

#[async_trait]
impl DocumentStore for Store {
    fn backend_name(&self) -> &'static str {
        match self {
            Self::Sqlite(store) => store.backend_name(),
            Self::Firestore(store) => store.backend_name(),
        }
    }

    async fn get_document(&self, path: &DocumentPath) -> AppResult<Option<Record>> {
        match self {
            Self::Sqlite(store) => store.get_document(path).await,
            Self::Firestore(store) => store.get_document(path).await,
        }
    }

    async fn stream_collection(&self, path: &CollectionPath) -> AppResult<Vec<StoredDocument>> {
        match self {
            Self::Sqlite(store) => store.stream_collection(path).await,
            Self::Firestore(store) => store.stream_collection(path).await,
        }
    }
}
