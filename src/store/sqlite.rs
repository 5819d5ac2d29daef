// ABOUTME: SQLite document store backend for local development and tests
// ABOUTME: Stores documents as JSON rows keyed by slash-joined path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! SQLite document store implementation
//!
//! Documents live in a single `documents` table as JSON text, keyed by
//! their slash-joined path with the parent collection denormalized for
//! collection scans. This backend serves local development and all tests.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{CollectionPath, DocumentPath, DocumentStore, StoredDocument};
use crate::errors::{AppError, AppResult};
use crate::models::Record;

/// SQLite-backed document store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a SQLite document store
    ///
    /// # Errors
    ///
    /// Returns a storage error when the connection or migration fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let is_memory = database_url.contains(":memory:");

        let pool = if is_memory {
            // An in-memory database exists per connection, so the pool
            // must hold exactly one connection and never recycle it.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await
                .map_err(|e| AppError::storage(format!("failed to open in-memory store: {e}")))?
        } else {
            // mode=rwc creates the database file on first use
            let connection_options = format!("{database_url}?mode=rwc");
            SqlitePool::connect(&connection_options)
                .await
                .map_err(|e| AppError::storage(format!("failed to open sqlite store: {e}")))?
        };

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the documents table and its indexes
    ///
    /// # Errors
    ///
    /// Returns a storage error when the DDL fails.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                parent TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("failed to create documents table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage(format!("failed to create parent index: {e}")))?;

        debug!("SQLite document store migrated");
        Ok(())
    }

    /// Insert or replace a document
    ///
    /// Used by the seed binary and tests; the serving path never writes.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the write fails.
    pub async fn upsert_document(&self, path: &DocumentPath, record: &Record) -> AppResult<()> {
        let data = record.to_json().to_string();
        let parent = path.parent();
        sqlx::query(
            r"
            INSERT INTO documents (path, parent, data)
            VALUES (?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                data = excluded.data,
                updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(path.as_str())
        .bind(parent.as_str())
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage(format!("failed to upsert {path}: {e}")))?;
        Ok(())
    }

    /// Access the underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn parse_row(path: &str, data: &str) -> AppResult<Record> {
        let value: serde_json::Value = serde_json::from_str(data)
            .map_err(|e| AppError::storage(format!("corrupt document at {path}: {e}")))?;
        Record::from_json(value)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn get_document(&self, path: &DocumentPath) -> AppResult<Option<Record>> {
        let row = sqlx::query("SELECT data FROM documents WHERE path = ?")
            .bind(path.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::storage(format!("failed to read {path}: {e}")))?;

        match row {
            Some(row) => {
                let data: String = row
                    .try_get("data")
                    .map_err(|e| AppError::storage(format!("failed to read {path}: {e}")))?;
                Ok(Some(Self::parse_row(path.as_str(), &data)?))
            }
            None => Ok(None),
        }
    }

    async fn stream_collection(&self, path: &CollectionPath) -> AppResult<Vec<StoredDocument>> {
        let rows = sqlx::query("SELECT path, data FROM documents WHERE parent = ? ORDER BY path")
            .bind(path.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::storage(format!("failed to scan {path}: {e}")))?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let doc_path: String = row
                .try_get("path")
                .map_err(|e| AppError::storage(format!("failed to scan {path}: {e}")))?;
            let data: String = row
                .try_get("data")
                .map_err(|e| AppError::storage(format!("failed to scan {path}: {e}")))?;
            let id = doc_path
                .rsplit('/')
                .next()
                .unwrap_or(doc_path.as_str())
                .to_owned();
            documents.push(StoredDocument {
                id,
                record: Self::parse_row(&doc_path, &data)?,
            });
        }
        Ok(documents)
    }
}
