// ABOUTME: Store seeding and router assembly helpers for integration tests
// ABOUTME: Opens in-memory stores, writes fixture documents, and wires the router to doubles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

use std::sync::Arc;

use axum::Router;
use serde_json::Value;

use ournold_server::config::environment::ServerConfig;
use ournold_server::embedding::EmbeddingProvider;
use ournold_server::errors::AppResult;
use ournold_server::llm::LlmProvider;
use ournold_server::models::Record;
use ournold_server::resources::ServerResources;
use ournold_server::routes::build_router;
use ournold_server::store::{CollectionPath, DocumentPath, DocumentStore, SqliteStore};

/// Open a fresh in-memory document store
pub async fn memory_store() -> AppResult<SqliteStore> {
    SqliteStore::new("sqlite::memory:").await
}

/// Write a user's profile document
pub async fn seed_profile(store: &SqliteStore, user_id: &str, profile: Value) -> AppResult<()> {
    let record = Record::from_json(profile)?;
    store
        .upsert_document(&DocumentPath::user(user_id)?, &record)
        .await
}

/// Write one document into a user sub-collection
pub async fn seed_subdocument(
    store: &SqliteStore,
    user_id: &str,
    collection: &str,
    doc_id: &str,
    body: Value,
) -> AppResult<()> {
    let record = Record::from_json(body)?;
    let path = CollectionPath::user_subcollection(user_id, collection)?.document(doc_id)?;
    store.upsert_document(&path, &record).await
}

/// Assemble server resources around test doubles and a default config
pub fn test_resources(
    store: Arc<dyn DocumentStore>,
    chat: Arc<dyn LlmProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> AppResult<Arc<ServerResources>> {
    ServerResources::builder()
        .with_config(Arc::new(ServerConfig::default()))
        .with_store(store)
        .with_chat_provider(chat)
        .with_embedder(embedder)
        .build_arc()
}

/// The complete API router wired to test doubles
pub fn test_app(
    store: Arc<dyn DocumentStore>,
    chat: Arc<dyn LlmProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
) -> AppResult<Router> {
    Ok(build_router(test_resources(store, chat, embedder)?))
}
