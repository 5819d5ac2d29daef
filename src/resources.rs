// ABOUTME: Centralized resource container for dependency injection across route handlers
// ABOUTME: Holds shared store, LLM, embedding, and retrieval resources behind Arcs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Server Resources Module
//!
//! Centralized resource container for dependency injection.
//! Expensive objects (HTTP-backed providers, store pools) are built once
//! at startup and shared across handlers via `Arc`, never recreated per
//! request.

use std::sync::Arc;

use crate::config::environment::ServerConfig;
use crate::embedding::EmbeddingProvider;
use crate::errors::AppError;
use crate::llm::LlmProvider;
use crate::retrieval::ContextRetriever;
use crate::store::DocumentStore;

/// Centralized resource container for dependency injection
///
/// Handlers receive this via axum `State` and pick the resources they
/// need. The retriever is constructed here from the store and embedder
/// so route code never assembles pipeline stages itself.
#[derive(Clone)]
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Document store backing all profile and history reads
    pub store: Arc<dyn DocumentStore>,
    /// Chat completion provider for coaching endpoints
    pub chat: Arc<dyn LlmProvider>,
    /// Embedding provider backing relevance ranking
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// Context retrieval pipeline for the conversational endpoint
    pub retriever: Arc<ContextRetriever>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        store: Arc<dyn DocumentStore>,
        chat: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let retriever = Arc::new(ContextRetriever::new(
            store.clone(),
            embedder.clone(),
            config.retrieval.clone(),
        ));

        Self {
            config,
            store,
            chat,
            embedder,
            retriever,
        }
    }

    /// Create a new builder for `ServerResources`
    #[must_use]
    pub const fn builder() -> ServerResourcesBuilder {
        ServerResourcesBuilder::new()
    }
}

/// Builder for `ServerResources` to avoid manual resource assembly
pub struct ServerResourcesBuilder {
    config: Option<Arc<ServerConfig>>,
    store: Option<Arc<dyn DocumentStore>>,
    chat: Option<Arc<dyn LlmProvider>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl ServerResourcesBuilder {
    /// Create a new empty builder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: None,
            store: None,
            chat: None,
            embedder: None,
        }
    }

    /// Set the server configuration
    #[must_use]
    pub fn with_config(mut self, config: Arc<ServerConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document store
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the chat provider
    #[must_use]
    pub fn with_chat_provider(mut self, chat: Arc<dyn LlmProvider>) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Set the embedding provider
    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Build the `ServerResources`
    ///
    /// # Errors
    ///
    /// Returns a config error if any required resource is missing.
    pub fn build(self) -> Result<ServerResources, AppError> {
        let config = self
            .config
            .ok_or_else(|| AppError::config("server config is required"))?;
        let store = self
            .store
            .ok_or_else(|| AppError::config("document store is required"))?;
        let chat = self
            .chat
            .ok_or_else(|| AppError::config("chat provider is required"))?;
        let embedder = self
            .embedder
            .ok_or_else(|| AppError::config("embedding provider is required"))?;

        Ok(ServerResources::new(config, store, chat, embedder))
    }

    /// Build the `ServerResources` wrapped in an `Arc`
    ///
    /// # Errors
    ///
    /// Returns a config error if any required resource is missing.
    pub fn build_arc(self) -> Result<Arc<ServerResources>, AppError> {
        Ok(Arc::new(self.build()?))
    }
}

impl Default for ServerResourcesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
