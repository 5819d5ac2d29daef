// ABOUTME: Unified embedding provider selector for runtime provider switching
// ABOUTME: Abstracts over Gemini and OpenAI-compatible backends based on environment configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Embedding Provider Selector
//!
//! ## Configuration
//!
//! Set `OURNOLD_EMBEDDING_PROVIDER` environment variable:
//! - `gemini` (default): Use Google Gemini embeddings (requires `GEMINI_API_KEY`)
//! - `openai`/`local`/`ollama`: Use an OpenAI-compatible endpoint

use std::fmt;

use tracing::{debug, info};

use super::{EmbeddingProvider, GeminiEmbeddings, OpenAiCompatEmbeddings};
use crate::config::EmbeddingProviderType;
use crate::errors::AppError;

/// Unified embedding provider that wraps the configured backend
pub enum Embedder {
    /// Google Gemini embeddings
    Gemini(GeminiEmbeddings),
    /// Any endpoint speaking the OpenAI embeddings wire format
    OpenAiCompatible(OpenAiCompatEmbeddings),
}

impl Embedder {
    /// Create a provider from environment configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the selected backend is missing required
    /// configuration (e.g. `GEMINI_API_KEY`).
    pub fn from_env() -> Result<Self, AppError> {
        let provider_type = EmbeddingProviderType::from_env();

        info!(
            "Initializing embedding provider: {} (set {} to change)",
            provider_type,
            EmbeddingProviderType::ENV_VAR
        );

        let provider = match provider_type {
            EmbeddingProviderType::Gemini => Self::Gemini(GeminiEmbeddings::from_env()?),
            EmbeddingProviderType::OpenAiCompatible => {
                Self::OpenAiCompatible(OpenAiCompatEmbeddings::from_env())
            }
        };

        debug!(
            "Embedding provider {} initialized with model: {}",
            provider.display_name(),
            provider.model()
        );
        Ok(provider)
    }
}

impl fmt::Debug for Embedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini(_) => f.debug_tuple("Embedder::Gemini").finish(),
            Self::OpenAiCompatible(_) => f.debug_tuple("Embedder::OpenAiCompatible").finish(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for Embedder {
    fn name(&self) -> &'static str {
        match self {
            Self::Gemini(p) => p.name(),
            Self::OpenAiCompatible(p) => p.name(),
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini(p) => p.display_name(),
            Self::OpenAiCompatible(p) => p.display_name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::Gemini(p) => p.model(),
            Self::OpenAiCompatible(p) => p.model(),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        match self {
            Self::Gemini(p) => p.embed_batch(texts).await,
            Self::OpenAiCompatible(p) => p.embed_batch(texts).await,
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
        match self {
            Self::Gemini(p) => p.embed_one(text).await,
            Self::OpenAiCompatible(p) => p.embed_one(text).await,
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        match self {
            Self::Gemini(p) => p.health_check().await,
            Self::OpenAiCompatible(p) => p.health_check().await,
        }
    }
}
