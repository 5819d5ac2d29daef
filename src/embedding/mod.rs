// ABOUTME: Embedding provider abstraction for turning statements and queries into vectors
// ABOUTME: Defines the async contract shared by the Gemini and OpenAI-compatible backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Embedding Provider Service Provider Interface
//!
//! Relevance ranking needs vectors for candidate statements and for the user
//! query. This module defines the single [`EmbeddingProvider`] trait every
//! backend implements, so the ranking pipeline stays provider-agnostic: the
//! scoring algorithm (cosine similarity) never changes, only the vector source.
//!
//! ## Contract
//!
//! - `embed_batch` issues **one** request for the whole batch; providers never
//!   loop per-text.
//! - All vectors returned by one call share the same dimensionality; providers
//!   validate this and fail with an embedding error otherwise.
//! - An empty input batch returns an empty vector without any network call.

mod gemini;
mod openai_compatible;
mod provider;

pub use gemini::GeminiEmbeddings;
pub use openai_compatible::OpenAiCompatEmbeddings;
pub use provider::Embedder;

use async_trait::async_trait;

use crate::errors::AppError;

/// Embedding provider trait
///
/// Implement this trait to add a new embedding backend to Ournold.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Unique provider identifier (e.g., "gemini", "openai-compatible")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Model used for embedding requests
    fn model(&self) -> &str;

    /// Embed a batch of texts in a single request
    ///
    /// Returns one vector per input text, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError>;

    /// Check if the provider is reachable and credentials are valid
    async fn health_check(&self) -> Result<bool, AppError>;
}

/// Validate that every vector in a batch has the same dimensionality
///
/// A provider returning ragged vectors indicates a malformed response, which
/// callers must treat as an embedding failure rather than score garbage.
pub(crate) fn validate_dimensions(vectors: &[Vec<f32>]) -> Result<(), AppError> {
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    let expected = first.len();
    if expected == 0 {
        return Err(AppError::embedding_unavailable(
            "provider returned an empty embedding vector",
        ));
    }
    for (index, vector) in vectors.iter().enumerate() {
        if vector.len() != expected {
            return Err(AppError::embedding_unavailable(format!(
                "embedding dimension mismatch: vector {index} has {} values, expected {expected}",
                vector.len()
            )));
        }
    }
    Ok(())
}
