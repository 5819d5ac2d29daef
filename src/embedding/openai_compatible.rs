// ABOUTME: Embedding provider for OpenAI-compatible endpoints (Ollama, vLLM, TEI)
// ABOUTME: Posts the whole batch to /embeddings and reorders results by response index
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # OpenAI-Compatible Embeddings
//!
//! Implementation of the `EmbeddingProvider` trait for any server speaking the
//! `OpenAI` embeddings wire format. This covers local deployments (Ollama,
//! vLLM, text-embeddings-inference) as well as hosted `OpenAI` itself.
//!
//! ## Configuration
//!
//! - `OURNOLD_EMBEDDING_BASE_URL`: API endpoint (default: Ollama at localhost:11434/v1)
//! - `OURNOLD_EMBEDDING_MODEL`: Model name (default: nomic-embed-text)
//! - `OURNOLD_EMBEDDING_API_KEY`: Bearer token (optional, local servers rarely need one)

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{validate_dimensions, EmbeddingProvider};
use crate::errors::AppError;

/// Environment variable for the endpoint base URL
const BASE_URL_ENV: &str = "OURNOLD_EMBEDDING_BASE_URL";

/// Environment variable for the model name
const MODEL_ENV: &str = "OURNOLD_EMBEDDING_MODEL";

/// Environment variable for the optional bearer token
const API_KEY_ENV: &str = "OURNOLD_EMBEDDING_API_KEY";

/// Default base URL (Ollama's OpenAI-compatible endpoint)
const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

/// Default embedding model
const DEFAULT_MODEL: &str = "nomic-embed-text";

// ============================================================================
// API Request/Response Types (OpenAI wire format)
// ============================================================================

/// Embeddings request body
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'a str,
}

/// Embeddings response body
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

/// One embedding in the response, tagged with its input index
#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    index: usize,
    embedding: Vec<f32>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Configuration for an OpenAI-compatible embedding endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Base URL of the API (without trailing `/embeddings`)
    pub base_url: String,
    /// Bearer token, if the endpoint requires one
    pub api_key: Option<String>,
    /// Model name to request
    pub model: String,
}

impl OpenAiCompatConfig {
    /// Load configuration from environment variables, using local defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
            api_key: env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            model: env::var(MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
        }
    }
}

/// Embedding provider for OpenAI-compatible endpoints
pub struct OpenAiCompatEmbeddings {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiCompatEmbeddings {
    /// Create a provider from an explicit configuration
    #[must_use]
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));
        Self {
            client: Client::new(),
            endpoint,
            api_key: config.api_key,
            model: config.model,
        }
    }

    /// Create a provider from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(OpenAiCompatConfig::from_env())
    }

    /// Issue the embeddings POST and decode vectors in input order
    async fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::embedding_unavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, "Embedding endpoint error");
            return Err(AppError::embedding_unavailable(format!(
                "Embedding endpoint error ({status}): {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        let mut parsed: EmbeddingsResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse embedding response");
            AppError::embedding_unavailable(format!("Failed to parse embedding response: {e}"))
        })?;

        // Servers may return entries out of order; the index field is authoritative
        parsed.data.sort_by_key(|entry| entry.index);

        if parsed.data.len() != texts.len() {
            return Err(AppError::embedding_unavailable(format!(
                "Endpoint returned {} embeddings for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|e| e.embedding).collect();
        validate_dimensions(&vectors)?;
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatEmbeddings {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn display_name(&self) -> &'static str {
        "OpenAI-Compatible Embeddings"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, texts), fields(batch = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Sending batch embedding request");
        self.request_embeddings(texts).await
    }

    #[instrument(skip(self, text))]
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let batch = [text.to_owned()];
        let mut vectors = self.request_embeddings(&batch).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::embedding_unavailable("Endpoint returned no embedding"))
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        // A one-token embed doubles as a credentials and model check
        match self.embed_one("ping").await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}

impl Debug for OpenAiCompatEmbeddings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("OpenAiCompatEmbeddings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> OpenAiCompatEmbeddings {
        OpenAiCompatEmbeddings::new(OpenAiCompatConfig {
            base_url: "http://localhost:11434/v1/".to_owned(),
            api_key: None,
            model: "nomic-embed-text".to_owned(),
        })
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = test_provider();
        assert_eq!(provider.endpoint, "http://localhost:11434/v1/embeddings");
    }

    #[test]
    fn test_response_entries_sort_by_index() {
        let raw = r#"{"data":[
            {"index":1,"embedding":[0.3,0.4]},
            {"index":0,"embedding":[0.1,0.2]}
        ]}"#;
        let mut parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        parsed.data.sort_by_key(|e| e.index);
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
        assert_eq!(parsed.data[1].embedding, vec![0.3, 0.4]);
    }

    #[test]
    fn test_request_body_shape() {
        let input = vec!["oats".to_owned(), "rice".to_owned()];
        let body = EmbeddingsRequest {
            model: "nomic-embed-text",
            input: &input,
            encoding_format: "float",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "nomic-embed-text");
        assert_eq!(json["input"].as_array().unwrap().len(), 2);
        assert_eq!(json["encoding_format"], "float");
    }
}
