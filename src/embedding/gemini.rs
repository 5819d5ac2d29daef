// ABOUTME: Google Gemini embedding provider using the batchEmbedContents REST endpoint
// ABOUTME: Embeds candidate statements in one call and single queries via embedContent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Gemini Embeddings
//!
//! Implementation of the `EmbeddingProvider` trait backed by Google's
//! Generative AI embedding models.
//!
//! ## Configuration
//!
//! Uses the same `GEMINI_API_KEY` environment variable as the chat provider.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{validate_dimensions, EmbeddingProvider};
use crate::errors::AppError;

/// Environment variable for Gemini API key
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default embedding model
const DEFAULT_MODEL: &str = "text-embedding-004";

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Single embedContent request body
#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

/// batchEmbedContents request body
#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

/// Content wrapper for embedding requests
#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<TextPart>,
}

/// Text part of embedding content
#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

/// Single embedContent response body
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Option<EmbeddingValues>,
    error: Option<GeminiApiError>,
}

/// batchEmbedContents response body
#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Option<Vec<EmbeddingValues>>,
    error: Option<GeminiApiError>,
}

/// Vector values for one embedding
#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Error payload from the Gemini API
#[derive(Debug, Deserialize)]
struct GeminiApiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini embedding provider
pub struct GeminiEmbeddings {
    api_key: String,
    client: Client,
    model: String,
}

impl GeminiEmbeddings {
    /// Create a new provider with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Create a provider from the `GEMINI_API_KEY` environment variable
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(GEMINI_API_KEY_ENV).map_err(|_| {
            AppError::config(format!("{GEMINI_API_KEY_ENV} environment variable not set"))
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom embedding model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Build the API URL for a method on the configured model
    fn build_url(&self, method: &str) -> String {
        format!(
            "{API_BASE_URL}/models/{}:{method}?key={}",
            self.model, self.api_key
        )
    }

    /// Qualified model name expected inside request bodies
    fn qualified_model(&self) -> String {
        format!("models/{}", self.model)
    }

    fn embed_request(&self, text: &str) -> EmbedRequest {
        EmbedRequest {
            model: self.qualified_model(),
            content: EmbedContent {
                parts: vec![TextPart {
                    text: text.to_owned(),
                }],
            },
        }
    }

    /// POST a request body and decode the JSON reply, mapping failures to
    /// embedding errors
    async fn post_json<Req: Serialize + Sync, Resp: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &Req,
    ) -> Result<Resp, AppError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::embedding_unavailable(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::embedding_unavailable(format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini embedding API error");
            return Err(AppError::embedding_unavailable(format!(
                "Gemini embedding API error ({status}): {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse embedding response");
            AppError::embedding_unavailable(format!("Failed to parse embedding response: {e}"))
        })
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddings {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn display_name(&self) -> &'static str {
        "Google Gemini Embeddings"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, texts), fields(batch = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.build_url("batchEmbedContents");
        let body = BatchEmbedRequest {
            requests: texts.iter().map(|t| self.embed_request(t)).collect(),
        };

        debug!("Sending batch embedding request to Gemini");
        let response: BatchEmbedResponse = self.post_json(&url, &body).await?;

        if let Some(error) = response.error {
            return Err(AppError::embedding_unavailable(format!(
                "Gemini embedding error: {}",
                error.message
            )));
        }

        let vectors: Vec<Vec<f32>> = response
            .embeddings
            .ok_or_else(|| AppError::embedding_unavailable("No embeddings in Gemini response"))?
            .into_iter()
            .map(|e| e.values)
            .collect();

        if vectors.len() != texts.len() {
            return Err(AppError::embedding_unavailable(format!(
                "Gemini returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        validate_dimensions(&vectors)?;

        Ok(vectors)
    }

    #[instrument(skip(self, text))]
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let url = self.build_url("embedContent");
        let body = self.embed_request(text);

        debug!("Sending single embedding request to Gemini");
        let response: EmbedResponse = self.post_json(&url, &body).await?;

        if let Some(error) = response.error {
            return Err(AppError::embedding_unavailable(format!(
                "Gemini embedding error: {}",
                error.message
            )));
        }

        let values = response
            .embedding
            .ok_or_else(|| AppError::embedding_unavailable("No embedding in Gemini response"))?
            .values;

        if values.is_empty() {
            return Err(AppError::embedding_unavailable(
                "Gemini returned an empty embedding vector",
            ));
        }

        Ok(values)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, AppError> {
        let url = format!("{API_BASE_URL}/models?key={}", self.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::embedding_unavailable(format!("Health check failed: {e}")))?;

        Ok(response.status().is_success())
    }
}

impl Debug for GeminiEmbeddings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiEmbeddings")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_shape() {
        let provider = GeminiEmbeddings::new("key");
        let body = BatchEmbedRequest {
            requests: vec![provider.embed_request("oats with milk")],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["requests"][0]["model"], "models/text-embedding-004");
        assert_eq!(
            json["requests"][0]["content"]["parts"][0]["text"],
            "oats with milk"
        );
    }

    #[test]
    fn test_batch_response_decode() {
        let raw = r#"{"embeddings":[{"values":[0.1,0.2]},{"values":[0.3,0.4]}]}"#;
        let decoded: BatchEmbedResponse = serde_json::from_str(raw).unwrap();
        let embeddings = decoded.embeddings.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[1].values, vec![0.3, 0.4]);
    }

    #[test]
    fn test_custom_model_changes_urls() {
        let provider = GeminiEmbeddings::new("key").with_model("embedding-001");
        assert!(provider.build_url("embedContent").contains("embedding-001:embedContent"));
        assert_eq!(provider.qualified_model(), "models/embedding-001");
    }
}
