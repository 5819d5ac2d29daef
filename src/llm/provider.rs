// ABOUTME: Unified LLM provider selector for runtime provider switching
// ABOUTME: Abstracts over Gemini and Groq providers based on environment configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # LLM Provider Selector
//!
//! This module provides a unified interface for LLM providers that can be
//! configured at runtime via environment variables.
//!
//! ## Configuration
//!
//! Set `OURNOLD_LLM_PROVIDER` environment variable:
//! - `gemini` (default): Use Google Gemini for full-featured capabilities including vision
//! - `groq`: Use Groq for cost-effective open-source models
//!
//! ## Example
//!
//! ```rust,no_run
//! use ournold_server::llm::{ChatMessage, ChatRequest, ChatProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ournold_server::errors::AppError> {
//!     let provider = ChatProvider::from_env()?;
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::user("Hello!"),
//!     ]);
//!     let response = provider.complete(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

use std::fmt;

use tracing::{debug, info};

use super::{
    ChatRequest, ChatResponse, GeminiProvider, GroqProvider, LlmCapabilities, LlmProvider,
};
use crate::config::LlmProviderType;
use crate::errors::AppError;

/// Unified chat provider that wraps Gemini or Groq
///
/// This enum provides a consistent interface regardless of which
/// underlying provider is configured.
pub enum ChatProvider {
    /// Google Gemini provider with vision support
    Gemini(GeminiProvider),
    /// Groq provider for fast, cost-effective inference
    Groq(GroqProvider),
}

impl ChatProvider {
    /// Create a provider from environment configuration
    ///
    /// Reads `OURNOLD_LLM_PROVIDER` to determine which provider to use:
    /// - `gemini` (default): Creates `GeminiProvider` (requires `GEMINI_API_KEY`)
    /// - `groq`: Creates `GroqProvider` (requires `GROQ_API_KEY`)
    ///
    /// An optional `OURNOLD_LLM_MODEL` overrides the provider's default model.
    ///
    /// # Errors
    ///
    /// Returns an error if the required API key environment variable is missing.
    pub fn from_env() -> Result<Self, AppError> {
        let provider_type = LlmProviderType::from_env();

        info!(
            "Initializing LLM provider: {} (set {} to change)",
            provider_type,
            LlmProviderType::ENV_VAR
        );

        let provider = match provider_type {
            LlmProviderType::Gemini => Self::gemini()?,
            LlmProviderType::Groq => Self::groq()?,
        };

        debug!(
            "Provider {} initialized with model: {}",
            provider.display_name(),
            provider.default_model()
        );
        Ok(provider)
    }

    /// Create a Gemini provider explicitly
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_API_KEY` is not set.
    pub fn gemini() -> Result<Self, AppError> {
        let mut provider = GeminiProvider::from_env()?;
        if let Some(model) = LlmProviderType::model_from_env() {
            provider = provider.with_default_model(model);
        }
        Ok(Self::Gemini(provider))
    }

    /// Create a Groq provider explicitly
    ///
    /// # Errors
    ///
    /// Returns an error if `GROQ_API_KEY` is not set.
    pub fn groq() -> Result<Self, AppError> {
        Ok(Self::Groq(GroqProvider::from_env()?))
    }

    /// Get the provider type
    #[must_use]
    pub const fn provider_type(&self) -> LlmProviderType {
        match self {
            Self::Gemini(_) => LlmProviderType::Gemini,
            Self::Groq(_) => LlmProviderType::Groq,
        }
    }
}

// Delegate LlmProvider trait methods to the underlying provider
impl ChatProvider {
    /// Get provider name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini(p) => p.name(),
            Self::Groq(p) => p.name(),
        }
    }

    /// Get provider display name
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini(p) => p.display_name(),
            Self::Groq(p) => p.display_name(),
        }
    }

    /// Get provider capabilities
    #[must_use]
    pub fn capabilities(&self) -> LlmCapabilities {
        match self {
            Self::Gemini(p) => p.capabilities(),
            Self::Groq(p) => p.capabilities(),
        }
    }

    /// Get default model
    #[must_use]
    pub fn default_model(&self) -> &str {
        match self {
            Self::Gemini(p) => p.default_model(),
            Self::Groq(p) => p.default_model(),
        }
    }

    /// Get available models
    #[must_use]
    pub fn available_models(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini(p) => p.available_models(),
            Self::Groq(p) => p.available_models(),
        }
    }

    /// Perform a chat completion
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        match self {
            Self::Gemini(p) => p.complete(request).await,
            Self::Groq(p) => p.complete(request).await,
        }
    }

    /// Check provider health
    ///
    /// # Errors
    ///
    /// Returns an error if the health check fails.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        match self {
            Self::Gemini(p) => p.health_check().await,
            Self::Groq(p) => p.health_check().await,
        }
    }
}

impl fmt::Debug for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini(_) => f.debug_tuple("ChatProvider::Gemini").finish(),
            Self::Groq(_) => f.debug_tuple("ChatProvider::Groq").finish(),
        }
    }
}

// Implement LlmProvider trait for ChatProvider to enable trait object usage
#[async_trait::async_trait]
impl LlmProvider for ChatProvider {
    fn name(&self) -> &'static str {
        match self {
            Self::Gemini(p) => p.name(),
            Self::Groq(p) => p.name(),
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini(p) => p.display_name(),
            Self::Groq(p) => p.display_name(),
        }
    }

    fn capabilities(&self) -> LlmCapabilities {
        match self {
            Self::Gemini(p) => p.capabilities(),
            Self::Groq(p) => p.capabilities(),
        }
    }

    fn default_model(&self) -> &str {
        match self {
            Self::Gemini(p) => p.default_model(),
            Self::Groq(p) => p.default_model(),
        }
    }

    fn available_models(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini(p) => p.available_models(),
            Self::Groq(p) => p.available_models(),
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        match self {
            Self::Gemini(p) => p.complete(request).await,
            Self::Groq(p) => p.complete(request).await,
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        match self {
            Self::Gemini(p) => p.health_check().await,
            Self::Groq(p) => p.health_check().await,
        }
    }
}
