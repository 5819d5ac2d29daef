// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, store URLs, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Environment-based configuration management for production deployment

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::types::{EmbeddingProviderType, Environment, LlmProviderType, LogLevel};
use crate::constants::{defaults, env_config};
use crate::errors::{AppError, AppResult};

/// Type-safe document store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoreUrl {
    /// SQLite database with file path
    Sqlite { path: PathBuf },
    /// In-memory SQLite (for testing)
    Memory,
    /// Google Firestore project
    Firestore { project_id: String },
}

impl StoreUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns a config error for a `firestore://` URL without a project id.
    pub fn parse_url(s: &str) -> AppResult<Self> {
        if let Some(project) = s.strip_prefix("firestore://") {
            if project.is_empty() {
                return Err(AppError::config(
                    "firestore:// URL must include a project id",
                ));
            }
            Ok(Self::Firestore {
                project_id: project.to_owned(),
            })
        } else if let Some(path) = s.strip_prefix("sqlite:") {
            if path == ":memory:" {
                Ok(Self::Memory)
            } else {
                Ok(Self::Sqlite {
                    path: PathBuf::from(path),
                })
            }
        } else {
            // Fallback: treat as SQLite file path
            Ok(Self::Sqlite {
                path: PathBuf::from(s),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::Sqlite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
            Self::Firestore { project_id } => format!("firestore://{project_id}"),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    /// Check if this is a SQLite store
    #[must_use]
    pub const fn is_sqlite(&self) -> bool {
        matches!(self, Self::Sqlite { .. } | Self::Memory)
    }

    /// Check if this is a Firestore store
    #[must_use]
    pub const fn is_firestore(&self) -> bool {
        matches!(self, Self::Firestore { .. })
    }
}

impl Default for StoreUrl {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/ournold.db"),
        }
    }
}

impl std::fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Settings for the context retrieval pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of top-ranked statements included in the context
    pub top_k: usize,
    /// Timeout for document store reads, in seconds
    pub store_timeout_secs: u64,
    /// Timeout for embedding calls, in seconds
    pub embedding_timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::CONTEXT_TOP_K,
            store_timeout_secs: defaults::STORE_TIMEOUT_SECS,
            embedding_timeout_secs: defaults::EMBEDDING_TIMEOUT_SECS,
        }
    }
}

/// Top-level server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Document store location
    pub store_url: StoreUrl,
    /// Allowed CORS origins (`*` means any)
    pub cors_origins: Vec<String>,
    /// Selected chat provider
    pub llm_provider: LlmProviderType,
    /// Selected embedding provider
    pub embedding_provider: EmbeddingProviderType,
    /// Context retrieval settings
    pub retrieval: RetrievalConfig,
    /// Server version (from Cargo.toml)
    pub server_version: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error when a variable is present but unparseable.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_config::http_port(),
            log_level: LogLevel::from_str_or_default(&env_config::log_level()),
            environment: Environment::from_str_or_default(
                &std::env::var("ENVIRONMENT").unwrap_or_default(),
            ),
            store_url: StoreUrl::parse_url(&env_config::store_url())?,
            cors_origins: parse_origins(&env_config::cors_origins()),
            llm_provider: LlmProviderType::from_env(),
            embedding_provider: EmbeddingProviderType::from_env(),
            retrieval: RetrievalConfig {
                top_k: env_config::context_top_k(),
                store_timeout_secs: env_config::store_timeout_secs(),
                embedding_timeout_secs: env_config::embedding_timeout_secs(),
            },
            server_version: env!("CARGO_PKG_VERSION").to_owned(),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a config error for values that cannot work at runtime.
    pub fn validate(&self) -> AppResult<()> {
        if self.retrieval.top_k == 0 {
            return Err(AppError::config("OURNOLD_CONTEXT_TOP_K must be at least 1"));
        }
        if self.retrieval.store_timeout_secs == 0 || self.retrieval.embedding_timeout_secs == 0 {
            return Err(AppError::config("retrieval timeouts must be non-zero"));
        }
        if self.cors_origins.is_empty() {
            return Err(AppError::config("CORS_ORIGINS must not be empty"));
        }
        Ok(())
    }

    /// Check whether any origin is allowed
    #[must_use]
    pub fn cors_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Ournold Server Configuration:\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Environment: {}\n\
             - Store: {}\n\
             - LLM Provider: {}\n\
             - Embedding Provider: {}\n\
             - Context Top-K: {}\n\
             - Store Timeout: {}s\n\
             - Embedding Timeout: {}s",
            self.http_port,
            self.log_level,
            self.environment,
            if self.store_url.is_firestore() {
                "Firestore"
            } else {
                "SQLite"
            },
            self.llm_provider,
            self.embedding_provider,
            self.retrieval.top_k,
            self.retrieval.store_timeout_secs,
            self.retrieval.embedding_timeout_secs,
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            log_level: LogLevel::default(),
            environment: Environment::default(),
            store_url: StoreUrl::default(),
            cors_origins: vec!["*".to_owned()],
            llm_provider: LlmProviderType::default(),
            embedding_provider: EmbeddingProviderType::default(),
            retrieval: RetrievalConfig::default(),
            server_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// Split a comma-separated origins string into a trimmed list
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_url_parsing() {
        assert!(StoreUrl::parse_url("sqlite::memory:").unwrap().is_memory());
        assert!(StoreUrl::parse_url("sqlite:./data/app.db")
            .unwrap()
            .is_sqlite());
        assert!(StoreUrl::parse_url("firestore://my-project")
            .unwrap()
            .is_firestore());
        assert!(StoreUrl::parse_url("firestore://").is_err());
        // Bare paths fall back to SQLite
        assert!(StoreUrl::parse_url("./data/app.db").unwrap().is_sqlite());
    }

    #[test]
    fn test_store_url_round_trip() {
        let url = StoreUrl::parse_url("firestore://my-project").unwrap();
        assert_eq!(url.to_connection_string(), "firestore://my-project");
        let url = StoreUrl::parse_url("sqlite::memory:").unwrap();
        assert_eq!(url.to_connection_string(), "sqlite::memory:");
    }

    #[test]
    fn test_parse_origins_splits_and_trims() {
        let origins = parse_origins("http://localhost:3000, https://ournold.vercel.app");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_owned(),
                "https://ournold.vercel.app".to_owned()
            ]
        );
    }

    #[test]
    fn test_default_config_validates() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.cors_any_origin());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let config = ServerConfig {
            retrieval: RetrievalConfig {
                top_k: 0,
                ..RetrievalConfig::default()
            },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_redacts_nothing_sensitive() {
        let summary = ServerConfig::default().summary();
        assert!(summary.contains("HTTP Port: 8000"));
        assert!(summary.contains("SQLite"));
        assert!(!summary.to_lowercase().contains("api_key"));
    }
}
