// ABOUTME: System-wide constants and environment-based configuration values
// ABOUTME: Groups defaults, limits, and env var accessors used across the server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Constants Module
//!
//! Application constants and environment variable configuration.
//! This module provides both hardcoded defaults and environment accessors.

/// Environment variable accessors with defaults
pub mod env_config {
    use std::env;

    use super::defaults;

    /// Get HTTP API port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults::HTTP_PORT)
    }

    /// Get log level from environment or default
    #[must_use]
    pub fn log_level() -> String {
        env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into())
    }

    /// Get document store URL from environment or default
    ///
    /// Accepts `sqlite:<path>`, `sqlite::memory:`, or `firestore://<project-id>`.
    #[must_use]
    pub fn store_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| defaults::STORE_URL.into())
    }

    /// Get allowed CORS origins from environment or default
    ///
    /// Comma-separated list of origins, or `*` for any.
    #[must_use]
    pub fn cors_origins() -> String {
        env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into())
    }

    /// Get context top-k from environment or default
    #[must_use]
    pub fn context_top_k() -> usize {
        env::var("OURNOLD_CONTEXT_TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::CONTEXT_TOP_K)
    }

    /// Get store read timeout in seconds from environment or default
    #[must_use]
    pub fn store_timeout_secs() -> u64 {
        env::var("OURNOLD_STORE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::STORE_TIMEOUT_SECS)
    }

    /// Get embedding call timeout in seconds from environment or default
    #[must_use]
    pub fn embedding_timeout_secs() -> u64 {
        env::var("OURNOLD_EMBEDDING_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::EMBEDDING_TIMEOUT_SECS)
    }

    /// Get the Spoonacular API key, if configured
    #[must_use]
    pub fn spoonacular_api_key() -> Option<String> {
        env::var("SPOONACULAR_API_KEY").ok().filter(|k| !k.is_empty())
    }

    /// Get the Cloudinary cloud name, if configured
    #[must_use]
    pub fn cloudinary_cloud_name() -> Option<String> {
        env::var("CLOUDINARY_CLOUD_NAME").ok().filter(|v| !v.is_empty())
    }

    /// Get the Cloudinary API key, if configured
    #[must_use]
    pub fn cloudinary_api_key() -> Option<String> {
        env::var("CLOUDINARY_API_KEY").ok().filter(|v| !v.is_empty())
    }

    /// Get the Cloudinary API secret, if configured
    #[must_use]
    pub fn cloudinary_api_secret() -> Option<String> {
        env::var("CLOUDINARY_API_SECRET").ok().filter(|v| !v.is_empty())
    }
}

/// Service identity strings used in logs and HTTP headers
pub mod service_names {
    /// Canonical service name
    pub const OURNOLD_SERVER: &str = "ournold-server";
}

/// Hardcoded defaults
pub mod defaults {
    /// Default HTTP API port
    pub const HTTP_PORT: u16 = 8000;

    /// Default document store URL
    pub const STORE_URL: &str = "sqlite:./data/ournold.db";

    /// Default number of context statements retrieved per query
    pub const CONTEXT_TOP_K: usize = 5;

    /// Default timeout for document store reads, in seconds
    pub const STORE_TIMEOUT_SECS: u64 = 10;

    /// Default timeout for embedding calls, in seconds
    pub const EMBEDDING_TIMEOUT_SECS: u64 = 30;

    /// Default timeout for a whole HTTP request, in seconds
    ///
    /// Generous because LLM-backed endpoints routinely take tens of seconds.
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;

    /// Timeout for downloading a food image, in seconds
    pub const IMAGE_DOWNLOAD_TIMEOUT_SECS: u64 = 20;

    /// Connect timeout for downloading a food image, in seconds
    pub const IMAGE_DOWNLOAD_CONNECT_TIMEOUT_SECS: u64 = 5;
}

/// Request and data-shape limits
pub mod limits {
    /// Maximum accepted request body size in bytes
    pub const MAX_BODY_BYTES: usize = 1024 * 1024;

    /// Number of recent conversation turns forwarded to the LLM
    pub const CHAT_HISTORY_WINDOW: usize = 5;

    /// Number of most recent meals rated per request
    pub const MEALS_RATING_LIMIT: usize = 5;

    /// Minimum size for a downloaded food image to be considered real
    pub const MIN_IMAGE_BYTES: usize = 100;

    /// Maximum size for a downloaded food image
    pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

    /// Days of history aggregated by the protein history endpoint
    pub const PROTEIN_HISTORY_DAYS: i64 = 30;

    /// Days of history aggregated by the macro totals endpoint
    pub const MACRO_HISTORY_DAYS: i64 = 365;
}
