// ABOUTME: Configuration module for environment and type-safe settings
// ABOUTME: Exposes server configuration loaded from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

pub mod environment;
pub mod types;

pub use environment::{RetrievalConfig, ServerConfig, StoreUrl};
pub use types::{EmbeddingProviderType, Environment, LlmProviderType, LogLevel};
