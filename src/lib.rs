// ABOUTME: Main library entry point for the Ournold fitness backend
// ABOUTME: Exposes the HTTP API, retrieval pipeline, and provider integrations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

#![deny(unsafe_code)]

//! # Ournold Server
//!
//! Backend-for-frontend for the Ournold fitness client. It aggregates
//! per-user metrics (BMI, BMR, caloric targets, meal logs, weight
//! history) from a document store and enriches them with LLM-generated
//! insights, meal plans, and food-image analysis.
//!
//! ## Features
//!
//! - **Retrieval-augmented chat**: flattens a user's profile and
//!   sub-collections into statements, ranks them against the query with
//!   embeddings, and feeds the top matches to the chat model
//! - **Metric insights**: ideal BMI/BMR, required intake, and body
//!   insights derived from the stored profile
//! - **Meal tooling**: goal-aware meal ratings, one-day meal plans,
//!   nutrition guessing, and food-photo analysis
//! - **Pluggable providers**: Gemini or Groq for chat, Gemini or any
//!   OpenAI-compatible endpoint for embeddings, Firestore or SQLite
//!   for storage
//!
//! ## Quick Start
//!
//! 1. Point `DATABASE_URL` at a Firestore project or SQLite file
//! 2. Export the API key for the selected chat/embedding providers
//! 3. Start the server with `ournold-server`
//!
//! ## Architecture
//!
//! - **Store**: document store abstraction over Firestore and SQLite
//! - **Retrieval**: flattener, context assembler, and relevance ranker
//! - **Llm / Embedding**: provider traits plus the concrete clients
//! - **Intelligence**: metric formulas and profile snapshots
//! - **Routes**: the axum HTTP surface consumed by the web client
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ournold_server::config::environment::ServerConfig;
//! use ournold_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     // Load configuration
//!     let config = ServerConfig::from_env()?;
//!
//!     println!("Ournold server configured with port: HTTP={}",
//!              config.http_port);
//!
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by binary crates (src/bin/) and integration tests (tests/).
// They must remain `pub` so external consumers can access them.

/// Configuration management from environment variables
pub mod config;

/// System-wide constants and environment accessors
pub mod constants;

/// Embedding provider trait and implementations
pub mod embedding;

/// Unified error handling with stable error codes
pub mod errors;

/// Fitness metric formulas and profile snapshots
pub mod intelligence;

/// Chat provider trait, implementations, and prompt builders
pub mod llm;

/// Structured logging initialization and helpers
pub mod logging;

/// HTTP middleware (CORS)
pub mod middleware;

/// Document field values and records
pub mod models;

/// Shared server state container
pub mod resources;

/// Context retrieval pipeline: flatten, assemble, rank
pub mod retrieval;

/// HTTP routes for the web client
pub mod routes;

/// Document store abstraction over Firestore and SQLite
pub mod store;

/// Shared HTTP client and JSON extraction utilities
pub mod utils;
