// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides system health and readiness endpoints for monitoring infrastructure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Health check routes for service monitoring
//!
//! Liveness reports static identity; readiness additionally names the
//! configured backends so operators can confirm wiring at a glance.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::constants::service_names;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::health_handler))
            .route("/ready", get(Self::ready_handler))
            .with_state(resources)
    }

    async fn health_handler(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "service": service_names::OURNOLD_SERVER,
            "version": resources.config.server_version,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    async fn ready_handler(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "ready",
            "store": resources.store.backend_name(),
            "llm_provider": resources.chat.name(),
            "embedding_model": resources.embedder.model(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}
