// ABOUTME: Route module organization for the Ournold HTTP API
// ABOUTME: Centralized route definitions organized by domain plus the top-level router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Route module for the Ournold API server
//!
//! Routes are organized by domain for better maintainability. Each
//! domain module contains route definitions and thin handler functions
//! that delegate to the store, intelligence, retrieval, and LLM layers.
//! [`build_router`] assembles them all behind the shared middleware
//! stack.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::constants::{defaults, limits};
use crate::middleware::setup_cors;
use crate::resources::ServerResources;

/// Conversational ask endpoint backed by context retrieval
pub mod ask;
/// Random fitness fact endpoint
pub mod facts;
/// External food data: photo analysis, nutrition lookup, image cleanup
pub mod food;
/// Health check and system status routes
pub mod health;
/// Weight, BMI, and nutrition history routes
pub mod history;
/// Meal rating and daily meal plan routes
pub mod meals;
/// Profile metric routes (BMI, BMR, required calories, insights)
pub mod metrics;

pub use ask::AskRoutes;
pub use facts::FactRoutes;
pub use food::FoodRoutes;
pub use health::HealthRoutes;
pub use history::HistoryRoutes;
pub use meals::MealRoutes;
pub use metrics::MetricRoutes;

/// Assemble the complete API router with shared middleware
///
/// Layer order matters: CORS sits outermost so browser preflights are
/// answered before anything else, tracing wraps every handled request,
/// and the timeout bounds slow LLM calls.
#[must_use]
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AskRoutes::routes(resources.clone()))
        .merge(MetricRoutes::routes(resources.clone()))
        .merge(HistoryRoutes::routes(resources.clone()))
        .merge(MealRoutes::routes(resources.clone()))
        .merge(FactRoutes::routes(resources.clone()))
        .merge(FoodRoutes::routes(resources))
        .layer(RequestBodyLimitLayer::new(limits::MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(
            defaults::REQUEST_TIMEOUT_SECS,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
