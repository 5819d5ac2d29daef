// ABOUTME: Main server binary wiring config, store, and providers into the HTTP API
// ABOUTME: Production entry point with structured logging and graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Ournold Server Binary
//!
//! Starts the Ournold fitness backend: document store, chat and
//! embedding providers, and the HTTP API consumed by the web client.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ournold_server::{
    config::environment::ServerConfig,
    embedding::{Embedder, EmbeddingProvider},
    llm::{ChatProvider, LlmProvider},
    logging,
    resources::ServerResources,
    routes::build_router,
    store::Store,
};
use tracing::{error, info};

/// Command-line arguments
#[derive(Parser)]
#[command(name = "ournold-server")]
#[command(about = "Ournold Fitness API - retrieval-augmented fitness backend")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle container environments where argument parsing may fail
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using configuration from environment");
            Args { http_port: None }
        }
    };

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting Ournold Fitness API");
    info!("{}", config.summary());

    // Initialize document store
    let store = Store::new(&config.store_url).await?;
    info!("Document store initialized: {}", store.backend_info());

    // Initialize chat and embedding providers
    let chat = ChatProvider::from_env()?;
    info!(
        "Chat provider ready: {} (default model {})",
        chat.display_name(),
        chat.default_model()
    );
    let embedder = Embedder::from_env()?;
    info!(
        "Embedding provider ready: {} (model {})",
        embedder.display_name(),
        embedder.model()
    );

    // Create shared server resources
    let config = Arc::new(config);
    let resources = ServerResources::builder()
        .with_config(config.clone())
        .with_store(Arc::new(store))
        .with_chat_provider(Arc::new(chat))
        .with_embedder(Arc::new(embedder))
        .build_arc()?;

    let router = build_router(resources);

    display_available_endpoints(&config);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Ournold server listening on {addr}");
    info!("Ready to serve fitness data!");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

/// Resolve when the process receives a shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    } else {
        info!("Shutdown signal received");
    }
}

/// Display all available API endpoints with their URLs
fn display_available_endpoints(config: &ServerConfig) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let port = config.http_port;

    info!("=== Available API Endpoints ===");
    display_chat_endpoints(&host, port);
    display_metric_endpoints(&host, port);
    display_history_endpoints(&host, port);
    display_meal_endpoints(&host, port);
    display_food_endpoints(&host, port);
    display_monitoring_endpoints(&host, port);
    info!("=== End of Endpoint List ===");
}

#[allow(clippy::cognitive_complexity)]
fn display_chat_endpoints(host: &str, port: u16) {
    info!("Conversational:");
    info!("   Ask (RAG):         POST http://{host}:{port}/api/ask");
    info!("   Random Fact:       GET  http://{host}:{port}/api/randomFact");
}

#[allow(clippy::cognitive_complexity)]
fn display_metric_endpoints(host: &str, port: u16) {
    info!("Metric Insights:");
    info!("   Ideal BMI:         GET  http://{host}:{port}/api/user/{{user_id}}/bmi");
    info!("   BMR Insight:       GET  http://{host}:{port}/api/user/{{user_id}}/bmr");
    info!("   Required Intake:   GET  http://{host}:{port}/api/user/reqCal/{{user_id}}");
    info!("   Body Insights:     GET  http://{host}:{port}/api/user/bodyInsights/{{user_id}}");
    info!("   Health Summary:    GET  http://{host}:{port}/api/user/healthSummary/{{user_id}}");
}

#[allow(clippy::cognitive_complexity)]
fn display_history_endpoints(host: &str, port: u16) {
    info!("History & Aggregation:");
    info!("   Weight History:    GET  http://{host}:{port}/api/user/weight/{{user_id}}");
    info!("   BMI Graph:         GET  http://{host}:{port}/api/user/{{user_id}}/bmiGraph");
    info!("   Today Nutrition:   GET  http://{host}:{port}/api/user/todayNutrition/{{user_id}}");
    info!("   Macro History:     GET  http://{host}:{port}/api/user/macroHistory/{{user_id}}");
    info!("   Protein History:   GET  http://{host}:{port}/api/user/proteinHistory/{{user_id}}");
}

#[allow(clippy::cognitive_complexity)]
fn display_meal_endpoints(host: &str, port: u16) {
    info!("Meals:");
    info!("   Rated Meals:       GET  http://{host}:{port}/api/user/meals/{{user_id}}");
    info!("   Today's Plan:      GET  http://{host}:{port}/api/todayFood/{{user_id}}");
}

#[allow(clippy::cognitive_complexity)]
fn display_food_endpoints(host: &str, port: u16) {
    info!("Food Tooling:");
    info!("   Analyze Photo:     POST http://{host}:{port}/api/analyze_food?image_url={{url}}");
    info!("   Delete Temp Image: DELETE http://{host}:{port}/api/delete_temp_image?public_id={{id}}");
    info!("   Guess Macros:      POST http://{host}:{port}/api/macros");
}

#[allow(clippy::cognitive_complexity)]
fn display_monitoring_endpoints(host: &str, port: u16) {
    info!("Monitoring:");
    info!("   Health Check:      GET  http://{host}:{port}/health");
    info!("   Readiness:         GET  http://{host}:{port}/ready");
}
