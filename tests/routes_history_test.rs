// ABOUTME: Integration tests for the weight, BMI, and nutrition history endpoints
// ABOUTME: Covers series sorting, day-window filtering, and the aggregate wire shapes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::float_cmp,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::items_after_statements,
    clippy::uninlined_format_args
)]

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::json;

mod helpers;
use helpers::http::ApiRequest;
use helpers::seed::{memory_store, seed_subdocument, test_app};
use helpers::stubs::{ScriptedChat, StubEmbedder};
use ournold_server::store::SqliteStore;

fn app_with(store: SqliteStore) -> Result<Router> {
    Ok(test_app(
        Arc::new(store),
        Arc::new(ScriptedChat::unavailable()),
        Arc::new(StubEmbedder::new()),
    )?)
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339()
}

// ============================================================================
// Weight and BMI series
// ============================================================================

#[tokio::test]
async fn test_weight_history_sorted_ascending() -> Result<()> {
    let store = memory_store().await?;
    seed_subdocument(
        &store,
        "u1",
        "history",
        "h1",
        json!({"weight": 71.0, "timestamp": "2025-03-02T08:00:00Z"}),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "history",
        "h2",
        json!({"weight": 70.0, "timestamp": "2025-03-01T08:00:00Z"}),
    )
    .await?;
    // No timestamp, must be skipped rather than fail the series
    seed_subdocument(&store, "u1", "history", "h3", json!({"weight": 99.0})).await?;

    let response = ApiRequest::get("/api/user/weight/u1")
        .send(app_with(store)?)
        .await;

    assert_eq!(response.status(), 200);
    let data = response.value()["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["weight"], 70.0);
    assert_eq!(data[1]["weight"], 71.0);
    assert!(data[0]["date"].as_str().unwrap() < data[1]["date"].as_str().unwrap());
    Ok(())
}

#[tokio::test]
async fn test_bmi_graph_flattens_value_into_point() -> Result<()> {
    let store = memory_store().await?;
    seed_subdocument(
        &store,
        "u1",
        "history",
        "h1",
        json!({"bmi": 23.4, "weight": 71.0, "timestamp": "2025-03-02T08:00:00Z"}),
    )
    .await?;

    let response = ApiRequest::get("/api/user/u1/bmiGraph")
        .send(app_with(store)?)
        .await;

    assert_eq!(response.status(), 200);
    let data = response.value()["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["bmi"], 23.4);
    assert!(data[0]["date"].as_str().is_some());
    assert!(data[0].get("value").is_none());
    assert!(data[0].get("weight").is_none());
    Ok(())
}

#[tokio::test]
async fn test_series_empty_for_user_without_history() -> Result<()> {
    let store = memory_store().await?;

    let response = ApiRequest::get("/api/user/weight/nobody")
        .send(app_with(store)?)
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.value()["data"].as_array().unwrap().len(), 0);
    Ok(())
}

// ============================================================================
// Today's nutrition
// ============================================================================

#[tokio::test]
async fn test_today_nutrition_filters_to_current_utc_day() -> Result<()> {
    let store = memory_store().await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m1",
        json!({
            "meal_name": "Oats",
            "cals": 350.0,
            "protein": 12.0,
            "carbs": 60.0,
            "timestamp": Utc::now().to_rfc3339()
        }),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m2",
        json!({
            "meal_name": "Old pizza",
            "cals": 900.0,
            "protein": 30.0,
            "timestamp": days_ago(2)
        }),
    )
    .await?;

    let response = ApiRequest::get("/api/user/todayNutrition/u1")
        .send(app_with(store)?)
        .await;

    assert_eq!(response.status(), 200);
    let data = response.value()["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["calories"], 350.0);
    assert_eq!(data[0]["protein"], 12.0);
    assert_eq!(data[0]["carbs"], 60.0);
    // Missing macro fields read as zero
    assert_eq!(data[0]["fat"], 0.0);
    Ok(())
}

// ============================================================================
// Macro history
// ============================================================================

#[tokio::test]
async fn test_macro_history_without_entries_reports_message() -> Result<()> {
    let store = memory_store().await?;

    let response = ApiRequest::get("/api/user/macroHistory/u1")
        .send(app_with(store)?)
        .await;

    assert_eq!(response.status(), 200);
    let body = response.value();
    assert_eq!(body["message"], "No entries found in the past year.");
    assert!(body["data"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_macro_history_totals_inside_year_window() -> Result<()> {
    let store = memory_store().await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m1",
        json!({"protein": 10.111, "carbs": 10.0, "fat": 5.5, "timestamp": days_ago(1)}),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m2",
        json!({"protein": 20.222, "carbs": 20.5, "timestamp": days_ago(10)}),
    )
    .await?;
    // Outside the 365-day window
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m3",
        json!({"protein": 500.0, "carbs": 500.0, "fat": 500.0, "timestamp": days_ago(400)}),
    )
    .await?;

    let response = ApiRequest::get("/api/user/macroHistory/u1")
        .send(app_with(store)?)
        .await;

    assert_eq!(response.status(), 200);
    let body = response.value();
    assert!(body.get("message").is_none());
    let totals = &body["data"];
    assert!((totals["protein"].as_f64().unwrap() - 30.33).abs() < 1e-9);
    assert!((totals["carbs"].as_f64().unwrap() - 30.5).abs() < 1e-9);
    assert!((totals["fats"].as_f64().unwrap() - 5.5).abs() < 1e-9);
    Ok(())
}

// ============================================================================
// Protein history
// ============================================================================

#[tokio::test]
async fn test_protein_history_groups_per_day() -> Result<()> {
    let store = memory_store().await?;
    // Two meals yesterday, one today, one far outside the month window
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m1",
        json!({"protein": 20.0, "timestamp": days_ago(1)}),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m2",
        json!({"protein": 11.5, "timestamp": days_ago(1)}),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m3",
        json!({"protein": 10.0, "timestamp": Utc::now().to_rfc3339()}),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m4",
        json!({"protein": 99.0, "timestamp": days_ago(40)}),
    )
    .await?;

    let response = ApiRequest::get("/api/user/proteinHistory/u1")
        .send(app_with(store)?)
        .await;

    assert_eq!(response.status(), 200);
    let data = response.value()["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 2);
    // Sorted ascending, yesterday first
    assert_eq!(data[0]["protein"], 31.5);
    assert_eq!(data[1]["protein"], 10.0);
    let first_day = data[0]["date"].as_str().unwrap();
    assert_eq!(first_day.len(), "2025-01-01".len());
    assert!(first_day < data[1]["date"].as_str().unwrap());
    Ok(())
}
