// ABOUTME: Integration tests for the profile metric endpoints
// ABOUTME: Covers the health summary wire shape and the LLM-backed BMI, BMR, and intake routes
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
use serde_json::json;

mod helpers;
use helpers::http::ApiRequest;
use helpers::seed::{memory_store, seed_profile, test_app};
use helpers::stubs::{ScriptedChat, StubEmbedder};

// ============================================================================
// Health summary
// ============================================================================

#[tokio::test]
async fn test_health_summary_backfills_derived_metrics() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(
        &store,
        "u1",
        json!({
            "goal": "cut",
            "explain_goal": "summer shred",
            "weight": 70,
            "height": 175,
            "age": 29,
            "currentData": {"exercise_intensity": "medium"}
        }),
    )
    .await?;
    let app = test_app(
        Arc::new(store),
        Arc::new(ScriptedChat::unavailable()),
        Arc::new(StubEmbedder::new()),
    )?;

    let response = ApiRequest::get("/api/user/healthSummary/u1").send(app).await;

    assert_eq!(response.status(), 200);
    let body = response.value();
    assert_eq!(body["goal"], "cut");
    assert_eq!(body["exp_goal"], "summer shred");
    assert_eq!(body["exercise_intensity"], "medium");
    // bmi = 70 / 1.75^2, bmr via Mifflin-St Jeor, maintenance at 1.55x
    assert!((body["bmi"].as_f64().unwrap() - 22.857).abs() < 0.01);
    assert!((body["bmr"].as_f64().unwrap() - 1653.75).abs() < 1e-6);
    assert!((body["mCal"].as_f64().unwrap() - 2563.3125).abs() < 1e-6);
    assert!(body["req_cal_intake"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_health_summary_unknown_user_is_not_found() -> Result<()> {
    let store = memory_store().await?;
    let app = test_app(
        Arc::new(store),
        Arc::new(ScriptedChat::unavailable()),
        Arc::new(StubEmbedder::new()),
    )?;

    let response = ApiRequest::get("/api/user/healthSummary/ghost")
        .send(app)
        .await;

    assert_eq!(response.status(), 404);
    assert_eq!(response.value()["error"]["code"], "RESOURCE_NOT_FOUND");
    Ok(())
}

// ============================================================================
// Ideal BMI
// ============================================================================

#[tokio::test]
async fn test_ideal_bmi_decodes_fenced_reply() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(
        &store,
        "u1",
        json!({"bmi": 27.3, "weight": 82, "height": 173, "goal": "fat loss"}),
    )
    .await?;

    let chat = Arc::new(ScriptedChat::new(&["```json\n{\"ideal_bmi\": 22.5}\n```"]));
    let app = test_app(Arc::new(store), chat.clone(), Arc::new(StubEmbedder::new()))?;

    let response = ApiRequest::get("/api/user/u1/bmi").send(app).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.value()["ideal_bmi"], 22.5);
    assert!(chat.prompt(0).contains("Current BMI: 27.3"));
    Ok(())
}

#[tokio::test]
async fn test_ideal_bmi_without_stored_bmi_skips_the_model() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"weight": 70})).await?;

    let chat = Arc::new(ScriptedChat::unavailable());
    let app = test_app(Arc::new(store), chat.clone(), Arc::new(StubEmbedder::new()))?;

    let response = ApiRequest::get("/api/user/u1/bmi").send(app).await;

    assert_eq!(response.status(), 404);
    assert_eq!(response.value()["error"]["code"], "RESOURCE_NOT_FOUND");
    assert_eq!(chat.calls(), 0);
    Ok(())
}

// ============================================================================
// BMR insight, required intake, body insights
// ============================================================================

#[tokio::test]
async fn test_bmr_insight_wire_shape() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"bmr": 1650, "goal": "bulk"})).await?;

    let chat = Arc::new(ScriptedChat::new(&[
        "{\"ai_response\": \"Your BMR supports a lean bulk.\", \"ideal_bmr\": 1700}",
    ]));
    let app = test_app(Arc::new(store), chat, Arc::new(StubEmbedder::new()))?;

    let response = ApiRequest::get("/api/user/u1/bmr").send(app).await;

    assert_eq!(response.status(), 200);
    let body = response.value();
    assert_eq!(body["ai_response"], "Your BMR supports a lean bulk.");
    assert_eq!(body["ideal_bmr"], 1700.0);
    Ok(())
}

#[tokio::test]
async fn test_required_intake_wire_shape() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(
        &store,
        "u1",
        json!({"maintenanceCalories": 2500, "goal": "cut", "explain_goal": "steady deficit"}),
    )
    .await?;

    let chat = Arc::new(ScriptedChat::new(&[
        "{\"req_intake\": 2000, \"percent_chg\": -20}",
    ]));
    let app = test_app(Arc::new(store), chat, Arc::new(StubEmbedder::new()))?;

    let response = ApiRequest::get("/api/user/reqCal/u1").send(app).await;

    assert_eq!(response.status(), 200);
    let body = response.value();
    assert_eq!(body["req_intake"], 2000.0);
    assert_eq!(body["percent_chg"], -20.0);
    Ok(())
}

#[tokio::test]
async fn test_body_insights_decodes_cards() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"maintenanceCalories": 2500})).await?;

    let chat = Arc::new(ScriptedChat::new(&[concat!(
        "```json\n{\"insights\": [",
        "{\"title\": \"Hydration\", \"description\": \"Drink before meals.\"},",
        "{\"title\": \"Sleep\", \"description\": \"Aim for eight hours.\"}",
        "]}\n```"
    )]));
    let app = test_app(Arc::new(store), chat, Arc::new(StubEmbedder::new()))?;

    let response = ApiRequest::get("/api/user/bodyInsights/u1").send(app).await;

    assert_eq!(response.status(), 200);
    let body = response.value();
    let insights = body["insights"].as_array().unwrap();
    assert_eq!(insights.len(), 2);
    assert_eq!(insights[0]["title"], "Hydration");
    Ok(())
}

#[tokio::test]
async fn test_metric_reply_without_json_is_bad_gateway() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"bmi": 24.0})).await?;

    // No braces anywhere, so nothing can be extracted
    let chat = Arc::new(ScriptedChat::new(&["I would rather not say."]));
    let app = test_app(Arc::new(store), chat, Arc::new(StubEmbedder::new()))?;

    let response = ApiRequest::get("/api/user/u1/bmi").send(app).await;

    assert_eq!(response.status(), 502);
    assert_eq!(
        response.value()["error"]["code"],
        "LLM_MALFORMED_RESPONSE"
    );
    Ok(())
}
