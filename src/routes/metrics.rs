// ABOUTME: Profile metric route handlers for BMI, BMR, calorie targets, and body insights
// ABOUTME: Reads profile snapshots from the store and asks the LLM for coached values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Profile metric routes
//!
//! Each endpoint loads the user's profile, extracts the snapshot its
//! prompt needs, and decodes the model's structured JSON reply. The
//! health summary endpoint is the one store-only route: it returns the
//! merged profile view with derived metrics backfilled, no LLM call.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::intelligence::{
    load_profile, BmiSnapshot, BmrSnapshot, CalorieSnapshot, HealthSummary,
};
use crate::llm::{prompts, ChatMessage, ChatRequest};
use crate::resources::ServerResources;
use crate::utils::json_extract;

/// Temperature for metric analysis prompts
const METRIC_TEMPERATURE: f32 = 0.4;

/// Ideal BMI as judged by the model
#[derive(Debug, Serialize, Deserialize)]
pub struct IdealBmiResponse {
    /// Suggested ideal BMI, null when the model declined to commit
    pub ideal_bmi: Option<f64>,
}

/// BMR analysis reply
#[derive(Debug, Serialize, Deserialize)]
pub struct BmrInsightResponse {
    /// One-line reading of the BMR against the goal
    pub ai_response: Option<String>,
    /// Suggested ideal BMR
    pub ideal_bmr: Option<f64>,
}

/// Required daily intake reply
#[derive(Debug, Serialize, Deserialize)]
pub struct RequiredIntakeResponse {
    /// Recommended daily calorie intake
    pub req_intake: Option<f64>,
    /// Percent change versus maintenance
    pub percent_chg: Option<f64>,
}

/// One body insight card
#[derive(Debug, Serialize, Deserialize)]
pub struct Insight {
    /// Short headline
    pub title: String,
    /// One-line explanation
    pub description: String,
}

/// Body insights reply
#[derive(Debug, Serialize, Deserialize)]
pub struct BodyInsightsResponse {
    /// Insight cards, possibly empty
    #[serde(default)]
    pub insights: Vec<Insight>,
}

/// Merged profile summary in the wire shape the frontend expects
#[derive(Debug, Serialize)]
pub struct HealthSummaryResponse {
    /// Stated fitness goal
    pub goal: Option<String>,
    /// Free-text explanation of the goal
    pub exp_goal: Option<String>,
    /// BMI, stored or computed
    pub bmi: Option<f64>,
    /// BMR, stored or computed
    pub bmr: Option<f64>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Self-reported gender
    pub gender: Option<String>,
    /// Maintenance calories
    #[serde(rename = "mCal")]
    pub maintenance_calories: Option<f64>,
    /// Stated health complications
    pub complication: Option<String>,
    /// Self-assessed body type
    pub body_type: Option<String>,
    /// Dietary preference
    pub diet: Option<String>,
    /// Age in years
    pub age: Option<f64>,
    /// Monthly food budget
    pub budget: Option<String>,
    /// Self-reported exercise intensity
    pub exercise_intensity: Option<String>,
    /// Target daily calorie intake
    pub req_cal_intake: Option<f64>,
}

impl From<HealthSummary> for HealthSummaryResponse {
    fn from(summary: HealthSummary) -> Self {
        Self {
            goal: summary.goal,
            exp_goal: summary.goal_explanation,
            bmi: summary.bmi,
            bmr: summary.bmr,
            height: summary.height,
            weight: summary.weight,
            gender: summary.gender,
            maintenance_calories: summary.maintenance_calories,
            complication: summary.complication,
            body_type: summary.body_type,
            diet: summary.diet,
            age: summary.age,
            budget: summary.budget,
            exercise_intensity: summary.exercise_intensity,
            req_cal_intake: summary.required_intake,
        }
    }
}

/// Profile metric routes handler
pub struct MetricRoutes;

impl MetricRoutes {
    /// Create all profile metric routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/user/:user_id/bmi", get(Self::ideal_bmi))
            .route("/api/user/:user_id/bmr", get(Self::bmr_insight))
            .route("/api/user/reqCal/:user_id", get(Self::required_intake))
            .route("/api/user/bodyInsights/:user_id", get(Self::body_insights))
            .route("/api/user/healthSummary/:user_id", get(Self::health_summary))
            .with_state(resources)
    }

    /// Suggest an ideal BMI for the user's goal
    async fn ideal_bmi(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<IdealBmiResponse>, AppError> {
        let record = load_profile(&resources.store, &user_id).await?;
        let snapshot = BmiSnapshot::from_record(&record)?;

        let request = ChatRequest::new(vec![ChatMessage::user(prompts::ideal_bmi(
            &snapshot,
        ))])
        .with_temperature(METRIC_TEMPERATURE);
        let response = resources.chat.complete(&request).await?;

        Ok(Json(json_extract::decode_object(&response.content)?))
    }

    /// One-line BMR reading plus an ideal BMR value
    async fn bmr_insight(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<BmrInsightResponse>, AppError> {
        let record = load_profile(&resources.store, &user_id).await?;
        let snapshot = BmrSnapshot::from_record(&record)?;

        let request = ChatRequest::new(vec![ChatMessage::user(prompts::bmr_insight(
            &snapshot,
        ))])
        .with_temperature(METRIC_TEMPERATURE);
        let response = resources.chat.complete(&request).await?;

        Ok(Json(json_extract::decode_object(&response.content)?))
    }

    /// Recommended daily intake and its delta from maintenance
    async fn required_intake(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<RequiredIntakeResponse>, AppError> {
        let record = load_profile(&resources.store, &user_id).await?;
        let snapshot = CalorieSnapshot::from_record(&record)?;

        let request = ChatRequest::new(vec![ChatMessage::user(
            prompts::required_intake(&snapshot),
        )])
        .with_temperature(METRIC_TEMPERATURE);
        let response = resources.chat.complete(&request).await?;

        Ok(Json(json_extract::decode_object(&response.content)?))
    }

    /// Five surprising, actionable insights from the user's body data
    async fn body_insights(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<BodyInsightsResponse>, AppError> {
        let record = load_profile(&resources.store, &user_id).await?;
        let snapshot = CalorieSnapshot::from_record(&record)?;

        let request = ChatRequest::new(vec![ChatMessage::user(
            prompts::body_insights(&snapshot),
        )])
        .with_temperature(METRIC_TEMPERATURE);
        let response = resources.chat.complete(&request).await?;

        Ok(Json(json_extract::decode_object(&response.content)?))
    }

    /// Merged profile summary with derived metrics backfilled
    async fn health_summary(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<HealthSummaryResponse>, AppError> {
        let record = load_profile(&resources.store, &user_id).await?;
        let summary = HealthSummary::from_record(&record);
        Ok(Json(summary.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use serde_json::json;

    #[test]
    fn test_health_summary_wire_names() {
        let record = Record::from_json(json!({
            "goal": "cut",
            "explain_goal": "summer",
            "maintenanceCalories": 2400.0,
            "req_cal_intake": 1900.0
        }))
        .unwrap();
        let response = HealthSummaryResponse::from(HealthSummary::from_record(&record));
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(wire["exp_goal"], "summer");
        assert_eq!(wire["mCal"], 2400.0);
        assert_eq!(wire["req_cal_intake"], 1900.0);
        assert!(wire.get("maintenance_calories").is_none());
    }

    #[test]
    fn test_body_insights_default_empty() {
        let decoded: BodyInsightsResponse = serde_json::from_str("{}").unwrap();
        assert!(decoded.insights.is_empty());
    }
}
