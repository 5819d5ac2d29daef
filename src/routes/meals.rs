// ABOUTME: Meal route handlers for goal-aware meal ratings and one-day meal plans
// ABOUTME: Merges LLM rating output back into stored meal documents by document id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Meal routes
//!
//! Two LLM-backed views over the `meals` sub-collection: the latest
//! meals rated against the user's stated goal, and a generated one-day
//! meal plan derived from the health summary.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::limits;
use crate::errors::AppError;
use crate::intelligence::{load_profile, HealthSummary};
use crate::llm::{prompts, ChatMessage, ChatRequest};
use crate::models::FieldValue;
use crate::resources::ServerResources;
use crate::store::{CollectionPath, StoredDocument};
use crate::utils::json_extract;

const RATING_TEMPERATURE: f32 = 0.0;
const MEAL_PLAN_TEMPERATURE: f32 = 0.6;

/// Rating scale the prompt instructs the model to use
const RATING_SCALE: [&str; 4] = ["best", "good", "bad", "worst"];

/// One meal with its merged rating
#[derive(Debug, Serialize)]
pub struct RatedMeal {
    /// Source document id
    pub doc_id: String,
    /// Meal name as logged
    pub meal_name: String,
    /// Meal slot label (breakfast, lunch, ...)
    pub meal_time: Option<String>,
    /// Log time, RFC 3339
    pub timestamp: String,
    /// Calories in the meal
    pub cals: Option<f64>,
    /// Carbohydrate grams
    pub carbs: Option<f64>,
    /// Fat grams
    pub fats: Option<f64>,
    /// Protein grams
    pub protein: Option<f64>,
    /// Goal-aware rating, absent when the model skipped the meal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// Short reason for the rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_explain: Option<String>,
}

/// Rated meals payload
#[derive(Debug, Serialize)]
pub struct RatedMealsResponse {
    /// Latest meals, newest first
    pub data: Vec<RatedMeal>,
}

/// Generated one-day meal plan, passed through from the model
#[derive(Debug, Serialize, Deserialize)]
pub struct MealPlanResponse {
    /// Options per meal slot
    pub meal_plan: MealPlan,
    /// Macro totals across the day
    #[serde(default)]
    pub total_daily_macros: DailyMacros,
}

/// Food options per meal slot
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MealPlan {
    #[serde(default)]
    pub breakfast: Vec<String>,
    #[serde(default)]
    pub lunch: Vec<String>,
    #[serde(default)]
    pub snack: Vec<String>,
    #[serde(default)]
    pub dinner: Vec<String>,
    #[serde(default)]
    pub late_night_meal: Vec<String>,
}

/// Daily macro totals, kept as raw JSON since models emit both strings
/// and numbers here
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DailyMacros {
    #[serde(default)]
    pub calories: serde_json::Value,
    #[serde(default)]
    pub protein: serde_json::Value,
    #[serde(default)]
    pub carbs: serde_json::Value,
    #[serde(default)]
    pub fats: serde_json::Value,
}

/// One meal document pulled from the store
#[derive(Debug)]
struct MealDocument {
    doc_id: String,
    meal_name: String,
    meal_time: Option<String>,
    timestamp: DateTime<Utc>,
    cals: Option<f64>,
    carbs: Option<f64>,
    fats: Option<f64>,
    protein: Option<f64>,
}

/// One meal as rendered into the rating prompt
#[derive(Serialize)]
struct RatingPromptItem<'a> {
    doc_id: &'a str,
    meal_name: &'a str,
    protein: Option<f64>,
    carbs: Option<f64>,
    fats: Option<f64>,
    calories: Option<f64>,
}

/// One rating as returned by the model
#[derive(Debug, Deserialize)]
struct RatingItem {
    #[serde(default)]
    doc_id: String,
    #[serde(default)]
    rating: String,
    #[serde(default)]
    rating_explain: String,
}

/// Meal routes handler
pub struct MealRoutes;

impl MealRoutes {
    /// Create all meal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/user/meals/:user_id", get(Self::rated_meals))
            .route("/api/todayFood/:user_id", get(Self::today_food))
            .with_state(resources)
    }

    /// Latest meals rated against the user's goal
    async fn rated_meals(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<RatedMealsResponse>, AppError> {
        let path = CollectionPath::user_subcollection(&user_id, "meals")?;
        let documents = resources.store.stream_collection(&path).await?;
        let meals = latest_meals(documents);

        if meals.is_empty() {
            return Ok(Json(RatedMealsResponse { data: Vec::new() }));
        }

        let record = load_profile(&resources.store, &user_id).await?;
        let summary = HealthSummary::from_record(&record);

        let items: Vec<RatingPromptItem<'_>> = meals
            .iter()
            .map(|meal| RatingPromptItem {
                doc_id: &meal.doc_id,
                meal_name: &meal.meal_name,
                protein: meal.protein,
                carbs: meal.carbs,
                fats: meal.fats,
                calories: meal.cals,
            })
            .collect();
        let items_json = serde_json::to_string_pretty(&items)
            .map_err(|e| AppError::serialization(format!("meal items encode failed: {e}")))?;

        let prompt = prompts::meal_ratings(
            summary.goal.as_deref(),
            summary.goal_explanation.as_deref(),
            &items_json,
        );
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(RATING_TEMPERATURE);
        let response = resources.chat.complete(&request).await?;

        let ratings: Vec<RatingItem> = json_extract::decode_array(&response.content)?;
        let mut lookup = rating_lookup(ratings);

        let data = meals
            .into_iter()
            .map(|meal| {
                let (rating, rating_explain) = lookup.remove(&meal.doc_id).unzip();
                RatedMeal {
                    doc_id: meal.doc_id,
                    meal_name: meal.meal_name,
                    meal_time: meal.meal_time,
                    timestamp: meal.timestamp.to_rfc3339(),
                    cals: meal.cals,
                    carbs: meal.carbs,
                    fats: meal.fats,
                    protein: meal.protein,
                    rating,
                    rating_explain,
                }
            })
            .collect();

        Ok(Json(RatedMealsResponse { data }))
    }

    /// One-day meal plan generated from the health summary
    async fn today_food(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<MealPlanResponse>, AppError> {
        let record = load_profile(&resources.store, &user_id).await?;
        let summary = HealthSummary::from_record(&record);

        let request = ChatRequest::new(vec![ChatMessage::user(prompts::meal_plan(&summary))])
            .with_temperature(MEAL_PLAN_TEMPERATURE);
        let response = resources.chat.complete(&request).await?;

        let plan: MealPlanResponse = json_extract::decode_object(&response.content)?;
        Ok(Json(plan))
    }
}

/// Pick the newest rateable meals: named meals only, newest first,
/// capped at the rating limit. Meals without a usable timestamp sort
/// as oldest.
fn latest_meals(documents: Vec<StoredDocument>) -> Vec<MealDocument> {
    let mut meals: Vec<MealDocument> = documents
        .into_iter()
        .filter_map(|doc| {
            let meal_name = doc
                .record
                .get("meal_name")
                .and_then(FieldValue::as_str)
                .map(str::to_owned)?;
            let timestamp = doc
                .record
                .get("timestamp")
                .and_then(FieldValue::as_datetime)
                .unwrap_or(DateTime::UNIX_EPOCH);
            Some(MealDocument {
                meal_name,
                meal_time: doc
                    .record
                    .get("meal_time")
                    .and_then(FieldValue::as_str)
                    .map(str::to_owned),
                timestamp,
                cals: doc.record.get("cals").and_then(FieldValue::as_f64),
                carbs: doc.record.get("carbs").and_then(FieldValue::as_f64),
                fats: doc.record.get("fat").and_then(FieldValue::as_f64),
                protein: doc.record.get("protein").and_then(FieldValue::as_f64),
                doc_id: doc.id,
            })
        })
        .collect();
    meals.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    meals.truncate(limits::MEALS_RATING_LIMIT);
    meals
}

/// Index model ratings by document id, keeping only ratings on the
/// prompt's scale
fn rating_lookup(items: Vec<RatingItem>) -> HashMap<String, (String, String)> {
    let mut lookup = HashMap::new();
    for item in items {
        let rating = item.rating.trim().to_lowercase();
        if !RATING_SCALE.contains(&rating.as_str()) {
            debug!(doc_id = %item.doc_id, rating = %rating, "discarding off-scale meal rating");
            continue;
        }
        lookup.insert(item.doc_id, (rating, item.rating_explain.trim().to_owned()));
    }
    lookup
}
