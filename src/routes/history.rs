// ABOUTME: History route handlers for weight, BMI, and nutrition aggregations
// ABOUTME: Streams history and meal sub-collections and reduces them to chart-ready series
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! History and aggregation routes
//!
//! These endpoints never call the LLM. They stream a user's `history` or
//! `meals` sub-collection and reduce it into the series the dashboard
//! charts expect. Documents with missing or unparseable timestamps are
//! skipped with a log line rather than failing the whole series; mobile
//! clients have written both Firestore timestamps and ISO strings over
//! time and one bad document must not blank a chart.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::constants::limits;
use crate::errors::AppError;
use crate::models::{FieldValue, Record};
use crate::resources::ServerResources;
use crate::store::{CollectionPath, StoredDocument};

/// One dated measurement for a chart series
#[derive(Debug, Serialize)]
pub struct MeasurementPoint {
    /// Measurement time, RFC 3339
    pub date: String,
    /// Measurement value
    #[serde(flatten)]
    pub value: MeasurementValue,
}

/// The measured quantity, keyed by its wire name
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementValue {
    /// Weight in kilograms
    Weight(f64),
    /// Body mass index
    Bmi(f64),
}

/// Chart series payload
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    /// Points sorted by date ascending
    pub data: Vec<MeasurementPoint>,
}

/// One meal's macros for the daily nutrition view
#[derive(Debug, Serialize)]
pub struct NutritionEntry {
    /// Calories in the meal
    pub calories: f64,
    /// Protein grams
    pub protein: f64,
    /// Carbohydrate grams
    pub carbs: f64,
    /// Fat grams
    pub fat: f64,
}

/// Daily nutrition payload
#[derive(Debug, Serialize)]
pub struct TodayNutritionResponse {
    /// Today's logged meals, unordered
    pub data: Vec<NutritionEntry>,
}

/// Yearly macro totals
#[derive(Debug, Serialize)]
pub struct MacroTotals {
    /// Total protein grams
    pub protein: f64,
    /// Total carbohydrate grams
    pub carbs: f64,
    /// Total fat grams
    pub fats: f64,
}

/// Macro history payload
///
/// `data` is null and `message` set when the year has no entries.
#[derive(Debug, Serialize)]
pub struct MacroHistoryResponse {
    /// Explanation when no entries exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Totals over the window
    pub data: Option<MacroTotals>,
}

/// One day's protein total
#[derive(Debug, Serialize)]
pub struct DailyProtein {
    /// Day, `YYYY-MM-DD`
    pub date: String,
    /// Total protein grams that day
    pub protein: f64,
}

/// Protein history payload
#[derive(Debug, Serialize)]
pub struct ProteinHistoryResponse {
    /// Daily totals sorted by date ascending
    pub data: Vec<DailyProtein>,
}

/// History routes handler
pub struct HistoryRoutes;

impl HistoryRoutes {
    /// Create all history and aggregation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/user/weight/:user_id", get(Self::weight_history))
            .route("/api/user/:user_id/bmiGraph", get(Self::bmi_history))
            .route(
                "/api/user/todayNutrition/:user_id",
                get(Self::today_nutrition),
            )
            .route("/api/user/macroHistory/:user_id", get(Self::macro_history))
            .route(
                "/api/user/proteinHistory/:user_id",
                get(Self::protein_history),
            )
            .with_state(resources)
    }

    /// Weight measurements over time
    async fn weight_history(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<SeriesResponse>, AppError> {
        let documents = stream_subcollection(&resources, &user_id, "history").await?;
        Ok(Json(SeriesResponse {
            data: measurement_series(&documents, "weight", MeasurementValue::Weight),
        }))
    }

    /// BMI measurements over time
    async fn bmi_history(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<SeriesResponse>, AppError> {
        let documents = stream_subcollection(&resources, &user_id, "history").await?;
        Ok(Json(SeriesResponse {
            data: measurement_series(&documents, "bmi", MeasurementValue::Bmi),
        }))
    }

    /// Today's logged meals (UTC day window)
    async fn today_nutrition(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<TodayNutritionResponse>, AppError> {
        let documents = stream_subcollection(&resources, &user_id, "meals").await?;

        let start_of_day = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let end_of_day = start_of_day + Duration::days(1);

        let data = documents
            .iter()
            .filter_map(|doc| {
                let timestamp = record_timestamp(&doc.record)?;
                if timestamp >= start_of_day && timestamp < end_of_day {
                    Some(NutritionEntry {
                        calories: number_or_zero(&doc.record, "cals"),
                        protein: number_or_zero(&doc.record, "protein"),
                        carbs: number_or_zero(&doc.record, "carbs"),
                        fat: number_or_zero(&doc.record, "fat"),
                    })
                } else {
                    None
                }
            })
            .collect();

        Ok(Json(TodayNutritionResponse { data }))
    }

    /// Macro totals over the trailing year
    async fn macro_history(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<MacroHistoryResponse>, AppError> {
        let documents = stream_subcollection(&resources, &user_id, "meals").await?;

        let today = Utc::now().date_naive();
        let window_start = today - Duration::days(limits::MACRO_HISTORY_DAYS);

        let mut protein = 0.0;
        let mut carbs = 0.0;
        let mut fats = 0.0;
        let mut entries = 0usize;

        for doc in &documents {
            let Some(timestamp) = record_timestamp(&doc.record) else {
                continue;
            };
            let date = timestamp.date_naive();
            if date >= window_start && date <= today {
                protein += number_or_zero(&doc.record, "protein");
                carbs += number_or_zero(&doc.record, "carbs");
                fats += number_or_zero(&doc.record, "fat");
                entries += 1;
            }
        }

        if entries == 0 {
            return Ok(Json(MacroHistoryResponse {
                message: Some("No entries found in the past year.".to_owned()),
                data: None,
            }));
        }

        Ok(Json(MacroHistoryResponse {
            message: None,
            data: Some(MacroTotals {
                protein: round2(protein),
                carbs: round2(carbs),
                fats: round2(fats),
            }),
        }))
    }

    /// Daily protein totals over the trailing month
    async fn protein_history(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<String>,
    ) -> Result<Json<ProteinHistoryResponse>, AppError> {
        let documents = stream_subcollection(&resources, &user_id, "meals").await?;

        let end = Utc::now();
        let start = end - Duration::days(limits::PROTEIN_HISTORY_DAYS);

        // BTreeMap keeps the YYYY-MM-DD keys sorted for free
        let mut daily: BTreeMap<String, f64> = BTreeMap::new();
        for doc in &documents {
            let Some(timestamp) = record_timestamp(&doc.record) else {
                debug!(doc_id = %doc.id, "skipping meal without usable timestamp");
                continue;
            };
            if timestamp < start || timestamp > end {
                continue;
            }
            let grams = number_or_zero(&doc.record, "protein");
            *daily
                .entry(timestamp.format("%Y-%m-%d").to_string())
                .or_insert(0.0) += grams;
        }

        let data = daily
            .into_iter()
            .map(|(date, protein)| DailyProtein {
                date,
                protein: round2(protein),
            })
            .collect();

        Ok(Json(ProteinHistoryResponse { data }))
    }
}

async fn stream_subcollection(
    resources: &Arc<ServerResources>,
    user_id: &str,
    name: &str,
) -> Result<Vec<StoredDocument>, AppError> {
    let path = CollectionPath::user_subcollection(user_id, name)?;
    resources.store.stream_collection(&path).await
}

/// Collect `(timestamp, value)` points for one field, sorted by time
fn measurement_series(
    documents: &[StoredDocument],
    field: &str,
    wrap: impl Fn(f64) -> MeasurementValue,
) -> Vec<MeasurementPoint> {
    let mut points: Vec<(DateTime<Utc>, f64)> = documents
        .iter()
        .filter_map(|doc| {
            let value = doc.record.get(field).and_then(FieldValue::as_f64)?;
            let Some(timestamp) = record_timestamp(&doc.record) else {
                debug!(doc_id = %doc.id, field, "skipping measurement without usable timestamp");
                return None;
            };
            Some((timestamp, value))
        })
        .collect();
    points.sort_by_key(|(timestamp, _)| *timestamp);

    points
        .into_iter()
        .map(|(timestamp, value)| MeasurementPoint {
            date: timestamp.to_rfc3339(),
            value: wrap(value),
        })
        .collect()
}

fn record_timestamp(record: &Record) -> Option<DateTime<Utc>> {
    record.get("timestamp").and_then(FieldValue::as_datetime)
}

fn number_or_zero(record: &Record, key: &str) -> f64 {
    record
        .get(key)
        .and_then(FieldValue::as_f64)
        .unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
