// ABOUTME: Typed snapshot views over schemaless profile records
// ABOUTME: Resolves currentData-nested metrics and backfills derived values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Profile snapshots
//!
//! Profile documents vary: newer clients write metrics at the top level,
//! older ones nest them under a `currentData` map, and some store
//! numbers as strings. These snapshot types pull the fields each
//! endpoint needs through [`Record::current_field`] so route handlers
//! never touch raw records.

use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::models::{FieldValue, Record};
use crate::store::{DocumentPath, DocumentStore};

use super::metrics::{self, ActivityLevel};

/// Fetch a user's profile record, treating absent or empty as not found
///
/// # Errors
///
/// Returns a not-found error when the user has no profile document or
/// the document has no fields.
pub async fn load_profile(store: &Arc<dyn DocumentStore>, user_id: &str) -> AppResult<Record> {
    let path = DocumentPath::user(user_id)?;
    match store.get_document(&path).await? {
        Some(record) if !record.is_empty() => Ok(record),
        Some(_) => Err(AppError::not_found("user data")),
        None => Err(AppError::not_found("user")),
    }
}

fn number(record: &Record, key: &str) -> Option<f64> {
    record.current_field(key).and_then(FieldValue::as_f64)
}

fn text(record: &Record, key: &str) -> Option<String> {
    record.current_field(key).and_then(FieldValue::render)
}

/// Fields behind the BMI endpoint
#[derive(Debug, Clone)]
pub struct BmiSnapshot {
    /// Stored BMI value
    pub bmi: f64,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Stated fitness goal
    pub goal: Option<String>,
}

impl BmiSnapshot {
    /// Extract from a profile record
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no BMI is stored anywhere in the
    /// record.
    pub fn from_record(record: &Record) -> AppResult<Self> {
        let bmi = number(record, "bmi").ok_or_else(|| AppError::not_found("BMI"))?;
        Ok(Self {
            bmi,
            weight: number(record, "weight"),
            height: number(record, "height"),
            goal: text(record, "goal"),
        })
    }
}

/// Fields behind the BMR endpoint
#[derive(Debug, Clone)]
pub struct BmrSnapshot {
    /// Stored BMR value
    pub bmr: f64,
    /// Stated fitness goal
    pub goal: Option<String>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Self-reported gender
    pub gender: Option<String>,
    /// Age in years
    pub age: Option<f64>,
}

impl BmrSnapshot {
    /// Extract from a profile record
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no BMR is stored anywhere in the
    /// record.
    pub fn from_record(record: &Record) -> AppResult<Self> {
        let bmr = number(record, "bmr").ok_or_else(|| AppError::not_found("BMR"))?;
        Ok(Self {
            bmr,
            goal: text(record, "goal"),
            height: number(record, "height"),
            weight: number(record, "weight"),
            gender: text(record, "gender"),
            age: number(record, "age"),
        })
    }
}

/// Fields behind the required-calories and body-insights endpoints
#[derive(Debug, Clone)]
pub struct CalorieSnapshot {
    /// Stored daily maintenance calories
    pub maintenance_calories: f64,
    /// Stated fitness goal
    pub goal: Option<String>,
    /// Free-text explanation of the goal
    pub goal_explanation: Option<String>,
    /// Stored BMI value
    pub bmi: Option<f64>,
    /// Stored BMR value
    pub bmr: Option<f64>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Self-reported gender
    pub gender: Option<String>,
    /// Age in years
    pub age: Option<f64>,
    /// Body fat percentage
    pub body_fat: Option<f64>,
    /// Self-reported exercise intensity
    pub exercise_intensity: Option<String>,
}

impl CalorieSnapshot {
    /// Extract from a profile record
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no maintenance-calorie value is
    /// stored anywhere in the record.
    pub fn from_record(record: &Record) -> AppResult<Self> {
        let maintenance_calories = number(record, "maintenanceCalories")
            .ok_or_else(|| AppError::not_found("maintenance calories"))?;
        Ok(Self {
            maintenance_calories,
            goal: text(record, "goal"),
            goal_explanation: text(record, "explain_goal"),
            bmi: number(record, "bmi"),
            bmr: number(record, "bmr"),
            height: number(record, "height"),
            weight: number(record, "weight"),
            gender: text(record, "gender"),
            age: number(record, "age"),
            body_fat: number(record, "body_fat"),
            exercise_intensity: text(record, "exercise_intensity"),
        })
    }
}

/// Merged profile summary used for meal planning and meal ratings
///
/// Lenient by design: every field is optional and the derived metrics
/// (bmi, bmr, maintenance calories) backfill from raw measurements when
/// the stored value is missing.
#[derive(Debug, Clone)]
pub struct HealthSummary {
    /// Stated fitness goal
    pub goal: Option<String>,
    /// Free-text explanation of the goal
    pub goal_explanation: Option<String>,
    /// BMI, stored or computed from weight and height
    pub bmi: Option<f64>,
    /// BMR, stored or computed from weight, height and age
    pub bmr: Option<f64>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Self-reported gender
    pub gender: Option<String>,
    /// Maintenance calories, stored or computed from BMR and intensity
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
    pub required_intake: Option<f64>,
}

impl HealthSummary {
    /// Extract from a profile record, backfilling derived metrics
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let weight = number(record, "weight");
        let height = number(record, "height");
        let age = number(record, "age");
        let exercise_intensity = text(record, "exercise_intensity");

        let bmi = number(record, "bmi").or_else(|| match (weight, height) {
            (Some(w), Some(h)) => metrics::bmi(w, h).ok(),
            _ => None,
        });
        let bmr = number(record, "bmr").or_else(|| match (weight, height, age) {
            (Some(w), Some(h), Some(a)) => metrics::bmr(w, h, a).ok(),
            _ => None,
        });
        let maintenance_calories = number(record, "maintenanceCalories").or_else(|| {
            bmr.map(|value| {
                let activity = exercise_intensity
                    .as_deref()
                    .map(ActivityLevel::from_str_or_default)
                    .unwrap_or_default();
                metrics::maintenance_calories(value, activity)
            })
        });

        Self {
            goal: text(record, "goal"),
            goal_explanation: text(record, "explain_goal"),
            bmi,
            bmr,
            height,
            weight,
            gender: text(record, "gender"),
            maintenance_calories,
            complication: text(record, "any_complication"),
            body_type: text(record, "body_type"),
            diet: text(record, "diet"),
            age,
            budget: text(record, "budget"),
            exercise_intensity,
            required_intake: number(record, "req_cal_intake"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(value).unwrap()
    }

    #[test]
    fn test_bmi_snapshot_reads_top_level() {
        let snapshot = BmiSnapshot::from_record(&record(json!({
            "bmi": 22.9, "weight": 70, "height": 175, "goal": "fat loss"
        })))
        .unwrap();
        assert!((snapshot.bmi - 22.9).abs() < f64::EPSILON);
        assert_eq!(snapshot.goal.as_deref(), Some("fat loss"));
    }

    #[test]
    fn test_bmi_snapshot_falls_back_to_current_data() {
        let snapshot = BmiSnapshot::from_record(&record(json!({
            "currentData": {"bmi": 24.1, "weight": 80}
        })))
        .unwrap();
        assert!((snapshot.bmi - 24.1).abs() < f64::EPSILON);
        assert_eq!(snapshot.weight, Some(80.0));
    }

    #[test]
    fn test_bmi_snapshot_missing_is_not_found() {
        let error = BmiSnapshot::from_record(&record(json!({"weight": 70}))).unwrap_err();
        assert_eq!(error.code, crate::errors::ErrorCode::ResourceNotFound);
    }

    #[test]
    fn test_bmr_snapshot_coerces_string_numbers() {
        let snapshot = BmrSnapshot::from_record(&record(json!({
            "bmr": "1653.75", "age": "29"
        })))
        .unwrap();
        assert!((snapshot.bmr - 1653.75).abs() < f64::EPSILON);
        assert_eq!(snapshot.age, Some(29.0));
    }

    #[test]
    fn test_calorie_snapshot_requires_maintenance_value() {
        assert!(CalorieSnapshot::from_record(&record(json!({"bmr": 1650}))).is_err());
        let snapshot = CalorieSnapshot::from_record(&record(json!({
            "currentData": {"maintenanceCalories": 2563, "exercise_intensity": "medium"}
        })))
        .unwrap();
        assert!((snapshot.maintenance_calories - 2563.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.exercise_intensity.as_deref(), Some("medium"));
    }

    #[test]
    fn test_health_summary_backfills_derived_metrics() {
        let summary = HealthSummary::from_record(&record(json!({
            "weight": 70, "height": 175, "age": 29,
            "currentData": {"exercise_intensity": "medium"}
        })));
        // bmi = 70 / 1.75^2
        assert!((summary.bmi.unwrap() - 22.857).abs() < 0.01);
        // bmr = 10*70 + 6.25*175 - 5*29 + 5
        assert!((summary.bmr.unwrap() - 1653.75).abs() < 1e-9);
        // maintenance = bmr * 1.55
        assert!((summary.maintenance_calories.unwrap() - 2563.3125).abs() < 1e-9);
    }

    #[test]
    fn test_health_summary_prefers_stored_values() {
        let summary = HealthSummary::from_record(&record(json!({
            "weight": 70, "height": 175, "age": 29,
            "bmi": 25.0, "bmr": 1700.0, "maintenanceCalories": 2600.0
        })));
        assert_eq!(summary.bmi, Some(25.0));
        assert_eq!(summary.bmr, Some(1700.0));
        assert_eq!(summary.maintenance_calories, Some(2600.0));
    }

    #[test]
    fn test_health_summary_handles_sparse_records() {
        let summary = HealthSummary::from_record(&record(json!({"goal": "bulk"})));
        assert_eq!(summary.goal.as_deref(), Some("bulk"));
        assert_eq!(summary.bmi, None);
        assert_eq!(summary.maintenance_calories, None);
    }
}
