// ABOUTME: Body metric calculations for BMI, BMR and maintenance calories
// ABOUTME: Backfills derived metrics when profile documents miss them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Body Metric Calculations
//!
//! Implements the derived metrics the clients expect on a profile.
//!
//! # Scientific References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting
//!   energy expenditure. *American Journal of Clinical Nutrition*, 51(2),
//!   241-247. <https://doi.org/10.1093/ajcn/51.2.241>

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Self-reported exercise intensity from the onboarding flow
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    /// No exercise
    #[default]
    No,
    /// Light exercise (1-3 days/week)
    Light,
    /// Moderate exercise (3-5 days/week)
    Medium,
    /// Regular hard exercise (6-7 days/week)
    Regular,
    /// Athlete or physically demanding routine
    Student,
}

impl ActivityLevel {
    /// Parse the stored intensity string, unknown values count as none
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "light" => Self::Light,
            "medium" => Self::Medium,
            "regular" => Self::Regular,
            "student" => Self::Student,
            _ => Self::No,
        }
    }

    /// TDEE multiplier applied to BMR
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::No => 1.2,
            Self::Light => 1.375,
            Self::Medium => 1.55,
            Self::Regular => 1.725,
            Self::Student => 1.9,
        }
    }
}

/// Body mass index from weight in kilograms and height in centimeters
///
/// # Errors
///
/// Returns an invalid input error for non-positive weight or height.
pub fn bmi(weight_kg: f64, height_cm: f64) -> AppResult<f64> {
    if weight_kg <= 0.0 {
        return Err(AppError::invalid_input("weight must be positive"));
    }
    if height_cm <= 0.0 {
        return Err(AppError::invalid_input("height must be positive"));
    }
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Basal metabolic rate via Mifflin-St Jeor
///
/// Uses the +5 constant across the board, matching what the clients
/// display today.
///
/// # Errors
///
/// Returns an invalid input error for non-positive weight, height or age.
pub fn bmr(weight_kg: f64, height_cm: f64, age_years: f64) -> AppResult<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return Err(AppError::invalid_input(
            "weight and height must be positive",
        ));
    }
    if age_years <= 0.0 {
        return Err(AppError::invalid_input("age must be positive"));
    }
    Ok(10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years + 5.0)
}

/// Daily maintenance calories from BMR and exercise intensity
#[must_use]
pub fn maintenance_calories(bmr_value: f64, activity: ActivityLevel) -> f64 {
    bmr_value * activity.multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_formula() {
        let value = bmi(70.0, 175.0).unwrap();
        assert!((value - 22.857).abs() < 0.01, "got {value}");
    }

    #[test]
    fn test_bmi_rejects_non_positive_inputs() {
        assert!(bmi(0.0, 175.0).is_err());
        assert!(bmi(70.0, -1.0).is_err());
    }

    #[test]
    fn test_bmr_formula() {
        // 10*70 + 6.25*175 - 5*29 + 5 = 1653.75
        let value = bmr(70.0, 175.0, 29.0).unwrap();
        assert!((value - 1653.75).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn test_bmr_rejects_non_positive_age() {
        assert!(bmr(70.0, 175.0, 0.0).is_err());
    }

    #[test]
    fn test_activity_multipliers() {
        assert!((ActivityLevel::No.multiplier() - 1.2).abs() < f64::EPSILON);
        assert!((ActivityLevel::Light.multiplier() - 1.375).abs() < f64::EPSILON);
        assert!((ActivityLevel::Medium.multiplier() - 1.55).abs() < f64::EPSILON);
        assert!((ActivityLevel::Regular.multiplier() - 1.725).abs() < f64::EPSILON);
        assert!((ActivityLevel::Student.multiplier() - 1.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_activity_falls_back_to_sedentary() {
        assert_eq!(
            ActivityLevel::from_str_or_default("couch"),
            ActivityLevel::No
        );
        assert_eq!(
            ActivityLevel::from_str_or_default("MEDIUM"),
            ActivityLevel::Medium
        );
    }

    #[test]
    fn test_maintenance_calories() {
        let value = maintenance_calories(1653.75, ActivityLevel::Medium);
        assert!((value - 2563.3125).abs() < 1e-9, "got {value}");
    }
}
