// ABOUTME: Fitness intelligence layer with metric formulas and profile snapshots
// ABOUTME: Pure calculations plus typed views over schemaless profile records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Fitness intelligence
//!
//! Deterministic metric formulas (`metrics`) and typed snapshot views
//! over stored profile documents (`profile`). Everything here is
//! synchronous and side-effect free except [`profile::load_profile`],
//! which reads from the document store.

pub mod metrics;
pub mod profile;

pub use metrics::{ActivityLevel, bmi, bmr, maintenance_calories};
pub use profile::{BmiSnapshot, BmrSnapshot, CalorieSnapshot, HealthSummary, load_profile};
