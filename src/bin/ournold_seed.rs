// ABOUTME: Demo data seeder for local Ournold development and dashboard testing
// ABOUTME: Generates a realistic profile, weight history, and meal log in SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Demo data seeder for the Ournold server.
//!
//! Populates a SQLite document store with one demo user: a fitness
//! profile, a daily weight/BMI history, and a meal log spanning the
//! requested number of days (including today, so the daily-nutrition
//! endpoints have data).
//!
//! Usage:
//! ```bash
//! # Seed the default local database
//! cargo run --bin ournold-seed
//!
//! # Seed a specific database with 90 days of history
//! cargo run --bin ournold-seed -- --database-url sqlite:./data/demo.db --days 90
//! ```

use anyhow::{bail, Result};
use chrono::{Duration, NaiveTime, Utc};
use clap::Parser;
use ournold_server::config::environment::StoreUrl;
use ournold_server::constants::env_config;
use ournold_server::intelligence::{bmi, bmr, maintenance_calories, ActivityLevel};
use ournold_server::logging;
use ournold_server::models::Record;
use ournold_server::store::{CollectionPath, DocumentPath, SqliteStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;

/// Demo profile used as the seed baseline
const DEMO_WEIGHT_KG: f64 = 76.0;
const DEMO_HEIGHT_CM: f64 = 178.0;
const DEMO_AGE_YEARS: f64 = 28.0;

/// Command-line arguments
#[derive(Parser)]
#[command(
    name = "ournold-seed",
    about = "Ournold demo data seeder",
    long_about = "Populate a SQLite document store with a demo user profile, weight history, and meal log"
)]
struct SeedArgs {
    /// Database URL override (defaults to DATABASE_URL or the local file store)
    #[arg(long)]
    database_url: Option<String>,

    /// User id to seed
    #[arg(long, default_value = "demo-user")]
    user_id: String,

    /// Number of days of history to generate
    #[arg(long, default_value = "30")]
    days: i64,
}

/// One entry in the rotating demo meal plan
struct MealTemplate {
    name: &'static str,
    meal_time: &'static str,
    cals: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

const MEAL_TEMPLATES: &[MealTemplate] = &[
    MealTemplate {
        name: "Oatmeal with whey and banana",
        meal_time: "breakfast",
        cals: 420.0,
        protein: 32.0,
        carbs: 58.0,
        fat: 7.0,
    },
    MealTemplate {
        name: "Scrambled eggs on toast",
        meal_time: "breakfast",
        cals: 380.0,
        protein: 24.0,
        carbs: 30.0,
        fat: 17.0,
    },
    MealTemplate {
        name: "Grilled chicken with rice",
        meal_time: "lunch",
        cals: 640.0,
        protein: 48.0,
        carbs: 72.0,
        fat: 14.0,
    },
    MealTemplate {
        name: "Lentil curry with naan",
        meal_time: "lunch",
        cals: 710.0,
        protein: 26.0,
        carbs: 98.0,
        fat: 21.0,
    },
    MealTemplate {
        name: "Beef burrito bowl",
        meal_time: "lunch",
        cals: 780.0,
        protein: 42.0,
        carbs: 84.0,
        fat: 28.0,
    },
    MealTemplate {
        name: "Salmon with potatoes and greens",
        meal_time: "dinner",
        cals: 590.0,
        protein: 41.0,
        carbs: 45.0,
        fat: 24.0,
    },
    MealTemplate {
        name: "Paneer tikka with salad",
        meal_time: "dinner",
        cals: 520.0,
        protein: 28.0,
        carbs: 32.0,
        fat: 29.0,
    },
    MealTemplate {
        name: "Greek yogurt with berries",
        meal_time: "snack",
        cals: 210.0,
        protein: 18.0,
        carbs: 24.0,
        fat: 4.0,
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();
    logging::init_from_env()?;

    let url = args.database_url.unwrap_or_else(env_config::store_url);
    let store_url = StoreUrl::parse_url(&url)?;
    if !store_url.is_sqlite() {
        bail!("seeding requires a SQLite store URL, got {store_url}");
    }

    info!("Seeding demo data into {store_url}");
    let store = SqliteStore::new(&store_url.to_connection_string()).await?;

    seed_profile(&store, &args.user_id).await?;
    let history_docs = seed_history(&store, &args.user_id, args.days).await?;
    let meal_docs = seed_meals(&store, &args.user_id, args.days).await?;

    info!(
        "Seed complete: 1 profile, {history_docs} history documents, {meal_docs} meal documents for user {}",
        args.user_id
    );
    Ok(())
}

/// Write the demo profile with metrics consistent with the formulas
/// the server uses for backfill
async fn seed_profile(store: &SqliteStore, user_id: &str) -> Result<()> {
    let profile_bmi = bmi(DEMO_WEIGHT_KG, DEMO_HEIGHT_CM)?;
    let profile_bmr = bmr(DEMO_WEIGHT_KG, DEMO_HEIGHT_CM, DEMO_AGE_YEARS)?;
    let maintenance = maintenance_calories(profile_bmr, ActivityLevel::Medium);

    let record = Record::from_json(json!({
        "name": "Alex Demo",
        "email": "alex@ournold.dev",
        "currentData": {
            "age": DEMO_AGE_YEARS,
            "gender": "male",
            "height": DEMO_HEIGHT_CM,
            "weight": DEMO_WEIGHT_KG,
            "goal": "muscle gain",
            "explain_goal": "Add lean muscle while keeping body fat in check",
            "bmi": round2(profile_bmi),
            "bmr": round2(profile_bmr),
            "maintenanceCalories": round2(maintenance),
            "req_cal_intake": round2(maintenance + 300.0),
            "exercise_intensity": "medium",
            "diet": "high protein, no restrictions",
            "budget": "200 USD per month",
            "any_complication": "none",
            "body_type": "mesomorph",
        },
    }))?;

    store.upsert_document(&DocumentPath::user(user_id)?, &record).await?;
    info!("Seeded profile for {user_id}");
    Ok(())
}

/// Write one weight/BMI measurement per day with a slow upward trend
async fn seed_history(store: &SqliteStore, user_id: &str, days: i64) -> Result<usize> {
    let mut rng = StdRng::seed_from_u64(42);
    let collection = CollectionPath::user_subcollection(user_id, "history")?;
    let now = Utc::now();

    let mut written = 0usize;
    for day in (0..days).rev() {
        let offset = days - day;
        let weight = round1(DEMO_WEIGHT_KG - 1.5 + 0.05 * offset as f64 + rng.gen_range(-0.4..0.4));
        let timestamp = now - Duration::days(day);

        let record = Record::from_json(json!({
            "weight": weight,
            "bmi": round2(bmi(weight, DEMO_HEIGHT_CM)?),
            "timestamp": timestamp.to_rfc3339(),
        }))?;
        let path = collection.document(&format!("history-{offset:03}"))?;
        store.upsert_document(&path, &record).await?;
        written += 1;
    }

    info!("Seeded {written} history documents");
    Ok(written)
}

/// Write three meals per day (including today) from the rotating templates
async fn seed_meals(store: &SqliteStore, user_id: &str, days: i64) -> Result<usize> {
    let mut rng = StdRng::seed_from_u64(7);
    let collection = CollectionPath::user_subcollection(user_id, "meals")?;
    let today = Utc::now().date_naive();

    let slots: [(&str, u32); 3] = [("breakfast", 8), ("lunch", 13), ("dinner", 19)];

    let mut written = 0usize;
    for day in (0..days).rev() {
        let date = today - Duration::days(day);
        for (slot, hour) in slots {
            let template = pick_meal(&mut rng, slot);
            let time = NaiveTime::from_hms_opt(hour, 30, 0).unwrap_or(NaiveTime::MIN);
            let timestamp = date.and_time(time).and_utc();

            let record = Record::from_json(json!({
                "meal_name": template.name,
                "meal_time": template.meal_time,
                "cals": template.cals,
                "protein": template.protein,
                "carbs": template.carbs,
                "fat": template.fat,
                "timestamp": timestamp.to_rfc3339(),
            }))?;
            let path = collection.document(&format!("meal-{date}-{slot}"))?;
            store.upsert_document(&path, &record).await?;
            written += 1;
        }
    }

    info!("Seeded {written} meal documents");
    Ok(written)
}

/// Pick a template for the slot, falling back to any template when the
/// slot has no dedicated entries
fn pick_meal(rng: &mut StdRng, slot: &str) -> &'static MealTemplate {
    let matching: Vec<&'static MealTemplate> = MEAL_TEMPLATES
        .iter()
        .filter(|t| t.meal_time == slot)
        .collect();
    if matching.is_empty() {
        &MEAL_TEMPLATES[rng.gen_range(0..MEAL_TEMPLATES.len())]
    } else {
        matching[rng.gen_range(0..matching.len())]
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
