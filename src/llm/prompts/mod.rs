// ABOUTME: Prompt templates for the coaching and meal-planning endpoints
// ABOUTME: Static system prompt loaded at compile time plus per-route builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Prompts
//!
//! Every LLM-backed route builds its prompt here, so all wording lives in
//! one place. The conversational system prompt is loaded at compile time
//! from a markdown file for easy maintenance; the rest are builders that
//! interpolate profile snapshots.
//!
//! Builders render missing optional fields as `unknown` rather than
//! omitting the line, so the model always sees the same structure.

use crate::intelligence::{BmiSnapshot, BmrSnapshot, CalorieSnapshot, HealthSummary};
use crate::models::FieldValue;

/// Ournold fitness assistant system prompt
///
/// Role, grounding rules, and answer style for the conversational
/// endpoint. Markdown so the prompt can be reviewed and edited without
/// touching code.
pub const ASSISTANT_SYSTEM_PROMPT: &str = include_str!("ournold_system.md");

/// Vision prompt for food photo analysis
///
/// The model must reply with bare JSON; the route returns the raw text
/// to the client unparsed.
pub const FOOD_IMAGE_PROMPT: &str = "Analyze this food image and quantity and return a JSON like: \
{\"food_name\":\"...\", \"total_calories\":..., \"protein_g\":..., \"carbs_g\":..., \"fat_g\":...} \
Just provide json as output and nothing else.";

/// One-shot prompt for the random fitness fact endpoint
pub const RANDOM_FACT_PROMPT: &str = "You are a fitness scientist. Tell me a fun fact that will \
blow my mind about fitness, health, food, or workouts. The fact can be historical, futuristic, \
or current. Be creative and correct.\n\n\
Give a short answer under 15 words.\n\n\
Return ONLY a JSON object and no other text:\n\
{\n    \"fact\": <string>\n}";

fn text(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}

fn number(value: Option<f64>) -> String {
    value
        .and_then(|n| FieldValue::Number(n).render())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Build the conversational prompt for the ask endpoint
///
/// Combines the recent conversation transcript, the retrieved personal
/// data context, the client's focus hint, and the new question.
#[must_use]
pub fn ask(history: &str, context: &str, focus: &str, question: &str) -> String {
    format!(
        "Conversation so far:\n{history}\n\n\
         User's personal data context:\n{context}\n\n\
         The context on which the answer should be based upon:\n{focus}\n\n\
         Now answer the user's new question:\n{question}\n\n\
         Be clear, short, and honest. Answer every question based on the user data. \
         Answer no personal questions like email address, phone number etc. \
         Also provide stylish markdown to improve answer presentation."
    )
}

/// Build the ideal-BMI prompt from a profile snapshot
#[must_use]
pub fn ideal_bmi(snapshot: &BmiSnapshot) -> String {
    format!(
        "You are a great fitness coach. Analyze the following person's fitness data \
         and provide a structured response.\n\n\
         Current data:\n\
         - Current BMI: {bmi}\n\
         - Current Weight: {weight}\n\
         - Current Height: {height}\n\
         - Current Goal: {goal}\n\n\
         Provide a JSON object:\n\
         {{\n    \"ideal_bmi\": <number>\n}}\n\n\
         IMPORTANT:\n\
         - Return ONLY valid JSON\n\
         - ideal_bmi should be a number, not a string",
        bmi = number(Some(snapshot.bmi)),
        weight = number(snapshot.weight),
        height = number(snapshot.height),
        goal = text(snapshot.goal.as_deref()),
    )
}

/// Build the BMR insight prompt from a profile snapshot
#[must_use]
pub fn bmr_insight(snapshot: &BmrSnapshot) -> String {
    format!(
        "You are a great fitness coach. Analyze the following person's data and \
         return structured JSON.\n\n\
         Data:\n\
         - Goal: {goal}\n\
         - BMR: {bmr}\n\
         - Height: {height} cm\n\
         - Weight: {weight} kg\n\
         - Gender: {gender}\n\
         - Age: {age}\n\n\
         Return:\n\
         {{\n    \"ai_response\": \"What can you determine by looking at BMR and goal \
         and other data. Just tell in one very short line under 10 words.\",\
         \n    \"ideal_bmr\": <number>\n}}",
        goal = text(snapshot.goal.as_deref()),
        bmr = number(Some(snapshot.bmr)),
        height = number(snapshot.height),
        weight = number(snapshot.weight),
        gender = text(snapshot.gender.as_deref()),
        age = number(snapshot.age),
    )
}

/// Build the required daily intake prompt from a calorie snapshot
#[must_use]
pub fn required_intake(snapshot: &CalorieSnapshot) -> String {
    format!(
        "You are a fitness expert.\n\n\
         Data:\n\
         - Goal: {goal}\n\
         - Maintenance Calorie: {maintenance}\n\
         - Height: {height}\n\
         - Weight: {weight}\n\
         - Gender: {gender}\n\
         - Age: {age}\n\
         - Exercise Intensity: {intensity}\n\n\
         Return JSON:\n\
         {{\n    \"req_intake\": <number>,\n    \"percent_chg\": <number>\n}}",
        goal = text(snapshot.goal.as_deref()),
        maintenance = number(Some(snapshot.maintenance_calories)),
        height = number(snapshot.height),
        weight = number(snapshot.weight),
        gender = text(snapshot.gender.as_deref()),
        age = number(snapshot.age),
        intensity = text(snapshot.exercise_intensity.as_deref()),
    )
}

/// Build the hidden body insights prompt from a calorie snapshot
#[must_use]
pub fn body_insights(snapshot: &CalorieSnapshot) -> String {
    format!(
        "You are a world-class fitness coach.\n\n\
         Based on this user's body data, generate 5 hidden, surprising, and highly \
         actionable insights about their fitness, metabolism, risks, strengths, or \
         workout strategy. Don't explain too much. Keep it crisp, honest, and fun \
         to read.\n\n\
         Data:\n\
         - Goal: {goal}\n\
         - Goal Explanation: {explanation}\n\
         - Height: {height}\n\
         - Weight: {weight}\n\
         - Gender: {gender}\n\
         - Age: {age}\n\
         - Body Fat %: {body_fat}\n\
         - Exercise Intensity: {intensity}\n\
         - Maintenance Calorie: {maintenance}\n\
         - BMI: {bmi}\n\
         - BMR: {bmr}\n\n\
         Remember that telling calories to burn today and body fat percentage is \
         compulsory.\n\n\
         Only return JSON. No explanation text.\n\n\
         Return this JSON format:\n\
         {{\n    \"insights\": [\
         \n        {{\
         \n            \"title\": \"<short title>\",\
         \n            \"description\": \"<crisp 1 line explanation, fun to read>\"\
         \n        }}\
         \n    ]\n}}",
        goal = text(snapshot.goal.as_deref()),
        explanation = text(snapshot.goal_explanation.as_deref()),
        height = number(snapshot.height),
        weight = number(snapshot.weight),
        gender = text(snapshot.gender.as_deref()),
        age = number(snapshot.age),
        body_fat = number(snapshot.body_fat),
        intensity = text(snapshot.exercise_intensity.as_deref()),
        maintenance = number(Some(snapshot.maintenance_calories)),
        bmi = number(snapshot.bmi),
        bmr = number(snapshot.bmr),
    )
}

/// Build the one-day meal plan prompt from a health summary
#[must_use]
pub fn meal_plan(summary: &HealthSummary) -> String {
    format!(
        "You are a certified nutrition expert.\n\n\
         Based on the user's data below, create a one-day meal plan with Breakfast, \
         Lunch, Snack, Dinner, and optional Late Night Meal.\n\n\
         ### USER DATA\n\
         - BMR: {bmr}\n\
         - Diet: {diet}\n\
         - Goal: {goal}\n\
         - Goal Explanation: {explanation}\n\
         - Exercise Intensity: {intensity}\n\
         - Health Complications: {complication}\n\
         - Monthly budget: {budget}\n\
         - Required Calorie intake per day: {intake}\n\n\
         ### REQUIREMENTS\n\
         - Each meal should have 2-4 food options as an array of strings.\n\
         - Each option must include macros (Calories, Protein, Carbs, Fats).\n\
         - Meals must align with the user's diet, BMR, goal, and activity level.\n\
         - Choose options that fit the monthly budget scaled down to a daily budget.\n\
         - Return ONLY valid JSON, no explanations or notes.\n\n\
         JSON OUTPUT STRUCTURE:\n\
         {{\n    \"meal_plan\": {{\
         \n        \"breakfast\": [\"Option 1: ... (Calories: ..., Protein: ..., Carbs: ..., Fats: ...)\", \"...\"],\
         \n        \"lunch\": [\"...\"],\
         \n        \"snack\": [\"...\"],\
         \n        \"dinner\": [\"...\"],\
         \n        \"late_night_meal\": [\"...\"]\
         \n    }},\
         \n    \"total_daily_macros\": {{\
         \n        \"calories\": \"...\",\
         \n        \"protein\": \"...\",\
         \n        \"carbs\": \"...\",\
         \n        \"fats\": \"...\"\
         \n    }}\n}}",
        bmr = number(summary.bmr),
        diet = text(summary.diet.as_deref()),
        goal = text(summary.goal.as_deref()),
        explanation = text(summary.goal_explanation.as_deref()),
        intensity = text(summary.exercise_intensity.as_deref()),
        complication = text(summary.complication.as_deref()),
        budget = text(summary.budget.as_deref()),
        intake = number(summary.required_intake),
    )
}

/// Build the goal-aware meal rating prompt
///
/// `items_json` is a pretty-printed JSON array of meal facts with
/// `doc_id` keys the route uses to merge ratings back.
#[must_use]
pub fn meal_ratings(goal: Option<&str>, goal_explanation: Option<&str>, items_json: &str) -> String {
    format!(
        "You are an expert sports nutritionist.\n\n\
         Rate how well each meal supports the user's stated goal.\n\n\
         For each meal, return an object with:\n\
         - \"doc_id\"\n\
         - \"rating\": one of [\"best\",\"good\",\"bad\",\"worst\"]\n\
         - \"rating_explain\": 5-8 word reason for your rating.\n\n\
         Rules:\n\
         1. High-protein meals are \"good\" or \"best\" for muscle gain or fat loss.\n\
         2. Extremely high calorie (>800 kcal) and high fat (>25g) meals are \"bad\" \
         or \"worst\" for fat loss goals.\n\
         3. Balanced macros (protein 20-40g, carbs 40-100g, fats <20g) are \"good\" \
         for most goals.\n\
         4. For \"weight gain\" or \"bulking\", high calories plus high protein can \
         be \"best\".\n\
         5. For \"weight loss\" or \"cutting\", low calorie plus high protein are \
         \"best\".\n\
         6. Be logical and consistent. Do not mark high-protein meals \"worst\" \
         unless calories or fats are extreme.\n\n\
         User Goal: {goal}\n\
         Goal Explanation: {explanation}\n\n\
         Meals:\n{items_json}\n\n\
         Return ONLY a valid JSON array like this:\n\
         [\n    {{\"doc_id\": \"abc123\", \"rating\": \"good\", \"rating_explain\": \"high protein, balanced macros\"}},\
         \n    {{\"doc_id\": \"def456\", \"rating\": \"worst\", \"rating_explain\": \"too high calories and fat\"}}\n]",
        goal = text(goal),
        explanation = text(goal_explanation),
    )
}
