// ABOUTME: Food tooling routes for image analysis, temp image cleanup, and macro guessing
// ABOUTME: Integrates Gemini vision, Cloudinary destroy, and Spoonacular guessNutrition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Food tooling routes
//!
//! The food logging flow on the client side: a photo is uploaded to
//! Cloudinary, analyzed here through the vision-capable chat provider,
//! and the temporary upload deleted afterwards. Manual entries go
//! through the Spoonacular nutrition guesser instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::constants::{defaults, env_config, limits};
use crate::errors::AppError;
use crate::llm::{prompts, ChatMessage, ChatRequest, ImageAttachment};
use crate::logging::AppLogger;
use crate::resources::ServerResources;
use crate::utils::http_client::{create_client_with_timeout, shared_client};

const SPOONACULAR_URL: &str = "https://api.spoonacular.com/recipes/guessNutrition";
const SPOONACULAR_TIMEOUT_SECS: u64 = 10;
const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

/// Query parameters for food image analysis
#[derive(Debug, Deserialize)]
pub struct AnalyzeFoodParams {
    /// Public URL of the uploaded food photo
    pub image_url: String,
}

/// Food image analysis payload
#[derive(Debug, Serialize)]
pub struct AnalyzeFoodResponse {
    /// Raw model output describing the food and its macros
    pub analysis: String,
}

/// Query parameters for temporary image deletion
#[derive(Debug, Deserialize)]
pub struct DeleteImageParams {
    /// Cloudinary public id of the upload
    pub public_id: String,
}

/// Temporary image deletion payload
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    pub status: String,
    pub message: String,
}

/// Request body for macro guessing
#[derive(Debug, Deserialize)]
pub struct MacrosRequest {
    /// Food or recipe name to look up
    pub name: String,
}

/// Macro guessing payload
///
/// Three shapes share this endpoint: a relayed upstream error, a
/// zero-confidence miss, and a hit. `found: false` tells the client
/// to fall back to manual entry.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MacrosResponse {
    /// Upstream returned a non-auth error; relay it instead of failing
    Relay {
        found: bool,
        error: String,
        details: String,
    },
    /// Guessed nutrition values (all zeros means not found)
    Nutrition {
        found: bool,
        name: String,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        confidence: Option<f64>,
    },
}

/// Food tooling routes handler
pub struct FoodRoutes;

impl FoodRoutes {
    /// Create all food tooling routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/analyze_food", post(Self::analyze_food))
            .route("/api/delete_temp_image", delete(Self::delete_temp_image))
            .route("/api/macros", post(Self::guess_macros))
            .with_state(resources)
    }

    /// Analyze a food photo with the vision-capable chat provider
    async fn analyze_food(
        State(resources): State<Arc<ServerResources>>,
        Query(params): Query<AnalyzeFoodParams>,
    ) -> Result<Json<AnalyzeFoodResponse>, AppError> {
        if !params.image_url.starts_with("https://") {
            return Err(AppError::invalid_input("image_url must be an https URL"));
        }
        if !resources.chat.capabilities().supports_vision() {
            return Err(AppError::config(
                "configured chat provider does not support image analysis",
            ));
        }

        let (mime_type, bytes) = download_image(&params.image_url).await?;

        let request = ChatRequest::new(vec![ChatMessage::user(prompts::FOOD_IMAGE_PROMPT)])
            .with_image(ImageAttachment::from_bytes(mime_type, &bytes));
        let response = resources.chat.complete(&request).await?;

        Ok(Json(AnalyzeFoodResponse {
            analysis: response.content,
        }))
    }

    /// Delete a temporary Cloudinary upload
    async fn delete_temp_image(
        State(_resources): State<Arc<ServerResources>>,
        Query(params): Query<DeleteImageParams>,
    ) -> Result<Json<DeleteImageResponse>, AppError> {
        let cloud_name = env_config::cloudinary_cloud_name()
            .ok_or_else(|| AppError::config_missing("CLOUDINARY_CLOUD_NAME"))?;
        let api_key = env_config::cloudinary_api_key()
            .ok_or_else(|| AppError::config_missing("CLOUDINARY_API_KEY"))?;
        let api_secret = env_config::cloudinary_api_secret()
            .ok_or_else(|| AppError::config_missing("CLOUDINARY_API_SECRET"))?;

        let timestamp = chrono::Utc::now().timestamp();
        let signature = destroy_signature(&params.public_id, timestamp, &api_secret);
        let url = format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/destroy");
        let form = [
            ("public_id", params.public_id.clone()),
            ("timestamp", timestamp.to_string()),
            ("api_key", api_key),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_owned()),
        ];

        let started = Instant::now();
        let result = shared_client().post(&url).form(&form).send().await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_external_call("cloudinary", "destroy", result.is_ok(), elapsed);

        let response = result
            .map_err(|e| AppError::external_service("cloudinary", e.to_string()))?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::external_service("cloudinary", e.to_string()))?;

        if response.get("result").and_then(serde_json::Value::as_str) == Some("ok") {
            Ok(Json(DeleteImageResponse {
                status: "success".to_owned(),
                message: "Temporary image deleted".to_owned(),
            }))
        } else {
            Err(AppError::invalid_input(format!(
                "Cloudinary deletion failed: {response}"
            )))
        }
    }

    /// Guess macros for a food name via Spoonacular
    async fn guess_macros(
        State(_resources): State<Arc<ServerResources>>,
        Json(body): Json<MacrosRequest>,
    ) -> Result<Json<MacrosResponse>, AppError> {
        let name = body.name.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::invalid_input("name is required"));
        }
        let api_key = env_config::spoonacular_api_key()
            .ok_or_else(|| AppError::config_missing("SPOONACULAR_API_KEY"))?;

        let started = Instant::now();
        let result = shared_client()
            .get(SPOONACULAR_URL)
            .query(&[("title", name.as_str()), ("apiKey", api_key.as_str())])
            .timeout(Duration::from_secs(SPOONACULAR_TIMEOUT_SECS))
            .send()
            .await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        AppLogger::log_external_call("spoonacular", "guessNutrition", result.is_ok(), elapsed);

        let response =
            result.map_err(|e| AppError::external_service("spoonacular", e.to_string()))?;
        let status = response.status();
        if status.as_u16() == 401 {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "spoonacular",
                format!("unauthorized: {detail}"),
            ));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, "Spoonacular lookup failed, relaying to client");
            return Ok(Json(MacrosResponse::Relay {
                found: false,
                error: format!("Spoonacular error: {}", status.as_u16()),
                details: detail,
            }));
        }

        let data = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::external_service("spoonacular", e.to_string()))?;

        let calories = nutrient_value(&data, "calories");
        let protein = nutrient_value(&data, "protein");
        let carbs = nutrient_value(&data, "carbs");
        let fat = nutrient_value(&data, "fat");
        let confidence = data.get("confidence").and_then(serde_json::Value::as_f64);

        let found = [calories, protein, carbs, fat]
            .iter()
            .any(|v| v.abs() > f64::EPSILON);
        Ok(Json(MacrosResponse::Nutrition {
            found,
            name,
            calories,
            protein,
            carbs,
            fat,
            confidence,
        }))
    }
}

/// Fetch the image and return its mime type and bytes
async fn download_image(image_url: &str) -> Result<(String, Vec<u8>), AppError> {
    let client = create_client_with_timeout(
        defaults::IMAGE_DOWNLOAD_TIMEOUT_SECS,
        defaults::IMAGE_DOWNLOAD_CONNECT_TIMEOUT_SECS,
    );
    let started = Instant::now();
    let result = client.get(image_url).send().await;
    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    AppLogger::log_external_call("image-host", "download", result.is_ok(), elapsed);

    let response = result.map_err(|e| AppError::external_service("image download", e.to_string()))?;
    if !response.status().is_success() {
        return Err(AppError::external_service(
            "image download",
            format!("status {}", response.status()),
        ));
    }

    let mime_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(FALLBACK_IMAGE_MIME)
        .to_owned();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::external_service("image download", e.to_string()))?;

    if bytes.len() < limits::MIN_IMAGE_BYTES {
        return Err(AppError::invalid_input(
            "downloaded image is too small or empty",
        ));
    }
    if bytes.len() > limits::MAX_IMAGE_BYTES {
        return Err(AppError::invalid_input("downloaded image is too large"));
    }

    Ok((mime_type, bytes.to_vec()))
}

/// Cloudinary request signature: SHA-256 over the sorted parameter
/// string with the API secret appended
fn destroy_signature(public_id: &str, timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("public_id={public_id}&timestamp={timestamp}{api_secret}");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pull one nutrient out of a guessNutrition payload
///
/// Values usually arrive as `{"value": 250.0, "unit": "kcal"}` but the
/// API has returned bare numbers and numeric strings too.
fn nutrient_value(data: &serde_json::Value, key: &str) -> f64 {
    let Some(node) = data.get(key) else {
        return 0.0;
    };
    let raw = if node.is_object() {
        node.get("value").unwrap_or(&serde_json::Value::Null)
    } else {
        node
    };
    raw.as_f64()
        .or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0.0)
}
