// ABOUTME: Random fitness fact route backed by a one-shot LLM prompt
// ABOUTME: Decodes the model's JSON object into a single fact string
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm::{prompts, ChatMessage, ChatRequest};
use crate::resources::ServerResources;
use crate::utils::json_extract;

const FACT_TEMPERATURE: f32 = 0.6;

/// Random fact payload
#[derive(Debug, Serialize, Deserialize)]
pub struct FactResponse {
    /// The generated fact, null when the model declined
    pub fact: Option<String>,
}

/// Fact routes handler
pub struct FactRoutes;

impl FactRoutes {
    /// Create the random fact route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/randomFact", get(Self::random_fact))
            .with_state(resources)
    }

    /// Generate one short fitness fact
    async fn random_fact(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Json<FactResponse>, AppError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompts::RANDOM_FACT_PROMPT)])
            .with_temperature(FACT_TEMPERATURE);
        let response = resources.chat.complete(&request).await?;

        let fact: FactResponse = json_extract::decode_object(&response.content)?;
        Ok(Json(fact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_decodes_from_prose_wrapped_json() {
        let raw = "Sure! {\"fact\": \"Your heart beats about 100,000 times a day.\"}";
        let fact: FactResponse = json_extract::decode_object(raw).unwrap();
        assert_eq!(
            fact.fact.as_deref(),
            Some("Your heart beats about 100,000 times a day.")
        );
    }

    #[test]
    fn test_fact_tolerates_null() {
        let fact: FactResponse = json_extract::decode_object("{\"fact\": null}").unwrap();
        assert!(fact.fact.is_none());
    }
}
