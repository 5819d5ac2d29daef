// ABOUTME: Conversational ask endpoint backed by per-user context retrieval
// ABOUTME: Combines chat history, retrieved personal data, and a focus hint into one prompt
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! The ask route
//!
//! `POST /api/ask` is the conversational core of the API: the caller
//! sends a question plus recent chat history, the server retrieves the
//! most relevant statements from the user's stored data, and the LLM
//! answers grounded in that context. When the user has no data the
//! sentinel context line still goes to the model, so the answer says so
//! honestly instead of failing.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::limits;
use crate::errors::AppError;
use crate::llm::{prompts, ChatMessage, ChatRequest};
use crate::resources::ServerResources;

/// Temperature for conversational answers: low for factual grounding
const ASK_TEMPERATURE: f32 = 0.2;

/// One prior turn of the conversation
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    /// Speaker role, e.g. "user" or "assistant"
    pub role: String,
    /// What was said
    pub content: String,
}

/// Request body for the ask endpoint
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// User whose data grounds the answer
    pub user_id: String,
    /// The new question
    pub query: String,
    /// Prior conversation turns, oldest first
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    /// Client hint for what the answer should focus on
    #[serde(rename = "type")]
    pub focus: String,
}

/// Response body for the ask endpoint
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// The generated answer, markdown formatted
    pub answer: String,
}

/// Ask routes handler
pub struct AskRoutes;

impl AskRoutes {
    /// Create the ask route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/ask", post(Self::ask))
            .with_state(resources)
    }

    /// Answer a question grounded in the user's retrieved data
    async fn ask(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<AskRequest>,
    ) -> Result<Json<AskResponse>, AppError> {
        let transcript = render_transcript(&request.history, limits::CHAT_HISTORY_WINDOW);

        let context = resources
            .retriever
            .retrieve(&request.user_id, &request.query)
            .await?;
        debug!(
            user_id = %request.user_id,
            has_data = context.has_data(),
            "retrieved context for ask"
        );

        let prompt = prompts::ask(
            &transcript,
            context.context_text(),
            &request.focus,
            &request.query,
        );
        let chat_request = ChatRequest::new(vec![
            ChatMessage::system(prompts::ASSISTANT_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(ASK_TEMPERATURE);

        let response = resources.chat.complete(&chat_request).await?;
        Ok(Json(AskResponse {
            answer: response.content,
        }))
    }
}

/// Render the most recent turns as "Role: content" lines
fn render_transcript(history: &[HistoryMessage], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|message| format!("{}: {}", capitalize(&message.role), message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
