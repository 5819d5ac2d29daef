// ABOUTME: Recovers structured JSON from chatty LLM responses
// ABOUTME: Window extraction between outermost braces or brackets plus typed decode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # JSON Extraction
//!
//! Models asked for "ONLY valid JSON" still wrap their answer in prose or
//! markdown fences often enough that every structured endpoint needs a
//! recovery path. The decoders here try the raw text first, then the
//! window between the first and last delimiter, and only then give up
//! with an [`ErrorCode::LlmMalformedResponse`](crate::errors::ErrorCode)
//! error. Raw model text is never passed off as parsed data.

use serde::de::DeserializeOwned;

use crate::errors::{AppError, AppResult};

/// Extract the window between the first `{` and the last `}`
///
/// Returns `None` when no balanced-looking window exists.
#[must_use]
pub fn extract_object(raw: &str) -> Option<&str> {
    extract_window(raw, '{', '}')
}

/// Extract the window between the first `[` and the last `]`
#[must_use]
pub fn extract_array(raw: &str) -> Option<&str> {
    extract_window(raw, '[', ']')
}

fn extract_window(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Decode an LLM response that should be a JSON object
///
/// # Errors
///
/// Returns an `LlmMalformedResponse` error when neither the raw text nor
/// the extracted object window parses as `T`.
pub fn decode_object<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    decode(raw, extract_object(raw))
}

/// Decode an LLM response that should be a JSON array
///
/// # Errors
///
/// Returns an `LlmMalformedResponse` error when neither the raw text nor
/// the extracted array window parses as `T`.
pub fn decode_array<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    decode(raw, extract_array(raw))
}

fn decode<T: DeserializeOwned>(raw: &str, window: Option<&str>) -> AppResult<T> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return Ok(value);
    }
    if let Some(window) = window {
        if let Ok(value) = serde_json::from_str::<T>(window.trim()) {
            return Ok(value);
        }
    }
    Err(AppError::llm_malformed(format!(
        "model output is not the expected JSON shape: {}",
        truncate_for_log(trimmed)
    )))
}

/// Cap raw model text embedded in error messages
fn truncate_for_log(raw: &str) -> String {
    const MAX: usize = 200;
    if raw.len() <= MAX {
        raw.to_owned()
    } else {
        let cut = raw
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}...", &raw[..cut])
    }
}
