// ABOUTME: Firestore REST backend decoding typed field values into records
// ABOUTME: Reads documents and collections via the v1 documents API with bearer auth
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Firestore document store implementation
//!
//! Talks to the Firestore v1 REST API directly. Authentication is a
//! bearer token supplied out of band via `FIRESTORE_BEARER_TOKEN`; when
//! `FIRESTORE_EMULATOR_HOST` is set the emulator is used and no token
//! is required.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{CollectionPath, DocumentPath, DocumentStore, StoredDocument};
use crate::errors::{AppError, AppResult};
use crate::models::{FieldValue, Record};

const API_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

/// Firestore-backed document store
#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    bearer_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

impl FirestoreStore {
    /// Create a store for the given project
    ///
    /// Reads `FIRESTORE_BEARER_TOKEN` and `FIRESTORE_EMULATOR_HOST`
    /// from the environment.
    ///
    /// # Errors
    ///
    /// Returns a config error when no token is set and no emulator
    /// host is configured.
    pub fn new(project_id: &str) -> AppResult<Self> {
        let emulator = std::env::var("FIRESTORE_EMULATOR_HOST").ok();
        let bearer_token = std::env::var("FIRESTORE_BEARER_TOKEN").ok();

        let base_url = emulator.as_ref().map_or_else(
            || API_BASE_URL.to_owned(),
            |host| format!("http://{host}/v1"),
        );

        if emulator.is_none() && bearer_token.is_none() {
            return Err(AppError::config_missing("FIRESTORE_BEARER_TOKEN"));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            project_id: project_id.to_owned(),
            bearer_token,
        })
    }

    /// Override the API base URL (used by tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn resource_url(&self, path: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{path}",
            self.base_url, self.project_id
        )
    }

    async fn get_json(&self, url: &str) -> AppResult<Option<Value>> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::storage(format!("firestore request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::storage(format!(
                "firestore returned {status}: {body}"
            )));
        }

        let value = response
            .json()
            .await
            .map_err(|e| AppError::storage(format!("firestore sent invalid JSON: {e}")))?;
        Ok(Some(value))
    }
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("bearer_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend_name(&self) -> &'static str {
        "firestore"
    }

    async fn get_document(&self, path: &DocumentPath) -> AppResult<Option<Record>> {
        let url = self.resource_url(path.as_str());
        match self.get_json(&url).await? {
            Some(value) => {
                let doc: FirestoreDocument = serde_json::from_value(value).map_err(|e| {
                    AppError::storage(format!("unexpected document shape at {path}: {e}"))
                })?;
                Ok(Some(decode_fields(&doc.fields)))
            }
            None => Ok(None),
        }
    }

    async fn stream_collection(&self, path: &CollectionPath) -> AppResult<Vec<StoredDocument>> {
        let base = self.resource_url(path.as_str());
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = page_token.as_ref().map_or_else(
                || format!("{base}?pageSize={PAGE_SIZE}"),
                |token| format!("{base}?pageSize={PAGE_SIZE}&pageToken={token}"),
            );

            // A missing parent lists as empty rather than failing
            let Some(value) = self.get_json(&url).await? else {
                return Ok(documents);
            };

            let page: ListResponse = serde_json::from_value(value).map_err(|e| {
                AppError::storage(format!("unexpected list shape at {path}: {e}"))
            })?;

            for doc in page.documents {
                let id = doc.name.rsplit('/').next().unwrap_or(&doc.name).to_owned();
                documents.push(StoredDocument {
                    id,
                    record: decode_fields(&doc.fields),
                });
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(documents),
            }
        }
    }
}

/// Decode a Firestore `fields` map into a record
fn decode_fields(fields: &serde_json::Map<String, Value>) -> Record {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

/// Decode one Firestore typed value
///
/// Firestore wraps every value in a single-key object naming its type,
/// with integers carried as strings.
fn decode_value(value: &Value) -> FieldValue {
    let Some(object) = value.as_object() else {
        warn!("firestore value is not an object, treating as null");
        return FieldValue::Null;
    };

    if object.contains_key("nullValue") {
        return FieldValue::Null;
    }
    if let Some(b) = object.get("booleanValue").and_then(Value::as_bool) {
        return FieldValue::Bool(b);
    }
    if let Some(raw) = object.get("integerValue") {
        // Sent as a string to survive 64-bit precision
        let parsed = raw
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| raw.as_f64());
        if let Some(n) = parsed {
            return FieldValue::Number(n);
        }
    }
    if let Some(n) = object.get("doubleValue").and_then(Value::as_f64) {
        return FieldValue::Number(n);
    }
    if let Some(s) = object.get("stringValue").and_then(Value::as_str) {
        return FieldValue::String(s.to_owned());
    }
    if let Some(s) = object.get("timestampValue").and_then(Value::as_str) {
        return DateTime::parse_from_rfc3339(s).map_or_else(
            |_| FieldValue::String(s.to_owned()),
            |dt| FieldValue::Timestamp(dt.with_timezone(&Utc)),
        );
    }
    if let Some(nested) = object.get("mapValue") {
        let fields = nested
            .get("fields")
            .and_then(Value::as_object)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), decode_value(v)))
                    .collect::<BTreeMap<String, FieldValue>>()
            })
            .unwrap_or_default();
        return FieldValue::Map(fields);
    }
    if let Some(nested) = object.get("arrayValue") {
        let items = nested
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect())
            .unwrap_or_default();
        return FieldValue::List(items);
    }
    if let Some(s) = object.get("referenceValue").and_then(Value::as_str) {
        return FieldValue::String(s.to_owned());
    }

    warn!(
        kinds = ?object.keys().collect::<Vec<_>>(),
        "unhandled firestore value kind, treating as null"
    );
    FieldValue::Null
}
