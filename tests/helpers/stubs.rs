// ABOUTME: Deterministic provider and store doubles for integration tests
// ABOUTME: Scripted chat replies, hashed bag-of-words embeddings, and failure-injecting storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use async_trait::async_trait;

use ournold_server::embedding::EmbeddingProvider;
use ournold_server::errors::{AppError, AppResult};
use ournold_server::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use ournold_server::models::Record;
use ournold_server::store::{CollectionPath, DocumentPath, DocumentStore, StoredDocument};

/// Chat double replaying scripted replies in order
///
/// Every request is recorded so tests can assert on the prompt a route
/// actually sent. An exhausted script fails the completion, which doubles
/// as the unavailable-provider case.
pub struct ScriptedChat {
    replies: Mutex<Vec<String>>,
    requests: Mutex<Vec<ChatRequest>>,
    capabilities: LlmCapabilities,
}

impl ScriptedChat {
    /// Vision-capable double with the given replies, first reply first
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| (*r).to_owned()).collect()),
            requests: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::full_featured(),
        }
    }

    /// Double without the vision capability
    pub fn text_only(replies: &[&str]) -> Self {
        Self {
            capabilities: LlmCapabilities::text_only(),
            ..Self::new(replies)
        }
    }

    /// Double whose script is already exhausted, so every call fails
    pub fn unavailable() -> Self {
        Self::new(&[])
    }

    /// Number of completions requested so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All message contents of request `index`, joined with newlines
    pub fn prompt(&self, index: usize) -> String {
        let requests = self.requests.lock().unwrap();
        requests[index]
            .messages
            .iter()
            .map(|message| message.content.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clone of request `index` for detailed assertions
    pub fn request(&self, index: usize) -> ChatRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedChat {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Chat"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["scripted-1"]
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| AppError::llm_unavailable("scripted reply queue is empty"))?;
        Ok(ChatResponse {
            content: reply,
            model: "scripted-1".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Embedding double producing deterministic vectors without a network
///
/// Texts hash token-by-token into a fixed number of buckets, so texts
/// sharing words land close under cosine similarity. Exact overrides pin
/// chosen texts to chosen vectors; a test using overrides must override
/// every text it embeds (including the query) with vectors of one length,
/// since the ranker rejects mixed dimensionalities.
pub struct StubEmbedder {
    overrides: HashMap<String, Vec<f32>>,
}

impl StubEmbedder {
    const DIMENSIONS: usize = 32;

    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Pin an exact text to an exact vector
    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.overrides.insert(text.to_owned(), vector);
        self
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        if let Some(vector) = self.overrides.get(text) {
            return vector.clone();
        }
        let mut vector = vec![0.0_f32; Self::DIMENSIONS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.len() > 2)
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % Self::DIMENSIONS;
            vector[bucket] += 1.0;
        }
        vector
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn display_name(&self) -> &'static str {
        "Stub Embeddings"
    }

    fn model(&self) -> &str {
        "stub-embed-1"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, AppError> {
        Ok(self.embed_text(text))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// Store double serving fixed documents with per-collection failure injection
///
/// Collections are keyed by their final path segment, so `history` and
/// `meals` reads can succeed and fail independently of each other.
pub struct ScriptedStore {
    profile: Option<Record>,
    collections: HashMap<String, Vec<StoredDocument>>,
    failing: Vec<String>,
}

impl ScriptedStore {
    pub fn new(profile: Option<Record>) -> Self {
        Self {
            profile,
            collections: HashMap::new(),
            failing: Vec::new(),
        }
    }

    /// Serve these documents for the named sub-collection
    pub fn with_collection(mut self, name: &str, documents: Vec<StoredDocument>) -> Self {
        self.collections.insert(name.to_owned(), documents);
        self
    }

    /// Make reads of the named sub-collection fail with a storage error
    pub fn failing_collection(mut self, name: &str) -> Self {
        self.failing.push(name.to_owned());
        self
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    async fn get_document(&self, _path: &DocumentPath) -> AppResult<Option<Record>> {
        Ok(self.profile.clone())
    }

    async fn stream_collection(&self, path: &CollectionPath) -> AppResult<Vec<StoredDocument>> {
        let name = path.as_str().rsplit('/').next().unwrap_or_default();
        if self.failing.iter().any(|failing| failing == name) {
            return Err(AppError::storage(format!(
                "scripted read failure for {name}"
            )));
        }
        Ok(self.collections.get(name).cloned().unwrap_or_default())
    }
}
