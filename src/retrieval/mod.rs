// ABOUTME: Context retrieval pipeline assembling and ranking user data statements
// ABOUTME: Entry point returning a bounded context string for LLM prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! # Context Retrieval
//!
//! Builds the per-query context that grounds chat answers in the user's
//! own data. Three stages, all fresh per request with nothing cached:
//!
//! 1. [`flatten`] collapses a document's nested maps into leaf fields.
//! 2. [`ContextAssembler`] renders the profile and the `history` and
//!    `meals` sub-collections into candidate statements.
//! 3. [`RelevanceRanker`] embeds candidates and query, scores them by
//!    cosine similarity and keeps the top `k`.
//!
//! [`ContextRetriever`] runs the stages under explicit timeouts and
//! joins the winning statements into one newline-separated context.

pub mod assembler;
pub mod flatten;
pub mod ranker;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::instrument;

pub use assembler::{ContextAssembler, FlatStatement, SourceLabel};
pub use flatten::{flatten, KEY_SEPARATOR};
pub use ranker::{cosine_similarity, RelevanceRanker, ScoredStatement};

use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::store::DocumentStore;

/// Sentinel shown when a user has no retrievable data
pub const NO_DATA_MESSAGE: &str = "No data found for this user.";

/// Outcome of a context retrieval
#[derive(Debug, Clone)]
pub enum RetrievedContext {
    /// Profile absent or nothing renderable: not an error
    NoData,
    /// Ranked context ready for prompting
    Context {
        /// Top statements joined with newlines
        text: String,
        /// The statements behind `text`, in descending score order
        statements: Vec<ScoredStatement>,
    },
}

impl RetrievedContext {
    /// The text to splice into a prompt
    ///
    /// `NoData` renders the sentinel line so the generator can tell the
    /// user honestly that nothing is on file.
    #[must_use]
    pub fn context_text(&self) -> &str {
        match self {
            Self::NoData => NO_DATA_MESSAGE,
            Self::Context { text, .. } => text,
        }
    }

    /// Whether any statements were retrieved
    #[must_use]
    pub const fn has_data(&self) -> bool {
        matches!(self, Self::Context { .. })
    }
}

/// Retrieves a bounded, query-relevant context for one user
pub struct ContextRetriever {
    assembler: ContextAssembler,
    ranker: RelevanceRanker,
    config: RetrievalConfig,
}

impl ContextRetriever {
    /// Create a retriever over the given store and embedding provider
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            assembler: ContextAssembler::new(store),
            ranker: RelevanceRanker::new(embedder),
            config,
        }
    }

    /// Retrieve the most relevant context statements for a query
    ///
    /// Store reads run under the configured store timeout and embedding
    /// calls under the embedding timeout, so one slow dependency cannot
    /// hold a request open indefinitely.
    ///
    /// # Errors
    ///
    /// Returns `DataUnavailable` when the store times out, a storage
    /// error when the profile read fails, and `EmbeddingUnavailable`
    /// when embeddings cannot be obtained in time.
    #[instrument(skip(self, query), fields(user_id = %user_id))]
    pub async fn retrieve(&self, user_id: &str, query: &str) -> AppResult<RetrievedContext> {
        let started = Instant::now();

        let store_timeout = Duration::from_secs(self.config.store_timeout_secs);
        let candidates = tokio::time::timeout(
            store_timeout,
            self.assembler.build_candidates(user_id),
        )
        .await
        .map_err(|_| {
            AppError::data_unavailable(format!(
                "document store did not answer within {}s",
                self.config.store_timeout_secs
            ))
        })??;

        if candidates.is_empty() {
            AppLogger::log_retrieval(user_id, 0, 0, elapsed_ms(started));
            return Ok(RetrievedContext::NoData);
        }
        let assembled = candidates.len();

        let embedding_timeout = Duration::from_secs(self.config.embedding_timeout_secs);
        let ranked = tokio::time::timeout(
            embedding_timeout,
            self.ranker.rank(candidates, query, self.config.top_k),
        )
        .await
        .map_err(|_| {
            AppError::embedding_unavailable(format!(
                "embedding provider did not answer within {}s",
                self.config.embedding_timeout_secs
            ))
        })??;

        let text = ranked
            .iter()
            .map(|s| s.statement.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        AppLogger::log_retrieval(user_id, assembled, ranked.len(), elapsed_ms(started));
        Ok(RetrievedContext::Context {
            text,
            statements: ranked,
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_renders_sentinel() {
        let outcome = RetrievedContext::NoData;
        assert_eq!(outcome.context_text(), "No data found for this user.");
        assert!(!outcome.has_data());
    }

    #[test]
    fn test_context_renders_joined_text() {
        let outcome = RetrievedContext::Context {
            text: "line one\nline two".to_owned(),
            statements: Vec::new(),
        };
        assert_eq!(outcome.context_text(), "line one\nline two");
        assert!(outcome.has_data());
    }
}
