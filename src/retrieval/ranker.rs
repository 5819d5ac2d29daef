// ABOUTME: Relevance ranker scoring candidate statements against a query
// ABOUTME: Embeds statements and query, ranks by cosine similarity, keeps top k
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

//! Relevance ranking
//!
//! The candidate texts go to the embedding provider in one batched call
//! and the query in a second call, issued together. Scores are cosine
//! similarities; the top `k` statements come back in descending score
//! order with exact ties keeping their assembly order.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::assembler::FlatStatement;
use crate::embedding::EmbeddingProvider;
use crate::errors::{AppError, AppResult};

/// Guard against division by zero for all-zero vectors
const COSINE_EPSILON: f64 = 1e-10;

/// A candidate statement with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredStatement {
    /// The ranked statement
    pub statement: FlatStatement,
    /// Cosine similarity against the query, higher is more relevant
    pub score: f64,
}

/// Ranks candidate statements by semantic closeness to a query
pub struct RelevanceRanker {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RelevanceRanker {
    /// Create a ranker using the given embedding provider
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Rank candidates against the query, returning the top `k`
    ///
    /// Exactly two embedding calls happen per invocation: one batch for
    /// the candidates and one for the query. `k` clamps to the candidate
    /// count. The result is sorted by descending score; equal scores
    /// keep their original candidate order.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error for an empty candidate list (the
    /// embedding provider is never called with zero inputs) and an
    /// embedding error when vectors cannot be obtained or disagree on
    /// dimensionality.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len(), k))]
    pub async fn rank(
        &self,
        candidates: Vec<FlatStatement>,
        query: &str,
        k: usize,
    ) -> AppResult<Vec<ScoredStatement>> {
        if candidates.is_empty() {
            return Err(AppError::invalid_input(
                "cannot rank an empty candidate list",
            ));
        }

        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let (candidate_vectors, query_vector) = tokio::try_join!(
            self.embedder.embed_batch(&texts),
            self.embedder.embed_one(query),
        )?;

        if candidate_vectors.len() != candidates.len() {
            return Err(AppError::embedding_unavailable(format!(
                "expected {} vectors, provider returned {}",
                candidates.len(),
                candidate_vectors.len()
            )));
        }
        if let Some(first) = candidate_vectors.first() {
            if first.len() != query_vector.len() {
                return Err(AppError::embedding_unavailable(format!(
                    "candidate dimension {} does not match query dimension {}",
                    first.len(),
                    query_vector.len()
                )));
            }
        }

        let mut scored: Vec<ScoredStatement> = candidates
            .into_iter()
            .zip(candidate_vectors.iter())
            .map(|(statement, vector)| ScoredStatement {
                score: cosine_similarity(vector, &query_vector),
                statement,
            })
            .collect();

        // Stable sort: equal scores preserve assembly order
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let kept = k.min(scored.len());
        scored.truncate(kept);
        debug!(kept, "ranked candidate statements");
        Ok(scored)
    }
}

/// Cosine similarity between two vectors
///
/// Accumulates in f64 and adds a small epsilon to the denominator so an
/// all-zero vector scores 0 instead of dividing by zero. Vectors of
/// unequal length are not meaningful here; callers validate dimensions.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = f64::from(*x);
        let y = f64::from(*y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt() + COSINE_EPSILON)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use async_trait::async_trait;

    use super::*;
    use crate::errors::ErrorCode;
    use crate::retrieval::assembler::SourceLabel;

    #[test]
    fn test_cosine_of_identical_vectors_is_one() {
        let v = [0.6_f32, 0.8];
        let score = cosine_similarity(&v, &v);
        assert!((score - 1.0).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn test_cosine_of_orthogonal_vectors_is_zero() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(score.abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_cosine_of_opposite_vectors_is_negative_one() {
        let score = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((score + 1.0).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn test_cosine_of_zero_vector_is_zero_not_nan() {
        let score = cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
    }

    /// Deterministic embedder mapping exact texts to fixed vectors
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        query_vector: Vec<f32>,
        batch_calls: AtomicUsize,
        single_calls: AtomicUsize,
    }

    impl StubEmbedder {
        fn new(pairs: &[(&str, Vec<f32>)], query_vector: Vec<f32>) -> Self {
            Self {
                vectors: pairs
                    .iter()
                    .map(|(text, vector)| ((*text).to_owned(), vector.clone()))
                    .collect(),
                query_vector,
                batch_calls: AtomicUsize::new(0),
                single_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn display_name(&self) -> &'static str {
            "Stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
            self.batch_calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(texts
                .iter()
                .map(|text| {
                    self.vectors
                        .get(text)
                        .cloned()
                        .unwrap_or_else(|| vec![0.0, 1.0])
                })
                .collect())
        }

        async fn embed_one(&self, _text: &str) -> Result<Vec<f32>, AppError> {
            self.single_calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(self.query_vector.clone())
        }

        async fn health_check(&self) -> Result<bool, AppError> {
            Ok(true)
        }
    }

    fn statement(text: &str) -> FlatStatement {
        FlatStatement {
            source: SourceLabel::Meals,
            text: text.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_rank_orders_by_descending_similarity() {
        let embedder = Arc::new(StubEmbedder::new(
            &[
                ("far", vec![0.0, 1.0]),
                ("near", vec![1.0, 0.0]),
                ("middle", vec![0.7, 0.7]),
            ],
            vec![1.0, 0.0],
        ));
        let ranker = RelevanceRanker::new(embedder);

        let ranked = ranker
            .rank(
                vec![statement("far"), statement("near"), statement("middle")],
                "query",
                5,
            )
            .await
            .unwrap();

        let texts: Vec<&str> = ranked.iter().map(|s| s.statement.text.as_str()).collect();
        assert_eq!(texts, ["near", "middle", "far"]);
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
    }

    #[tokio::test]
    async fn test_rank_clamps_k_to_candidate_count() {
        let embedder = Arc::new(StubEmbedder::new(
            &[("a", vec![1.0, 0.0]), ("b", vec![0.5, 0.5])],
            vec![1.0, 0.0],
        ));
        let ranker = RelevanceRanker::new(embedder);

        let ranked = ranker
            .rank(vec![statement("a"), statement("b")], "query", 5)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 2);

        let embedder = Arc::new(StubEmbedder::new(
            &[("a", vec![1.0, 0.0]), ("b", vec![0.5, 0.5])],
            vec![1.0, 0.0],
        ));
        let ranker = RelevanceRanker::new(embedder);
        let ranked = ranker
            .rank(vec![statement("a"), statement("b")], "query", 1)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].statement.text, "a");
    }

    #[tokio::test]
    async fn test_rank_empty_candidates_never_calls_embedder() {
        let embedder = Arc::new(StubEmbedder::new(&[], vec![1.0, 0.0]));
        let ranker = RelevanceRanker::new(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>);

        let result = ranker.rank(Vec::new(), "query", 5).await;
        assert!(result.is_err());
        assert_eq!(embedder.batch_calls.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(embedder.single_calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rank_makes_exactly_two_embedding_calls() {
        let embedder = Arc::new(StubEmbedder::new(
            &[("a", vec![1.0, 0.0]), ("b", vec![0.0, 1.0])],
            vec![1.0, 0.0],
        ));
        let ranker = RelevanceRanker::new(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>);

        ranker
            .rank(vec![statement("a"), statement("b")], "query", 5)
            .await
            .unwrap();
        assert_eq!(embedder.batch_calls.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(embedder.single_calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rank_ties_preserve_assembly_order() {
        // Identical vectors produce exactly equal scores
        let embedder = Arc::new(StubEmbedder::new(
            &[
                ("first", vec![1.0, 0.0]),
                ("second", vec![1.0, 0.0]),
                ("third", vec![1.0, 0.0]),
            ],
            vec![1.0, 0.0],
        ));
        let ranker = RelevanceRanker::new(embedder);

        let ranked = ranker
            .rank(
                vec![statement("first"), statement("second"), statement("third")],
                "query",
                5,
            )
            .await
            .unwrap();
        let texts: Vec<&str> = ranked.iter().map(|s| s.statement.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_rank_rejects_dimension_mismatch_with_query() {
        let embedder = Arc::new(StubEmbedder::new(
            &[("a", vec![1.0, 0.0])],
            vec![1.0, 0.0, 0.0],
        ));
        let ranker = RelevanceRanker::new(embedder);

        let error = ranker
            .rank(vec![statement("a")], "query", 5)
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::EmbeddingUnavailable);
    }
}
