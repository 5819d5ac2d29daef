// ABOUTME: Integration tests for the context retrieval pipeline end to end
// ABOUTME: Covers statement assembly, relevance ranking, failure isolation, and timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ournold

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::float_cmp,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::items_after_statements,
    clippy::uninlined_format_args
)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use ournold_server::config::RetrievalConfig;
use ournold_server::errors::{AppResult, ErrorCode};
use ournold_server::models::Record;
use ournold_server::retrieval::{ContextRetriever, RetrievedContext, SourceLabel};
use ournold_server::store::{
    CollectionPath, DocumentPath, DocumentStore, StoredDocument,
};

mod helpers;
use helpers::seed::{memory_store, seed_profile, seed_subdocument};
use helpers::stubs::{ScriptedStore, StubEmbedder};

fn retriever(store: Arc<dyn DocumentStore>, embedder: StubEmbedder, top_k: usize) -> ContextRetriever {
    ContextRetriever::new(
        store,
        Arc::new(embedder),
        RetrievalConfig {
            top_k,
            store_timeout_secs: 5,
            embedding_timeout_secs: 5,
        },
    )
}

fn document(id: &str, body: serde_json::Value) -> StoredDocument {
    StoredDocument {
        id: id.to_owned(),
        record: Record::from_json(body).unwrap(),
    }
}

// ============================================================================
// Assembly
// ============================================================================

#[tokio::test]
async fn test_single_profile_yields_exact_statement() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"name": "Alex", "weight": 70})).await?;

    let retriever = retriever(Arc::new(store), StubEmbedder::new(), 5);
    let outcome = retriever.retrieve("u1", "what do you know about me").await?;

    assert!(outcome.has_data());
    assert_eq!(
        outcome.context_text(),
        "User Profile → User name: Alex, weight: 70"
    );
    Ok(())
}

#[tokio::test]
async fn test_absent_profile_returns_no_data() -> Result<()> {
    let store = memory_store().await?;

    let retriever = retriever(Arc::new(store), StubEmbedder::new(), 5);
    let outcome = retriever.retrieve("ghost", "anything").await?;

    assert!(matches!(outcome, RetrievedContext::NoData));
    assert_eq!(outcome.context_text(), "No data found for this user.");
    Ok(())
}

#[tokio::test]
async fn test_all_three_sources_contribute_statements() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"name": "Alex", "weight": 70})).await?;
    seed_subdocument(
        &store,
        "u1",
        "history",
        "h1",
        json!({"weight": 71.2, "timestamp": "2025-05-01T08:00:00Z"}),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "m1",
        json!({"meal_name": "Oats", "protein": 20}),
    )
    .await?;

    let retriever = retriever(Arc::new(store), StubEmbedder::new(), 10);
    let outcome = retriever.retrieve("u1", "my weight and meals").await?;

    let RetrievedContext::Context { statements, .. } = outcome else {
        panic!("expected retrieved context");
    };
    assert_eq!(statements.len(), 3);
    for source in [SourceLabel::UserProfile, SourceLabel::History, SourceLabel::Meals] {
        assert!(
            statements.iter().any(|s| s.statement.source == source),
            "missing statement from {source}"
        );
    }
    Ok(())
}

// ============================================================================
// Ranking
// ============================================================================

#[tokio::test]
async fn test_top_ranked_statement_matches_query_topic() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"name": "Alex"})).await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "oats-1",
        json!({"meal_name": "Oats", "protein": 20}),
    )
    .await?;
    seed_subdocument(
        &store,
        "u1",
        "meals",
        "rice-1",
        json!({"meal_name": "Rice", "carbs": 50}),
    )
    .await?;

    let query = "How much protein is in my oats?";
    let embedder = StubEmbedder::new()
        .with_vector("User Profile → User name: Alex", vec![0.0, 0.0, 1.0])
        .with_vector("Meals → meal name: Oats, protein: 20", vec![1.0, 0.0, 0.0])
        .with_vector("Meals → meal name: Rice, carbs: 50", vec![0.0, 1.0, 0.0])
        .with_vector(query, vec![0.9, 0.1, 0.0]);

    let retriever = retriever(Arc::new(store), embedder, 2);
    let outcome = retriever.retrieve("u1", query).await?;

    let RetrievedContext::Context { text, statements } = outcome else {
        panic!("expected retrieved context");
    };
    // Two winners out of three candidates; the profile statement loses
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[0].statement.text,
        "Meals → meal name: Oats, protein: 20"
    );
    assert_eq!(
        statements[1].statement.text,
        "Meals → meal name: Rice, carbs: 50"
    );
    assert!(statements[0].score > statements[1].score);
    assert!(text.starts_with("Meals → meal name: Oats"));
    assert!(!text.contains("User Profile"));
    Ok(())
}

#[tokio::test]
async fn test_top_k_bounds_the_context() -> Result<()> {
    let store = memory_store().await?;
    seed_profile(&store, "u1", json!({"name": "Alex"})).await?;
    for day in 1..=6 {
        seed_subdocument(
            &store,
            "u1",
            "history",
            &format!("h{day}"),
            json!({"weight": 70.0 + f64::from(day), "timestamp": format!("2025-05-0{day}T08:00:00Z")}),
        )
        .await?;
    }

    let retriever = retriever(Arc::new(store), StubEmbedder::new(), 3);
    let outcome = retriever.retrieve("u1", "weight trend").await?;

    let RetrievedContext::Context { text, statements } = outcome else {
        panic!("expected retrieved context");
    };
    assert_eq!(statements.len(), 3);
    assert_eq!(text.lines().count(), 3);
    Ok(())
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_failing_subcollection_keeps_other_sources() -> Result<()> {
    let profile = Record::from_json(json!({"name": "Alex", "weight": 70})).unwrap();
    let store = ScriptedStore::new(Some(profile))
        .failing_collection("history")
        .with_collection(
            "meals",
            vec![document("m1", json!({"meal_name": "Oats", "protein": 20}))],
        );

    let retriever = retriever(Arc::new(store), StubEmbedder::new(), 10);
    let outcome = retriever.retrieve("u1", "what did I eat").await?;

    let RetrievedContext::Context { text, statements } = outcome else {
        panic!("expected retrieved context despite history failure");
    };
    assert_eq!(statements.len(), 2);
    assert!(text.contains("User Profile → User name: Alex, weight: 70"));
    assert!(text.contains("Meals → meal name: Oats, protein: 20"));
    Ok(())
}

#[tokio::test]
async fn test_profile_read_failure_is_an_error() {
    // An absent profile is NoData, but a failing profile read must surface
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        fn backend_name(&self) -> &'static str {
            "broken"
        }

        async fn get_document(&self, _path: &DocumentPath) -> AppResult<Option<Record>> {
            Err(ournold_server::errors::AppError::storage("disk on fire"))
        }

        async fn stream_collection(
            &self,
            _path: &CollectionPath,
        ) -> AppResult<Vec<StoredDocument>> {
            Ok(Vec::new())
        }
    }

    let retriever = retriever(Arc::new(BrokenStore), StubEmbedder::new(), 5);
    let error = retriever.retrieve("u1", "anything").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::StorageError);
}

// ============================================================================
// Timeouts
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_store_maps_to_data_unavailable() {
    struct SlowStore;

    #[async_trait]
    impl DocumentStore for SlowStore {
        fn backend_name(&self) -> &'static str {
            "slow"
        }

        async fn get_document(&self, _path: &DocumentPath) -> AppResult<Option<Record>> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn stream_collection(
            &self,
            _path: &CollectionPath,
        ) -> AppResult<Vec<StoredDocument>> {
            Ok(Vec::new())
        }
    }

    let retriever = retriever(Arc::new(SlowStore), StubEmbedder::new(), 5);
    let error = retriever.retrieve("u1", "anything").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::DataUnavailable);
}
