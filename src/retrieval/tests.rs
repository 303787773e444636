use std::sync::Arc;

use super::{RetrievalConfig, RetrievalOrchestrator, RetrievalError};
use crate::embedding::Embedder;
use crate::registry::config::RegistryConfig;
use crate::registry::ModelRegistry;
use crate::reranker::Reranker;
use crate::vectordb::{ChunkRecord, MockVectorSearch, VectorSearchClient};

const TEST_COLLECTION: &str = "test_chunks";

fn config(top_k: usize, pool: usize) -> RetrievalConfig {
    RetrievalConfig {
        collection: TEST_COLLECTION.to_string(),
        top_k,
        candidate_pool_size: pool,
        debug_level: 0,
    }
}

async fn orchestrator_with_corpus(
    texts: &[(&str, &str)],
    config: RetrievalConfig,
) -> RetrievalOrchestrator<MockVectorSearch> {
    let registry = Arc::new(ModelRegistry::new(RegistryConfig::stub()));
    let embedder = Embedder::new(Arc::clone(&registry));
    let reranker = Reranker::new(registry);

    let dim = embedder.dim().unwrap();
    let search = MockVectorSearch::new();
    search
        .ensure_collection(TEST_COLLECTION, dim as u64)
        .await
        .unwrap();

    let chunks: Vec<ChunkRecord> = texts
        .iter()
        .enumerate()
        .map(|(i, (content, doc_id))| {
            let vector = embedder.embed(content).unwrap();
            ChunkRecord::new(i as u64, *content, *doc_id).with_vector(vector)
        })
        .collect();
    search.upsert_chunks(TEST_COLLECTION, chunks).await.unwrap();

    RetrievalOrchestrator::new(embedder, search, reranker, config)
}

#[tokio::test]
async fn test_retrieve_returns_at_most_top_k() {
    let corpus: Vec<(String, &str)> = (0..10)
        .map(|i| (format!("chunk number {i} about various topics"), "doc-a"))
        .collect();
    let refs: Vec<(&str, &str)> = corpus.iter().map(|(c, d)| (c.as_str(), *d)).collect();
    let orchestrator = orchestrator_with_corpus(&refs, config(3, 8)).await;

    let result = orchestrator.retrieve("chunk about topics").await.unwrap();
    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn test_retrieve_fewer_chunks_than_top_k() {
    let orchestrator =
        orchestrator_with_corpus(&[("only one chunk here", "doc-a")], config(4, 16)).await;

    let result = orchestrator.retrieve("one chunk").await.unwrap();
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_empty_store_short_circuits() {
    let orchestrator = orchestrator_with_corpus(&[], config(4, 16)).await;

    let result = orchestrator.retrieve("anything at all").await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.scoring_method(), None);
    assert!(!result.is_degraded());
}

#[tokio::test]
async fn test_relevant_chunk_ranked_first() {
    let orchestrator = orchestrator_with_corpus(
        &[
            ("bananas are a yellow fruit rich in potassium", "doc-a"),
            ("the capital of france is paris", "doc-b"),
            ("rust is a systems programming language", "doc-c"),
        ],
        config(2, 16),
    )
    .await;

    let result = orchestrator
        .retrieve("what is the capital of france")
        .await
        .unwrap();

    assert!(!result.is_empty());
    assert_eq!(
        result.chunks()[0].content(),
        "the capital of france is paris"
    );
}

#[tokio::test]
async fn test_chunks_sorted_by_relevance_descending() {
    let orchestrator = orchestrator_with_corpus(
        &[
            ("paris is the capital of france", "doc-a"),
            ("france is a country in europe", "doc-a"),
            ("completely unrelated banana content", "doc-a"),
        ],
        config(3, 16),
    )
    .await;

    let result = orchestrator.retrieve("capital of france").await.unwrap();
    let scores: Vec<f32> = result.iter().map(|c| c.relevance_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_doc_filter_restricts_results() {
    let orchestrator = orchestrator_with_corpus(
        &[
            ("paris facts from the geography document", "geo"),
            ("paris facts from the history document", "hist"),
        ],
        config(4, 16),
    )
    .await;

    let result = orchestrator
        .retrieve_in("paris facts", "hist")
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.chunks()[0].candidate.doc_id, "hist");
}

#[tokio::test]
async fn test_store_failure_is_retrieval_error() {
    let orchestrator =
        orchestrator_with_corpus(&[("some chunk", "doc-a")], config(4, 16)).await;
    orchestrator.search_client().set_unreachable(true);

    let err = orchestrator.retrieve("some question").await.unwrap_err();
    assert!(err.is_store_failure());
    assert!(matches!(err, RetrievalError::Store(_)));
}

#[tokio::test]
async fn test_pool_clamped_to_top_k() {
    // pool < top_k: the search limit is raised so top_k can be satisfied.
    let corpus: Vec<(String, &str)> = (0..6)
        .map(|i| (format!("searchable chunk {i}"), "doc-a"))
        .collect();
    let refs: Vec<(&str, &str)> = corpus.iter().map(|(c, d)| (c.as_str(), *d)).collect();
    let orchestrator = orchestrator_with_corpus(&refs, config(5, 2)).await;

    let result = orchestrator.retrieve("searchable chunk").await.unwrap();
    assert_eq!(result.len(), 5);
}
