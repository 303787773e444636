use std::sync::Arc;

use super::keyword::overlap_score;
use super::model::CrossEncoderModel;
use super::types::ScoringMethod;
use super::Reranker;
use crate::registry::config::{ModelSpec, RegistryConfig};
use crate::registry::{ModelDescriptor, ModelKind, ModelRegistry, ModelSource};
use crate::vectordb::Candidate;

fn candidate(content: &str, distance: f32) -> Candidate {
    Candidate {
        content: content.to_string(),
        distance,
        doc_id: "doc-a".to_string(),
        chunk_index: 0,
    }
}

fn stub_reranker() -> Reranker {
    Reranker::new(Arc::new(ModelRegistry::new(RegistryConfig::stub())))
}

fn failing_reranker() -> Reranker {
    let registry = ModelRegistry::new(RegistryConfig::stub());
    registry.preload_reranking(CrossEncoderModel::failing(ModelDescriptor {
        kind: ModelKind::Reranking,
        source: ModelSource::Stub,
    }));
    Reranker::new(Arc::new(registry))
}

fn unavailable_reranker() -> Reranker {
    // Offline with no local snapshot: the registry cannot serve a model.
    let config = RegistryConfig {
        reranking: ModelSpec::pinned("cross-encoder/ms-marco-MiniLM-L-6-v2", "main"),
        offline: true,
        ..RegistryConfig::stub()
    };
    Reranker::new(Arc::new(ModelRegistry::new(config)))
}

#[test]
fn test_empty_candidates_empty_output() {
    let reranker = stub_reranker();
    assert!(reranker.score("any question", vec![]).is_empty());
}

#[test]
fn test_one_scored_chunk_per_candidate() {
    let reranker = stub_reranker();
    let candidates = vec![
        candidate("the capital of france is paris", 0.1),
        candidate("bananas are yellow", 0.2),
        candidate("paris hosts the louvre", 0.3),
    ];

    let scored = reranker.score("what is the capital of france", candidates);
    assert_eq!(scored.len(), 3);
}

#[test]
fn test_stub_ranks_relevant_chunk_first() {
    let reranker = stub_reranker();
    let candidates = vec![
        candidate("bananas are yellow fruit", 0.1),
        candidate("the capital of france is paris", 0.5),
    ];

    let scored = reranker.score("what is the capital of france", candidates);
    assert_eq!(scored[0].content(), "the capital of france is paris");
    assert_eq!(scored[0].scoring_method, ScoringMethod::CrossEncoder);
    assert!(scored[0].relevance_score > scored[1].relevance_score);
}

#[test]
fn test_predict_failure_degrades_whole_batch() {
    let reranker = failing_reranker();
    let candidates = vec![
        candidate("bananas are yellow fruit", 0.1),
        candidate("the capital of france is paris", 0.5),
    ];

    let scored = reranker.score("what is the capital of france", candidates);
    assert_eq!(scored.len(), 2);
    assert!(scored.iter().all(|c| c.is_degraded()));
    assert!(
        scored
            .iter()
            .all(|c| c.scoring_method == ScoringMethod::KeywordFallback)
    );
    // Lexical overlap still ranks the relevant chunk first.
    assert_eq!(scored[0].content(), "the capital of france is paris");
}

#[test]
fn test_model_unavailable_degrades_whole_batch() {
    let reranker = unavailable_reranker();
    let candidates = vec![
        candidate("the capital of france is paris", 0.1),
        candidate("bananas are yellow fruit", 0.2),
    ];

    let scored = reranker.score("what is the capital of france", candidates);
    assert_eq!(scored.len(), 2);
    assert!(scored.iter().all(|c| c.is_degraded()));
}

#[test]
fn test_ties_preserve_input_order() {
    let reranker = failing_reranker();
    // Identical content scores identically; the tie must keep the
    // distance-ascending input order.
    let candidates = vec![
        candidate("paris is the capital", 0.1),
        candidate("paris is the capital", 0.2),
        candidate("paris is the capital", 0.3),
    ];

    let scored = reranker.score("capital of france", candidates);
    assert_eq!(scored[0].distance(), 0.1);
    assert_eq!(scored[1].distance(), 0.2);
    assert_eq!(scored[2].distance(), 0.3);
}

#[test]
fn test_overlap_score_range() {
    let score = overlap_score("what is the capital of france", "paris is the capital of france");
    assert!((0.0..=1.0).contains(&score));

    let unrelated = overlap_score("what is the capital of france", "bananas are yellow");
    assert!(score > unrelated);
}

#[test]
fn test_overlap_score_stop_word_query() {
    // All stop words: falls back to the weak length-ratio signal.
    let score = overlap_score("is the a", "some candidate text");
    assert!((0.0..=0.3).contains(&score));
}

#[test]
fn test_overlap_score_case_insensitive() {
    let a = overlap_score("Capital of France", "the capital of france is paris");
    let b = overlap_score("capital of france", "the capital of france is paris");
    assert_eq!(a, b);
}
