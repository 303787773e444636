use std::sync::Arc;

use super::config::{ModelSpec, RegistryConfig};
use super::{ModelKind, ModelRegistry, ModelSource, RegistryError};

fn stub_registry() -> ModelRegistry {
    ModelRegistry::new(RegistryConfig::stub())
}

fn offline_config() -> RegistryConfig {
    RegistryConfig {
        embedding: ModelSpec::pinned("sentence-transformers/all-MiniLM-L6-v2", "main"),
        reranking: ModelSpec::pinned("cross-encoder/ms-marco-MiniLM-L-6-v2", "main"),
        offline: true,
        ..RegistryConfig::default()
    }
}

#[test]
fn test_embedding_loaded_once() {
    let registry = stub_registry();

    let first = registry.embedding().unwrap();
    let second = registry.embedding().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.load_count(ModelKind::Embedding), 1);
}

#[test]
fn test_reranking_loaded_once() {
    let registry = stub_registry();

    registry.reranking().unwrap();
    registry.reranking().unwrap();
    registry.reranking().unwrap();

    assert_eq!(registry.load_count(ModelKind::Reranking), 1);
}

#[test]
fn test_kinds_load_independently() {
    let registry = stub_registry();

    registry.embedding().unwrap();
    assert_eq!(registry.load_count(ModelKind::Embedding), 1);
    assert_eq!(registry.load_count(ModelKind::Reranking), 0);
}

#[test]
fn test_reset_forces_reload() {
    let registry = stub_registry();

    registry.embedding().unwrap();
    registry.reset(ModelKind::Embedding);
    registry.embedding().unwrap();

    assert_eq!(registry.load_count(ModelKind::Embedding), 2);
}

#[test]
fn test_reset_all_clears_both_slots() {
    let registry = stub_registry();

    registry.embedding().unwrap();
    registry.reranking().unwrap();
    registry.reset_all();
    registry.embedding().unwrap();
    registry.reranking().unwrap();

    assert_eq!(registry.load_count(ModelKind::Embedding), 2);
    assert_eq!(registry.load_count(ModelKind::Reranking), 2);
}

#[test]
fn test_stub_descriptor_source() {
    let registry = stub_registry();

    let model = registry.embedding().unwrap();
    assert_eq!(model.descriptor().source, ModelSource::Stub);
    assert_eq!(model.descriptor().identifier(), "stub");
}

#[test]
fn test_offline_without_snapshot_is_unavailable() {
    let registry = ModelRegistry::new(offline_config());

    let err = registry.embedding().unwrap_err();
    assert!(matches!(
        err,
        RegistryError::ModelUnavailable {
            kind: ModelKind::Embedding,
            ..
        }
    ));
    assert!(err.is_unavailable());

    // A failed load caches nothing.
    assert_eq!(registry.load_count(ModelKind::Embedding), 0);
}

#[test]
fn test_offline_failure_does_not_stick() {
    let registry = ModelRegistry::new(offline_config());

    assert!(registry.reranking().is_err());
    assert!(registry.reranking().is_err());
    assert_eq!(registry.load_count(ModelKind::Reranking), 0);
}

#[test]
fn test_stub_wins_over_local_path() {
    let config = RegistryConfig {
        embedding: ModelSpec::stub().with_local_path("/nonexistent/snapshot"),
        offline: true,
        ..RegistryConfig::stub()
    };
    // testing_stub wins over local_path, so this still resolves to a stub.
    let registry = ModelRegistry::new(config);
    let model = registry.embedding().unwrap();
    assert!(model.is_stub());
}

#[test]
fn test_local_spec_missing_dir_offline_unavailable() {
    let config = RegistryConfig {
        embedding: ModelSpec::local("/nonexistent/snapshot"),
        offline: true,
        ..RegistryConfig::stub()
    };
    let registry = ModelRegistry::new(config);

    assert!(matches!(
        registry.embedding(),
        Err(RegistryError::ModelUnavailable { .. })
    ));
}

#[test]
fn test_concurrent_access_single_flight() {
    let registry = Arc::new(stub_registry());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.embedding().unwrap())
        })
        .collect();

    let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(registry.load_count(ModelKind::Embedding), 1);
    assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
}

#[test]
fn test_concurrent_cached_reads() {
    let registry = Arc::new(stub_registry());
    let loaded = registry.embedding().unwrap();

    // Post-load reads take the shared path; all must see the same handle
    // without triggering another load.
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.embedding().unwrap())
        })
        .collect();

    for handle in handles {
        let model = handle.join().unwrap();
        assert!(Arc::ptr_eq(&model, &loaded));
    }
    assert_eq!(registry.load_count(ModelKind::Embedding), 1);
}

#[test]
fn test_stub_outputs_stable_across_reset() {
    let registry = stub_registry();

    let before = registry.embedding().unwrap().embed("stable text").unwrap();
    registry.reset(ModelKind::Embedding);
    let after = registry.embedding().unwrap().embed("stable text").unwrap();

    assert_eq!(before, after);
}
