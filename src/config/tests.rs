use serial_test::serial;
use std::env;

use super::{ConfigError, PipelineConfig};
use crate::constants::{DEFAULT_COLLECTION_NAME, DEFAULT_QDRANT_URL, DEFAULT_TOP_K};

fn clear_env() {
    for var in [
        "QUERN_EMBEDDING_PATH",
        "QUERN_RERANKER_PATH",
        "QUERN_OFFLINE",
        "QUERN_TOP_K",
        "QUERN_CANDIDATE_POOL",
        "QUERN_QDRANT_URL",
        "QUERN_COLLECTION",
        "QUERN_LLM_ENDPOINT",
        "QUERN_LLM_MODEL",
        "QUERN_LLM_TIMEOUT",
        "QUERN_LLM_MAX_TOKENS",
        "QUERN_LLM_TEMPERATURE",
        "QUERN_FIXED_ANSWER",
        "QUERN_DEBUG_LEVEL",
    ] {
        unsafe { env::remove_var(var) };
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let config = PipelineConfig::from_env().unwrap();

    assert_eq!(config.top_k, DEFAULT_TOP_K);
    assert_eq!(config.qdrant_url, DEFAULT_QDRANT_URL);
    assert_eq!(config.collection_name, DEFAULT_COLLECTION_NAME);
    assert!(!config.offline);
    assert!(config.fixed_answer.is_none());
    assert!(config.embedding_path.is_none());
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    unsafe {
        env::set_var("QUERN_TOP_K", "7");
        env::set_var("QUERN_CANDIDATE_POOL", "21");
        env::set_var("QUERN_QDRANT_URL", "http://qdrant:6334");
        env::set_var("QUERN_OFFLINE", "true");
        env::set_var("QUERN_FIXED_ANSWER", "pong");
    }

    let config = PipelineConfig::from_env().unwrap();
    assert_eq!(config.top_k, 7);
    assert_eq!(config.candidate_pool_size, 21);
    assert_eq!(config.qdrant_url, "http://qdrant:6334");
    assert!(config.offline);
    assert_eq!(config.fixed_answer.as_deref(), Some("pong"));

    clear_env();
}

#[test]
#[serial]
fn test_invalid_top_k_parse() {
    clear_env();
    unsafe { env::set_var("QUERN_TOP_K", "not_a_number") };

    let result = PipelineConfig::from_env();
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));

    clear_env();
}

#[test]
#[serial]
fn test_validate_rejects_zero_top_k() {
    clear_env();
    let config = PipelineConfig {
        top_k: 0,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTopK { value: 0 })
    ));
}

#[test]
#[serial]
fn test_validate_rejects_pool_smaller_than_top_k() {
    clear_env();
    let config = PipelineConfig {
        top_k: 8,
        candidate_pool_size: 4,
        ..PipelineConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
#[serial]
fn test_validate_rejects_missing_snapshot_dir() {
    clear_env();
    let config = PipelineConfig {
        embedding_path: Some("/nonexistent/snapshot".into()),
        ..PipelineConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));
}

#[test]
#[serial]
fn test_validate_accepts_existing_snapshot_dir() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        reranker_path: Some(dir.path().to_path_buf()),
        ..PipelineConfig::default()
    };
    config.validate().unwrap();
}

#[test]
#[serial]
fn test_debug_level_out_of_range_falls_back() {
    clear_env();
    unsafe { env::set_var("QUERN_DEBUG_LEVEL", "300") };
    // Does not fit in u8: fall back to the default rather than wrapping.
    let config = PipelineConfig::from_env().unwrap();
    assert_eq!(config.debug_level, 0);

    unsafe { env::set_var("QUERN_DEBUG_LEVEL", "2") };
    let config = PipelineConfig::from_env().unwrap();
    assert_eq!(config.debug_level, 2);

    clear_env();
}

#[test]
#[serial]
fn test_llm_client_uses_configured_endpoint() {
    clear_env();
    let config = PipelineConfig {
        llm_endpoint: "http://llm.internal:8000/v1/".to_string(),
        llm_timeout_secs: 5,
        ..PipelineConfig::default()
    };

    let client = config.llm_client().unwrap();
    assert_eq!(client.endpoint(), "http://llm.internal:8000/v1");
}

#[tokio::test]
#[serial]
async fn test_search_client_uses_configured_url() {
    clear_env();
    let config = PipelineConfig {
        qdrant_url: "http://qdrant.internal:6334".to_string(),
        ..PipelineConfig::default()
    };

    // Construction is lazy; no server is contacted until a request is made.
    let client = config.search_client().await.unwrap();
    assert_eq!(client.url(), "http://qdrant.internal:6334");
}

#[test]
#[serial]
fn test_derived_configs() {
    clear_env();
    let config = PipelineConfig {
        top_k: 3,
        candidate_pool_size: 12,
        collection_name: "my_chunks".to_string(),
        llm_model: "llama3.1:8b".to_string(),
        offline: true,
        ..PipelineConfig::default()
    };

    let registry = config.registry_config();
    assert!(registry.offline);
    assert!(registry.embedding.remote_configured());

    let retrieval = config.retrieval_config();
    assert_eq!(retrieval.top_k, 3);
    assert_eq!(retrieval.candidate_pool_size, 12);
    assert_eq!(retrieval.collection, "my_chunks");

    let params = config.generation_params();
    assert_eq!(params.model, "llama3.1:8b");
}
