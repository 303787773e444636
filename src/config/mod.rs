//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `QUERN_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

use crate::answer::{GenerationError, GenerationParams, HttpLlmClient};
use crate::constants::{
    DEFAULT_CANDIDATE_POOL_SIZE, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_DIM,
    DEFAULT_LLM_ENDPOINT, DEFAULT_LLM_MAX_TOKENS, DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE,
    DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_MAX_SEQ_LEN, DEFAULT_QDRANT_URL, DEFAULT_TOP_K,
};
use crate::registry::config::{ModelSpec, RegistryConfig};
use crate::retrieval::RetrievalConfig;
use crate::vectordb::{QdrantSearchClient, VectorDbError};

/// Pipeline configuration loaded from environment variables.
///
/// Use [`PipelineConfig::from_env`] to read `QUERN_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Local snapshot directory for the embedding model.
    pub embedding_path: Option<PathBuf>,

    /// Local snapshot directory for the reranker model.
    pub reranker_path: Option<PathBuf>,

    /// Forbid all network access when resolving models. Default: `false`.
    pub offline: bool,

    /// Chunks returned per question. Default: `4`.
    pub top_k: usize,

    /// Candidates fetched before reranking. Default: `16`.
    pub candidate_pool_size: usize,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Qdrant collection holding the indexed chunks.
    pub collection_name: String,

    /// OpenAI-compatible generation endpoint base URL.
    pub llm_endpoint: String,

    /// Model name sent to the generation endpoint.
    pub llm_model: String,

    /// Generation request timeout, seconds. Default: `120`.
    pub llm_timeout_secs: u64,

    /// Completion token cap. Default: `1024`.
    pub llm_max_tokens: u32,

    /// Sampling temperature. Default: `0.2`.
    pub llm_temperature: f32,

    /// Canned answer that bypasses the whole pipeline when set.
    pub fixed_answer: Option<String>,

    /// Retrieval debug verbosity (0, 1, 2). Default: `0`.
    pub debug_level: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            embedding_path: None,
            reranker_path: None,
            offline: false,
            top_k: DEFAULT_TOP_K,
            candidate_pool_size: DEFAULT_CANDIDATE_POOL_SIZE,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            llm_max_tokens: DEFAULT_LLM_MAX_TOKENS,
            llm_temperature: DEFAULT_LLM_TEMPERATURE,
            fixed_answer: None,
            debug_level: 0,
        }
    }
}

impl PipelineConfig {
    const ENV_EMBEDDING_PATH: &'static str = "QUERN_EMBEDDING_PATH";
    const ENV_RERANKER_PATH: &'static str = "QUERN_RERANKER_PATH";
    const ENV_OFFLINE: &'static str = "QUERN_OFFLINE";
    const ENV_TOP_K: &'static str = "QUERN_TOP_K";
    const ENV_CANDIDATE_POOL: &'static str = "QUERN_CANDIDATE_POOL";
    const ENV_QDRANT_URL: &'static str = "QUERN_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "QUERN_COLLECTION";
    const ENV_LLM_ENDPOINT: &'static str = "QUERN_LLM_ENDPOINT";
    const ENV_LLM_MODEL: &'static str = "QUERN_LLM_MODEL";
    const ENV_LLM_TIMEOUT: &'static str = "QUERN_LLM_TIMEOUT";
    const ENV_LLM_MAX_TOKENS: &'static str = "QUERN_LLM_MAX_TOKENS";
    const ENV_LLM_TEMPERATURE: &'static str = "QUERN_LLM_TEMPERATURE";
    const ENV_FIXED_ANSWER: &'static str = "QUERN_FIXED_ANSWER";
    const ENV_DEBUG_LEVEL: &'static str = "QUERN_DEBUG_LEVEL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let top_k = Self::parse_usize_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let candidate_pool_size =
            Self::parse_usize_from_env(Self::ENV_CANDIDATE_POOL, defaults.candidate_pool_size)?;

        Ok(Self {
            embedding_path: Self::parse_optional_path_from_env(Self::ENV_EMBEDDING_PATH),
            reranker_path: Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH),
            offline: Self::parse_bool_from_env(Self::ENV_OFFLINE, defaults.offline),
            top_k,
            candidate_pool_size,
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            collection_name: Self::parse_string_from_env(
                Self::ENV_COLLECTION,
                defaults.collection_name,
            ),
            llm_endpoint: Self::parse_string_from_env(
                Self::ENV_LLM_ENDPOINT,
                defaults.llm_endpoint,
            ),
            llm_model: Self::parse_string_from_env(Self::ENV_LLM_MODEL, defaults.llm_model),
            llm_timeout_secs: Self::parse_u64_from_env(
                Self::ENV_LLM_TIMEOUT,
                defaults.llm_timeout_secs,
            ),
            llm_max_tokens: Self::parse_u32_from_env(
                Self::ENV_LLM_MAX_TOKENS,
                defaults.llm_max_tokens,
            ),
            llm_temperature: Self::parse_f32_from_env(
                Self::ENV_LLM_TEMPERATURE,
                defaults.llm_temperature,
            ),
            fixed_answer: Self::parse_optional_string_from_env(Self::ENV_FIXED_ANSWER),
            debug_level: Self::parse_u8_from_env(Self::ENV_DEBUG_LEVEL, defaults.debug_level),
        })
    }

    /// Validates basic invariants and local snapshot paths (does not create
    /// directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK { value: self.top_k });
        }

        if self.candidate_pool_size < self.top_k {
            return Err(ConfigError::InvalidValue {
                name: "candidate_pool_size",
                reason: format!(
                    "must be >= top_k ({}, got {})",
                    self.top_k, self.candidate_pool_size
                ),
            });
        }

        for path in [&self.embedding_path, &self.reranker_path].into_iter().flatten() {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Registry configuration derived from this config.
    pub fn registry_config(&self) -> RegistryConfig {
        let mut embedding = ModelSpec::pinned(
            crate::constants::DEFAULT_EMBEDDING_REPO,
            crate::constants::DEFAULT_EMBEDDING_REVISION,
        );
        if let Some(path) = &self.embedding_path {
            embedding = embedding.with_local_path(path);
        }

        let mut reranking = ModelSpec::pinned(
            crate::constants::DEFAULT_RERANKER_REPO,
            crate::constants::DEFAULT_RERANKER_REVISION,
        );
        if let Some(path) = &self.reranker_path {
            reranking = reranking.with_local_path(path);
        }

        RegistryConfig {
            embedding,
            reranking,
            offline: self.offline,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
        }
    }

    /// Retrieval stage configuration derived from this config.
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            collection: self.collection_name.clone(),
            top_k: self.top_k,
            candidate_pool_size: self.candidate_pool_size,
            debug_level: self.debug_level,
        }
    }

    /// Generation parameters derived from this config.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.llm_model.clone(),
            max_tokens: self.llm_max_tokens,
            temperature: self.llm_temperature,
        }
    }

    /// HTTP client for the configured generation endpoint and timeout.
    pub fn llm_client(&self) -> Result<HttpLlmClient, GenerationError> {
        HttpLlmClient::new(&self.llm_endpoint, self.llm_timeout_secs)
    }

    /// Qdrant client for the configured endpoint.
    pub async fn search_client(&self) -> Result<QdrantSearchClient, VectorDbError> {
        QdrantSearchClient::new(&self.qdrant_url).await
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name).ok().filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .ok()
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(default)
    }

    fn parse_usize_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(name) {
            Ok(value) => value.parse().map_err(|e| ConfigError::ParseError {
                name,
                value,
                source: e,
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_u32_from_env(var_name: &str, default: u32) -> u32 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    // Parsed as u8 so out-of-range values fall back instead of wrapping.
    fn parse_u8_from_env(var_name: &str, default: u8) -> u8 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_f32_from_env(var_name: &str, default: f32) -> f32 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
