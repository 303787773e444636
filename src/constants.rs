//! Crate-wide defaults.
//!
//! Runtime values belong in [`crate::config::PipelineConfig`]; these are the
//! defaults it starts from.

/// Default output embedding dimension (all-MiniLM-L6-v2 hidden size).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Default max tokens fed to the embedding model.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Max sequence length for the cross-encoder (query + passage pair).
pub const CROSS_ENCODER_MAX_SEQ_LEN: usize = 512;

/// Default number of chunks returned per question.
pub const DEFAULT_TOP_K: usize = 4;

/// Default number of candidates overfetched for the reranker.
pub const DEFAULT_CANDIDATE_POOL_SIZE: usize = 16;

/// Default Qdrant collection holding indexed chunks.
pub const DEFAULT_COLLECTION_NAME: &str = "quern_chunks";

/// Default Qdrant endpoint (gRPC port).
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default embedding model repository.
pub const DEFAULT_EMBEDDING_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Pinned revision for [`DEFAULT_EMBEDDING_REPO`].
pub const DEFAULT_EMBEDDING_REVISION: &str = "e4ce9877abf3edfe10b0d82785e83bdcb973e22e";

/// Default reranking model repository.
pub const DEFAULT_RERANKER_REPO: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";

/// Pinned revision for [`DEFAULT_RERANKER_REPO`].
pub const DEFAULT_RERANKER_REVISION: &str = "a0a5a5b2e3f2930e6e541f479bdcbc6cdbf35f4f";

/// Default OpenAI-compatible completion endpoint.
pub const DEFAULT_LLM_ENDPOINT: &str = "http://localhost:11434/v1";

/// Default model name sent to the LLM endpoint.
pub const DEFAULT_LLM_MODEL: &str = "llama3.1:8b";

/// Default LLM request timeout in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Default token budget for generated answers.
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature for grounded answers.
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.2;
