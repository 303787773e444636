//! Quern library crate: retrieval-augmented question answering over a
//! local document corpus.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`AnswerSynthesizer`] - End-to-end question answering
//! - [`RetrievalOrchestrator`], [`RetrievalResult`] - Embed / search / rerank
//! - [`PipelineConfig`], [`ConfigError`] - Environment-backed configuration
//!
//! ## Models
//! - [`ModelRegistry`], [`RegistryConfig`], [`ModelSpec`] - Load-once model cache
//! - [`Embedder`], [`EmbeddingModel`] - Text embedding
//! - [`Reranker`], [`CrossEncoderModel`], [`ScoredChunk`] - Relevance scoring
//!
//! ## Vector Database
//! - [`QdrantSearchClient`], [`VectorSearchClient`] - Qdrant access
//! - [`Candidate`], [`ChunkRecord`] - Stored / retrieved chunk types
//!
//! ## Generation
//! - [`HttpLlmClient`], [`LlmClient`], [`GenerationParams`] - LLM endpoint
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod registry;
pub mod reranker;
pub mod retrieval;
pub mod vectordb;

pub use answer::{
    Answer, AnswerError, AnswerSynthesizer, GenerationError, GenerationParams, HttpLlmClient,
    LlmClient,
};
#[cfg(any(test, feature = "mock"))]
pub use answer::{FailingLlm, MockLlm};

pub use config::{ConfigError, PipelineConfig};
pub use embedding::{Embedder, EmbeddingError, EmbeddingModel};
pub use registry::{
    ModelDescriptor, ModelKind, ModelRegistry, ModelSource, ModelSpec, RegistryConfig,
    RegistryError,
};
pub use reranker::{CrossEncoderModel, Reranker, RerankerError, ScoredChunk, ScoringMethod};
pub use retrieval::{RetrievalConfig, RetrievalError, RetrievalOrchestrator, RetrievalResult};

#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorSearch;
pub use vectordb::{
    Candidate, ChunkRecord, QdrantSearchClient, VectorDbError, VectorSearchClient,
    similarity_to_distance,
};
