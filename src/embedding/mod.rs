//! Query/text embedding.
//!
//! [`Embedder`] is a thin wrapper over the registry-cached
//! [`EmbeddingModel`](model::EmbeddingModel); the first `embed` call
//! triggers the lazy model load, subsequent calls reuse the cached handle.

/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
pub mod model;
/// Tokenizer loading helpers.
pub mod utils;


pub use error::EmbeddingError;
pub use model::EmbeddingModel;

use std::sync::Arc;

use crate::registry::ModelRegistry;

/// Deterministic text-to-vector mapping backed by the registry.
#[derive(Clone)]
pub struct Embedder {
    registry: Arc<ModelRegistry>,
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Embedder {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Embeds a single text. Propagates registry failures untouched:
    /// a missing embedding model is fatal, never degraded.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = self.registry.embedding()?;
        model.embed(text)
    }

    /// Embeds a batch of texts, preserving input order. Produces vectors
    /// identical to calling [`Self::embed`] per text.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let model = self.registry.embedding()?;
        model.embed_batch(texts)
    }

    /// Output embedding dimension (loads the model if needed).
    pub fn dim(&self) -> Result<usize, EmbeddingError> {
        Ok(self.registry.embedding()?.dim())
    }
}
