use thiserror::Error;

use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Registry could not serve the embedding model. Fatal: embedding never
    /// degrades, a missing query vector means retrieval cannot be trusted.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to load embedding model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid embedding configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl EmbeddingError {
    /// Returns `true` if the underlying cause is a registry
    /// `ModelUnavailable`.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, EmbeddingError::Registry(e) if e.is_unavailable())
    }
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
