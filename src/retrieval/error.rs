use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Question embedding failed; retrieval cannot proceed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// The vector store rejected or failed the search.
    #[error(transparent)]
    Store(#[from] VectorDbError),
}

impl RetrievalError {
    /// Returns `true` if the failure means the backing store is unreachable
    /// or unusable, as opposed to a bad configuration or model problem.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, RetrievalError::Store(_))
    }
}
