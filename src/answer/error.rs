use thiserror::Error;

use crate::retrieval::RetrievalError;

/// Failures talking to the generation endpoint.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The endpoint rejected the request or could not be reached.
    #[error("generation endpoint error: {reason}")]
    Endpoint { reason: String },

    /// The request exceeded the configured timeout.
    #[error("generation request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The endpoint replied, but not with a usable completion.
    #[error("malformed generation response: {reason}")]
    Malformed { reason: String },
}

/// Failures of the end-to-end answer pipeline.
///
/// Distinguishes the retrieval stage from the generation stage so callers
/// can tell a broken vector store from a broken LLM endpoint.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
