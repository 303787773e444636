use thiserror::Error;

use super::ModelKind;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Neither a local snapshot nor the pinned remote revision could be
    /// resolved, or offline mode is set with no local copy.
    #[error("{kind} model unavailable: {reason}")]
    ModelUnavailable { kind: ModelKind, reason: String },

    /// A source was resolved but the weights/tokenizer failed to load.
    #[error("failed to load {kind} model: {reason}")]
    LoadFailed { kind: ModelKind, reason: String },
}

impl RegistryError {
    pub fn kind(&self) -> ModelKind {
        match self {
            RegistryError::ModelUnavailable { kind, .. }
            | RegistryError::LoadFailed { kind, .. } => *kind,
        }
    }

    /// Returns `true` for the unavailable (as opposed to corrupt-load) case.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RegistryError::ModelUnavailable { .. })
    }
}
