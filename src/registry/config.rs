use std::path::PathBuf;

/// Where a model should be resolved from.
///
/// Resolution is offline-first: a local snapshot wins, the pinned remote
/// revision is only consulted when no local copy exists and offline mode is
/// not forced.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    /// Local snapshot directory (config.json, model.safetensors,
    /// tokenizer.json). Checked for existence only.
    pub local_path: Option<PathBuf>,
    /// Remote repository name, e.g. `sentence-transformers/all-MiniLM-L6-v2`.
    pub repo: String,
    /// Immutable revision (commit) the repository is pinned to.
    pub revision: String,
    /// If true, serve a deterministic stub instead of real weights.
    pub testing_stub: bool,
}

impl ModelSpec {
    /// Spec for a pinned remote model.
    pub fn pinned(repo: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            local_path: None,
            repo: repo.into(),
            revision: revision.into(),
            testing_stub: false,
        }
    }

    /// Spec resolving exclusively from a local snapshot directory.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: Some(path.into()),
            repo: String::new(),
            revision: String::new(),
            testing_stub: false,
        }
    }

    /// Stub spec (no files, no network; deterministic outputs).
    pub fn stub() -> Self {
        Self {
            local_path: None,
            repo: String::new(),
            revision: String::new(),
            testing_stub: true,
        }
    }

    /// Overrides the local snapshot path.
    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    /// Returns `true` if the local snapshot directory exists on disk.
    pub fn local_available(&self) -> bool {
        self.local_path.as_deref().is_some_and(|p| p.exists())
    }

    /// Returns `true` if a remote (repo, revision) pair is configured.
    pub fn remote_configured(&self) -> bool {
        !self.repo.is_empty() && !self.revision.is_empty()
    }
}

/// Registry construction parameters.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Embedding model source.
    pub embedding: ModelSpec,
    /// Reranking (cross-encoder) model source.
    pub reranking: ModelSpec,
    /// Forbid all network access; missing local copies fail fast.
    pub offline: bool,
    /// Output embedding dimension.
    pub embedding_dim: usize,
    /// Max tokens per embedded text.
    pub max_seq_len: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            embedding: ModelSpec::pinned(
                crate::constants::DEFAULT_EMBEDDING_REPO,
                crate::constants::DEFAULT_EMBEDDING_REVISION,
            ),
            reranking: ModelSpec::pinned(
                crate::constants::DEFAULT_RERANKER_REPO,
                crate::constants::DEFAULT_RERANKER_REVISION,
            ),
            offline: false,
            embedding_dim: crate::constants::DEFAULT_EMBEDDING_DIM,
            max_seq_len: crate::constants::DEFAULT_MAX_SEQ_LEN,
        }
    }
}

impl RegistryConfig {
    /// Config with both models stubbed (tests, demos without weights).
    pub fn stub() -> Self {
        Self {
            embedding: ModelSpec::stub(),
            reranking: ModelSpec::stub(),
            ..Default::default()
        }
    }
}
