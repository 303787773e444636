//! Process-wide model registry.
//!
//! Guarantees each model kind is loaded at most once per process and served
//! from cache thereafter. Resolution is offline-first: a local snapshot
//! directory is used when present, otherwise the pinned remote revision is
//! fetched via the Hugging Face hub. Offline mode forbids the remote path,
//! failing fast with [`RegistryError::ModelUnavailable`] instead.
//!
//! The registry is an explicit, injectable object: construct it once at
//! process start and pass an `Arc` to every consumer. `reset` exists for
//! test isolation.

pub mod config;
mod error;

#[cfg(test)]
mod tests;

pub use config::{ModelSpec, RegistryConfig};
pub use error::RegistryError;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::embedding::model::EmbeddingModel;
use crate::reranker::model::CrossEncoderModel;

/// Which model a registry slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Embedding,
    Reranking,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Embedding => write!(f, "embedding"),
            ModelKind::Reranking => write!(f, "reranking"),
        }
    }
}

/// Where a loaded model actually came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Loaded from a pre-baked snapshot directory, no network involved.
    LocalSnapshot(PathBuf),
    /// Downloaded (or served from the hub cache) at a pinned revision.
    RemoteRevision { repo: String, revision: String },
    /// Deterministic stub, no weights.
    Stub,
}

/// Identity of a loaded model: kind plus resolved source.
///
/// Only the registry constructs these; consumers obtain them through the
/// model accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub kind: ModelKind,
    pub source: ModelSource,
}

impl ModelDescriptor {
    /// Stable identifier for logs: path, `repo@revision`, or `stub`.
    pub fn identifier(&self) -> String {
        match &self.source {
            ModelSource::LocalSnapshot(path) => path.display().to_string(),
            ModelSource::RemoteRevision { repo, revision } => format!("{repo}@{revision}"),
            ModelSource::Stub => "stub".to_string(),
        }
    }
}

struct Slot<T> {
    cell: RwLock<Option<Arc<T>>>,
    loads: AtomicUsize,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            cell: RwLock::new(None),
            loads: AtomicUsize::new(0),
        }
    }
}

impl<T> Slot<T> {
    /// Cached handle, taking only the shared read lock.
    fn cached(&self) -> Option<Arc<T>> {
        self.cell.read().as_ref().map(Arc::clone)
    }
}

/// Cache of loaded embedding and reranking models.
pub struct ModelRegistry {
    config: RegistryConfig,
    embedding: Slot<EmbeddingModel>,
    reranking: Slot<CrossEncoderModel>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("offline", &self.config.offline)
            .field("embedding_loads", &self.load_count(ModelKind::Embedding))
            .field("reranking_loads", &self.load_count(ModelKind::Reranking))
            .finish()
    }
}

impl ModelRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            embedding: Slot::default(),
            reranking: Slot::default(),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the cached embedding model, loading it on first use.
    ///
    /// Cached reads take only a shared read lock and run concurrently.
    /// First calls are single-flighted: the write lock is held across the
    /// load, so a second caller blocks until the first finishes and then
    /// receives the same handle. A failed load caches nothing.
    pub fn embedding(&self) -> Result<Arc<EmbeddingModel>, RegistryError> {
        if let Some(model) = self.embedding.cached() {
            return Ok(model);
        }

        let mut slot = self.embedding.cell.write();
        // Lost the race to another loader.
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        let kind = ModelKind::Embedding;
        let (source, snapshot) = self.resolve(kind, &self.config.embedding)?;
        let descriptor = ModelDescriptor { kind, source };

        let model = match snapshot {
            None => EmbeddingModel::stub(
                descriptor.clone(),
                self.config.embedding_dim,
                self.config.max_seq_len,
            ),
            Some(dir) => EmbeddingModel::load(
                &dir,
                descriptor.clone(),
                self.config.embedding_dim,
                self.config.max_seq_len,
            )
            .map_err(|e| RegistryError::LoadFailed {
                kind,
                reason: e.to_string(),
            })?,
        };

        info!(identifier = %descriptor.identifier(), "Embedding model loaded");

        let model = Arc::new(model);
        *slot = Some(Arc::clone(&model));
        self.embedding.loads.fetch_add(1, Ordering::Relaxed);
        Ok(model)
    }

    /// Returns the cached cross-encoder model, loading it on first use.
    ///
    /// Same single-flight and all-or-nothing semantics as [`Self::embedding`].
    pub fn reranking(&self) -> Result<Arc<CrossEncoderModel>, RegistryError> {
        if let Some(model) = self.reranking.cached() {
            return Ok(model);
        }

        let mut slot = self.reranking.cell.write();
        if let Some(model) = slot.as_ref() {
            return Ok(Arc::clone(model));
        }

        let kind = ModelKind::Reranking;
        let (source, snapshot) = self.resolve(kind, &self.config.reranking)?;
        let descriptor = ModelDescriptor { kind, source };

        let model = match snapshot {
            None => CrossEncoderModel::stub(descriptor.clone()),
            Some(dir) => CrossEncoderModel::load(&dir, descriptor.clone()).map_err(|e| {
                RegistryError::LoadFailed {
                    kind,
                    reason: e.to_string(),
                }
            })?,
        };

        info!(identifier = %descriptor.identifier(), "Reranking model loaded");

        let model = Arc::new(model);
        *slot = Some(Arc::clone(&model));
        self.reranking.loads.fetch_add(1, Ordering::Relaxed);
        Ok(model)
    }

    /// Clears one cache entry; the next accessor call reloads from scratch.
    pub fn reset(&self, kind: ModelKind) {
        match kind {
            ModelKind::Embedding => *self.embedding.cell.write() = None,
            ModelKind::Reranking => *self.reranking.cell.write() = None,
        }
        debug!(%kind, "Registry entry reset");
    }

    /// Clears both cache entries.
    pub fn reset_all(&self) {
        self.reset(ModelKind::Embedding);
        self.reset(ModelKind::Reranking);
    }

    /// Number of completed loads for a kind (test observability).
    pub fn load_count(&self, kind: ModelKind) -> usize {
        match kind {
            ModelKind::Embedding => self.embedding.loads.load(Ordering::Relaxed),
            ModelKind::Reranking => self.reranking.loads.load(Ordering::Relaxed),
        }
    }

    /// Installs a preloaded cross-encoder (tests: forcing predict failures).
    #[cfg(any(test, feature = "mock"))]
    pub fn preload_reranking(&self, model: CrossEncoderModel) {
        *self.reranking.cell.write() = Some(Arc::new(model));
        self.reranking.loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Resolves a spec to a source plus (for non-stub sources) the snapshot
    /// directory to load from.
    fn resolve(
        &self,
        kind: ModelKind,
        spec: &ModelSpec,
    ) -> Result<(ModelSource, Option<PathBuf>), RegistryError> {
        if spec.testing_stub {
            return Ok((ModelSource::Stub, None));
        }

        if let Some(path) = spec.local_path.as_deref()
            && path.exists()
        {
            debug!(%kind, path = %path.display(), "Resolved model from local snapshot");
            return Ok((
                ModelSource::LocalSnapshot(path.to_path_buf()),
                Some(path.to_path_buf()),
            ));
        }

        if self.config.offline {
            return Err(RegistryError::ModelUnavailable {
                kind,
                reason: "offline mode set and no local snapshot present".to_string(),
            });
        }

        if !spec.remote_configured() {
            return Err(RegistryError::ModelUnavailable {
                kind,
                reason: "no local snapshot and no pinned remote revision configured".to_string(),
            });
        }

        let dir = self.fetch_pinned(kind, spec)?;
        Ok((
            ModelSource::RemoteRevision {
                repo: spec.repo.clone(),
                revision: spec.revision.clone(),
            },
            Some(dir),
        ))
    }

    /// Fetches the pinned revision through the hub cache and returns the
    /// snapshot directory holding config, weights, and tokenizer.
    fn fetch_pinned(&self, kind: ModelKind, spec: &ModelSpec) -> Result<PathBuf, RegistryError> {
        let unavailable = |reason: String| RegistryError::ModelUnavailable { kind, reason };

        info!(%kind, repo = %spec.repo, revision = %spec.revision, "Fetching pinned model revision");

        let api = ApiBuilder::new()
            .build()
            .map_err(|e| unavailable(e.to_string()))?;
        let repo = api.repo(Repo::with_revision(
            spec.repo.clone(),
            RepoType::Model,
            spec.revision.clone(),
        ));

        let config_path = repo
            .get("config.json")
            .map_err(|e| unavailable(format!("config.json: {e}")))?;
        repo.get("model.safetensors")
            .map_err(|e| unavailable(format!("model.safetensors: {e}")))?;
        repo.get("tokenizer.json")
            .map_err(|e| unavailable(format!("tokenizer.json: {e}")))?;

        config_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| unavailable("snapshot directory has no parent".to_string()))
    }
}
