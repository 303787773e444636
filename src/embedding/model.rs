use std::path::Path;

use candle_core::{DType, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::device::select_device;
use super::error::EmbeddingError;
use super::utils::load_tokenizer_with_truncation;
use crate::registry::ModelDescriptor;

enum EmbeddingBackend {
    Model {
        bert: BertModel,
        tokenizer: Tokenizer,
        device: candle_core::Device,
    },
    Stub,
}

/// Loaded embedding model: deterministic text-to-vector mapping.
///
/// Owned by the [`ModelRegistry`](crate::registry::ModelRegistry); consumers
/// hold an `Arc` obtained through its accessor. The stub backend produces
/// deterministic hash-seeded vectors and needs no model files.
pub struct EmbeddingModel {
    backend: EmbeddingBackend,
    descriptor: ModelDescriptor,
    dim: usize,
    max_seq_len: usize,
}

impl std::fmt::Debug for EmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingModel")
            .field(
                "backend",
                &match &self.backend {
                    EmbeddingBackend::Model { device, .. } => format!("Model({device:?})"),
                    EmbeddingBackend::Stub => "Stub".to_string(),
                },
            )
            .field("identifier", &self.descriptor.identifier())
            .field("dim", &self.dim)
            .finish()
    }
}

impl EmbeddingModel {
    /// Loads a BERT-style encoder from a snapshot directory
    /// (config.json, model.safetensors, tokenizer.json).
    pub fn load(
        snapshot_dir: &Path,
        descriptor: ModelDescriptor,
        dim: usize,
        max_seq_len: usize,
    ) -> Result<Self, EmbeddingError> {
        let device = select_device();
        debug!(?device, "Selected compute device for embedder");

        let config_content = std::fs::read_to_string(snapshot_dir.join("config.json"))?;
        let config: Config =
            serde_json::from_str(&config_content).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to parse config.json: {e}"),
            })?;

        if dim > config.hidden_size {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding dim ({dim}) exceeds model hidden_size ({})",
                    config.hidden_size
                ),
            });
        }

        let weights_path = snapshot_dir.join("model.safetensors");
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| EmbeddingError::ModelLoadFailed {
                    reason: format!("Failed to map safetensors: {e}"),
                })?
        };

        let bert = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)
        } else {
            BertModel::load(vb, &config)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to load BERT encoder: {e}"),
        })?;

        let tokenizer = load_tokenizer_with_truncation(snapshot_dir, max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            }
        })?;

        info!(
            identifier = %descriptor.identifier(),
            hidden_size = config.hidden_size,
            dim,
            "Embedding model loaded"
        );

        Ok(Self {
            backend: EmbeddingBackend::Model {
                bert,
                tokenizer,
                device,
            },
            descriptor,
            dim,
            max_seq_len,
        })
    }

    /// Stub embedder (tests/demos without weights).
    pub fn stub(descriptor: ModelDescriptor, dim: usize, max_seq_len: usize) -> Self {
        warn!("Embedding model running in STUB mode (testing only)");
        Self {
            backend: EmbeddingBackend::Stub,
            descriptor,
            dim,
            max_seq_len,
        }
    }

    /// Generates an L2-normalized embedding for a single string.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EmbeddingBackend::Model {
                bert,
                tokenizer,
                device,
            } => self.embed_with_model(text, bert, tokenizer, device),
            EmbeddingBackend::Stub => Ok(self.embed_stub(text)),
        }
    }

    /// Generates embeddings for a batch of strings, preserving order.
    ///
    /// Texts are encoded one at a time, so batch output is identical to
    /// calling [`Self::embed`] per text (batch-size invariance).
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn embed_with_model(
        &self,
        text: &str,
        bert: &BertModel,
        tokenizer: &Tokenizer,
        device: &candle_core::Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let tokens = encoding.get_ids();
        if tokens.is_empty() {
            return Ok(vec![0.0; self.dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = tokens.len(),
            "Generating embedding"
        );

        // [1, seq_len]; single unpadded sequence, so the attention mask is
        // all ones and mean pooling over the sequence dim is exact.
        let input_ids = Tensor::new(tokens, device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = bert.forward(&input_ids, &token_type_ids, None)?;
        let pooled = hidden.mean(1)?;
        let embedding = pooled.i((0, ..self.dim))?.to_vec1::<f32>()?;

        Ok(normalize(embedding))
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dim);
        let mut state = seed;

        for _ in 0..self.dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        normalize(embedding)
    }

    /// Output embedding dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Max tokens considered per text.
    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbeddingBackend::Stub)
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }
}

fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }

    embedding
}
