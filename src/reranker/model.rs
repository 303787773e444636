use std::path::Path;

use candle_core::{DType, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::error::RerankerError;
use super::keyword;
use crate::constants::CROSS_ENCODER_MAX_SEQ_LEN;
use crate::embedding::device::select_device;
use crate::embedding::utils::load_tokenizer_with_truncation;
use crate::registry::ModelDescriptor;

struct BertForSequenceClassification {
    bert: BertModel,
    classifier: Linear,
}

impl BertForSequenceClassification {
    fn load(vb: VarBuilder, config: &Config) -> candle_core::Result<Self> {
        let bert = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), config)?
        } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("roberta"), config)?
        } else {
            BertModel::load(vb.clone(), config)?
        };

        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self { bert, classifier })
    }

    fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> candle_core::Result<Tensor> {
        let output = self
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.classifier.forward(&cls_token)
    }
}

enum CrossEncoderBackend {
    Model {
        model: BertForSequenceClassification,
        tokenizer: Tokenizer,
        device: candle_core::Device,
    },
    /// Lexical scoring, no weights; predict still succeeds.
    Stub,
    /// Predict always errors. Exercises the keyword-fallback path.
    #[cfg(any(test, feature = "mock"))]
    Failing,
}

/// Loaded cross-encoder: jointly scores (query, passage) pairs.
///
/// Owned by the [`ModelRegistry`](crate::registry::ModelRegistry). Higher
/// output means more relevant; scores are raw logits on the model backend
/// and overlap fractions on the stub backend.
pub struct CrossEncoderModel {
    backend: CrossEncoderBackend,
    descriptor: ModelDescriptor,
}

impl std::fmt::Debug for CrossEncoderModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoderModel")
            .field(
                "backend",
                &match &self.backend {
                    CrossEncoderBackend::Model { device, .. } => format!("Model({device:?})"),
                    CrossEncoderBackend::Stub => "Stub".to_string(),
                    #[cfg(any(test, feature = "mock"))]
                    CrossEncoderBackend::Failing => "Failing".to_string(),
                },
            )
            .field("identifier", &self.descriptor.identifier())
            .finish()
    }
}

impl CrossEncoderModel {
    /// Loads a BERT sequence classifier from a snapshot directory.
    pub fn load(snapshot_dir: &Path, descriptor: ModelDescriptor) -> Result<Self, RerankerError> {
        let device = select_device();
        debug!(?device, "Selected compute device for cross-encoder");

        let config_content = std::fs::read_to_string(snapshot_dir.join("config.json"))?;
        let config: Config =
            serde_json::from_str(&config_content).map_err(|e| RerankerError::ModelLoadFailed {
                reason: format!("Failed to parse config.json: {e}"),
            })?;

        let weights_path = snapshot_dir.join("model.safetensors");
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device).map_err(
                |e| RerankerError::ModelLoadFailed {
                    reason: format!("Failed to map safetensors: {e}"),
                },
            )?
        };

        let model = BertForSequenceClassification::load(vb, &config).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load BERT classifier: {e}"),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(snapshot_dir, CROSS_ENCODER_MAX_SEQ_LEN)
            .map_err(|e| RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {e}"),
            })?;

        info!(identifier = %descriptor.identifier(), "Cross-encoder model loaded");

        Ok(Self {
            backend: CrossEncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            descriptor,
        })
    }

    /// Stub cross-encoder: scores via lexical overlap, no weights needed.
    pub fn stub(descriptor: ModelDescriptor) -> Self {
        warn!("Cross-encoder running in STUB mode (testing only)");
        Self {
            backend: CrossEncoderBackend::Stub,
            descriptor,
        }
    }

    /// Cross-encoder whose predict always fails (tests only).
    #[cfg(any(test, feature = "mock"))]
    pub fn failing(descriptor: ModelDescriptor) -> Self {
        Self {
            backend: CrossEncoderBackend::Failing,
            descriptor,
        }
    }

    /// Scores each passage against the query, one batch, input order
    /// preserved. Errors abort the whole batch: partial score sets are
    /// never returned, so callers never mix scoring methods.
    pub fn predict(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankerError> {
        debug!(
            query_len = query.len(),
            num_passages = passages.len(),
            "Scoring query-passage pairs"
        );

        match &self.backend {
            CrossEncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => passages
                .iter()
                .map(|passage| score_pair(model, tokenizer, device, query, passage))
                .collect(),
            CrossEncoderBackend::Stub => Ok(passages
                .iter()
                .map(|passage| keyword::overlap_score(query, passage))
                .collect()),
            #[cfg(any(test, feature = "mock"))]
            CrossEncoderBackend::Failing => Err(RerankerError::InferenceFailed {
                reason: "injected predict failure".to_string(),
            }),
        }
    }

    /// Returns `true` if real weights are loaded.
    pub fn has_model(&self) -> bool {
        matches!(self.backend, CrossEncoderBackend::Model { .. })
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }
}

fn score_pair(
    model: &BertForSequenceClassification,
    tokenizer: &Tokenizer,
    device: &candle_core::Device,
    query: &str,
    passage: &str,
) -> Result<f32, RerankerError> {
    let tokens =
        tokenizer
            .encode((query, passage), true)
            .map_err(|e| RerankerError::TokenizationFailed {
                reason: e.to_string(),
            })?;

    let input_ids = Tensor::new(tokens.get_ids(), device)?.unsqueeze(0)?;
    let type_ids = Tensor::new(tokens.get_type_ids(), device)?.unsqueeze(0)?;

    // The tokenizer's attention mask handles padding tokens correctly.
    let attention_mask = Tensor::new(tokens.get_attention_mask(), device)?.unsqueeze(0)?;

    let logits = model
        .forward(&input_ids, &type_ids, Some(&attention_mask))
        .map_err(|e| RerankerError::InferenceFailed {
            reason: e.to_string(),
        })?;

    Ok(logits.flatten_all()?.to_vec1::<f32>()?[0])
}
