//! Candidate reranking with defined degradation.
//!
//! [`Reranker::score`] attempts cross-encoder scoring and falls back to
//! lexical overlap when the model is unavailable or predict fails. The
//! fallback never raises: scoring always yields one [`ScoredChunk`] per
//! input candidate. Degradation is per-call; every invocation retries the
//! cross-encoder path first.

mod error;
pub mod keyword;
pub mod model;
mod types;

#[cfg(test)]
mod tests;

pub use error::RerankerError;
pub use model::CrossEncoderModel;
pub use types::{ScoredChunk, ScoringMethod};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::registry::ModelRegistry;
use crate::vectordb::Candidate;

/// Reorders candidates by estimated relevance to the query.
#[derive(Clone)]
pub struct Reranker {
    registry: Arc<ModelRegistry>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("registry", &self.registry)
            .finish()
    }
}

impl Reranker {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Scores every candidate against the query and returns them sorted by
    /// descending relevance.
    ///
    /// All chunks of one call share the same scoring method: cross-encoder
    /// scores are committed only when the whole predict batch succeeds,
    /// otherwise every candidate is re-scored by lexical overlap. The sort
    /// is stable, so equal scores keep the incoming (distance-ascending)
    /// order.
    pub fn score(&self, query: &str, candidates: Vec<Candidate>) -> Vec<ScoredChunk> {
        if candidates.is_empty() {
            return vec![];
        }

        let contents: Vec<&str> = candidates.iter().map(|c| c.content.as_str()).collect();

        let (scores, method) = match self.registry.reranking() {
            Ok(model) => match model.predict(query, &contents) {
                Ok(scores) => (scores, ScoringMethod::CrossEncoder),
                Err(e) => {
                    warn!(error = %e, "Cross-encoder predict failed, degrading to keyword scoring");
                    (self.keyword_scores(query, &contents), ScoringMethod::KeywordFallback)
                }
            },
            Err(e) => {
                warn!(error = %e, "Reranking model unavailable, degrading to keyword scoring");
                (self.keyword_scores(query, &contents), ScoringMethod::KeywordFallback)
            }
        };

        let mut scored: Vec<ScoredChunk> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, relevance_score)| {
                ScoredChunk::new(candidate, relevance_score, method)
            })
            .collect();

        // Stable sort: tied scores preserve distance-ascending input order.
        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            %method,
            top_score = scored.first().map(|c| c.relevance_score),
            num_chunks = scored.len(),
            "Reranking complete"
        );

        scored
    }

    fn keyword_scores(&self, query: &str, contents: &[&str]) -> Vec<f32> {
        contents
            .iter()
            .map(|content| keyword::overlap_score(query, content))
            .collect()
    }
}
