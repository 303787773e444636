//! Retrieval pipeline: embed the question, overfetch nearest chunks,
//! rerank, keep the top K.
//!
//! The search stage fetches `candidate_pool_size` candidates so the
//! reranker has more to choose from than the `top_k` finally returned.
//! An empty search result short-circuits: the reranker is never invoked
//! on nothing.

mod error;

#[cfg(test)]
mod tests;

pub use error::RetrievalError;

use tracing::{debug, instrument};

use crate::constants::{DEFAULT_CANDIDATE_POOL_SIZE, DEFAULT_COLLECTION_NAME, DEFAULT_TOP_K};
use crate::embedding::Embedder;
use crate::reranker::{Reranker, ScoredChunk, ScoringMethod};
use crate::vectordb::VectorSearchClient;

/// Retrieval stage tuning.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Collection to search.
    pub collection: String,
    /// Chunks returned to the caller.
    pub top_k: usize,
    /// Candidates fetched from the store before reranking. Clamped up to
    /// `top_k` so reranking never sees fewer candidates than it must return.
    pub candidate_pool_size: usize,
    /// 0 = quiet, 1 = per-chunk scores, 2 = scores plus chunk content.
    pub debug_level: u8,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            top_k: DEFAULT_TOP_K,
            candidate_pool_size: DEFAULT_CANDIDATE_POOL_SIZE,
            debug_level: 0,
        }
    }
}

impl RetrievalConfig {
    fn pool_size(&self) -> u64 {
        self.candidate_pool_size.max(self.top_k) as u64
    }
}

/// The ranked chunks selected for one question.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    chunks: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[ScoredChunk] {
        &self.chunks
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredChunk> {
        self.chunks.iter()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Scoring method shared by every chunk of this result, if any.
    pub fn scoring_method(&self) -> Option<ScoringMethod> {
        self.chunks.first().map(|c| c.scoring_method)
    }

    /// Returns `true` if the chunks were scored on the degraded path.
    pub fn is_degraded(&self) -> bool {
        self.scoring_method() == Some(ScoringMethod::KeywordFallback)
    }
}

/// Runs the embed -> search -> rerank -> truncate pipeline.
pub struct RetrievalOrchestrator<C: VectorSearchClient> {
    embedder: Embedder,
    search: C,
    reranker: Reranker,
    config: RetrievalConfig,
}

impl<C: VectorSearchClient> RetrievalOrchestrator<C> {
    pub fn new(embedder: Embedder, search: C, reranker: Reranker, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            search,
            reranker,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn search_client(&self) -> &C {
        &self.search
    }

    /// Retrieves the best-matching chunks for a question across all
    /// indexed documents.
    pub async fn retrieve(&self, question: &str) -> Result<RetrievalResult, RetrievalError> {
        self.retrieve_inner(question, None).await
    }

    /// Retrieves chunks for a question, restricted to one document.
    pub async fn retrieve_in(
        &self,
        question: &str,
        doc_id: &str,
    ) -> Result<RetrievalResult, RetrievalError> {
        self.retrieve_inner(question, Some(doc_id)).await
    }

    #[instrument(skip(self, question), fields(question_len = question.len()))]
    async fn retrieve_inner(
        &self,
        question: &str,
        doc_filter: Option<&str>,
    ) -> Result<RetrievalResult, RetrievalError> {
        let query_vector = self.embedder.embed(question)?;

        let candidates = self
            .search
            .search(
                &self.config.collection,
                query_vector,
                self.config.pool_size(),
                doc_filter,
            )
            .await?;

        if candidates.is_empty() {
            debug!("No candidates in vector store, returning empty result");
            return Ok(RetrievalResult::empty());
        }

        let mut chunks = self.reranker.score(question, candidates);
        chunks.truncate(self.config.top_k);

        if self.config.debug_level > 0 {
            for (rank, chunk) in chunks.iter().enumerate() {
                if self.config.debug_level >= 2 {
                    debug!(
                        rank,
                        distance = chunk.distance(),
                        relevance = chunk.relevance_score,
                        method = %chunk.scoring_method,
                        content = chunk.content(),
                        "Retrieved chunk"
                    );
                } else {
                    debug!(
                        rank,
                        distance = chunk.distance(),
                        relevance = chunk.relevance_score,
                        method = %chunk.scoring_method,
                        content_len = chunk.content().len(),
                        "Retrieved chunk"
                    );
                }
            }
        }

        Ok(RetrievalResult { chunks })
    }
}
