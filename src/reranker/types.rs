use crate::vectordb::Candidate;

/// How a chunk's relevance score was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMethod {
    /// Joint (query, passage) scoring by the cross-encoder.
    CrossEncoder,
    /// Lexical token-overlap scoring; the degraded path.
    KeywordFallback,
}

impl std::fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringMethod::CrossEncoder => write!(f, "cross-encoder"),
            ScoringMethod::KeywordFallback => write!(f, "keyword-fallback"),
        }
    }
}

/// A retrieved candidate annotated with its reranking score.
///
/// `relevance_score` is monotonically comparable within one
/// [`Reranker::score`](crate::reranker::Reranker::score) call only: raw
/// vector distance, cross-encoder logits, and overlap fractions live on
/// different scales and are never blended across calls or methods.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub candidate: Candidate,
    /// Higher = more relevant. Comparable within one call only.
    pub relevance_score: f32,
    pub scoring_method: ScoringMethod,
}

impl ScoredChunk {
    pub fn new(candidate: Candidate, relevance_score: f32, scoring_method: ScoringMethod) -> Self {
        Self {
            candidate,
            relevance_score,
            scoring_method,
        }
    }

    /// Chunk text.
    pub fn content(&self) -> &str {
        &self.candidate.content
    }

    /// Raw vector-space distance from the search stage (lower = closer).
    pub fn distance(&self) -> f32 {
        self.candidate.distance
    }

    /// Returns `true` if this chunk was scored on the degraded path.
    pub fn is_degraded(&self) -> bool {
        self.scoring_method == ScoringMethod::KeywordFallback
    }
}
