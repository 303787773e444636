use qdrant_client::qdrant::ScoredPoint;

/// A document chunk staged for indexing.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub id: u64,
    pub content: String,
    pub doc_id: String,
    pub chunk_index: u32,
    pub vector: Vec<f32>,
}

impl ChunkRecord {
    pub fn new(id: u64, content: impl Into<String>, doc_id: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            doc_id: doc_id.into(),
            chunk_index: 0,
            vector: vec![],
        }
    }

    pub fn with_chunk_index(mut self, chunk_index: u32) -> Self {
        self.chunk_index = chunk_index;
        self
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = vector;
        self
    }
}

/// A chunk returned by vector search, before reranking.
///
/// `distance` is vector-space distance: lower means closer. Qdrant cosine
/// scores are converted on the way out so callers never see a similarity.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub content: String,
    /// Lower = closer. Always >= 0.
    pub distance: f32,
    pub doc_id: String,
    pub chunk_index: u32,
}

impl Candidate {
    /// Builds a candidate from a Qdrant scored point, dropping points with
    /// no content payload.
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let payload = point.payload;

        let content = payload.get("content").and_then(|v| v.as_str())?.to_string();

        let doc_id = payload
            .get("doc_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let chunk_index = payload
            .get("chunk_index")
            .and_then(|v| v.as_integer())
            .map(|i| i as u32)
            .unwrap_or(0);

        Some(Candidate {
            content,
            distance: similarity_to_distance(point.score),
            doc_id,
            chunk_index,
        })
    }
}

/// Converts a cosine similarity score to a distance (lower = closer).
pub fn similarity_to_distance(score: f32) -> f32 {
    (1.0 - score).max(0.0)
}
