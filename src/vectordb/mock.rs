use crate::vectordb::{Candidate, ChunkRecord, VectorDbError, VectorSearchClient};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::model::similarity_to_distance;

/// In-memory stand-in for Qdrant: exact cosine search over stored chunks.
#[derive(Default)]
pub struct MockVectorSearch {
    collections: std::sync::RwLock<HashMap<String, MockCollection>>,
    unreachable: AtomicBool,
}

#[derive(Default, Clone)]
struct MockCollection {
    vector_size: u64,
    chunks: HashMap<u64, ChunkRecord>,
}

impl MockVectorSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk_count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .ok()?
            .get(collection)
            .map(|c| c.chunks.len())
    }

    /// Makes every subsequent operation fail as if the store were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_reachable(&self, collection: &str) -> Result<(), VectorDbError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "store unreachable".to_string(),
            });
        }
        Ok(())
    }
}

impl VectorSearchClient for MockVectorSearch {
    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        self.check_reachable(name)?;

        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::CreateCollectionFailed {
                    collection: name.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        collections
            .entry(name.to_string())
            .or_insert(MockCollection {
                vector_size,
                chunks: HashMap::new(),
            });

        Ok(())
    }

    async fn upsert_chunks(
        &self,
        collection: &str,
        chunks: Vec<ChunkRecord>,
    ) -> Result<(), VectorDbError> {
        self.check_reachable(collection)?;

        let mut collections =
            self.collections
                .write()
                .map_err(|_| VectorDbError::UpsertFailed {
                    collection: collection.to_string(),
                    message: "lock poisoned".to_string(),
                })?;

        let coll =
            collections
                .get_mut(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        for chunk in chunks {
            if chunk.vector.len() as u64 != coll.vector_size {
                return Err(VectorDbError::InvalidDimension {
                    expected: coll.vector_size as usize,
                    actual: chunk.vector.len(),
                });
            }

            coll.chunks.insert(chunk.id, chunk);
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        doc_filter: Option<&str>,
    ) -> Result<Vec<Candidate>, VectorDbError> {
        self.check_reachable(collection)?;

        let collections = self
            .collections
            .read()
            .map_err(|_| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: "lock poisoned".to_string(),
            })?;

        let coll =
            collections
                .get(collection)
                .ok_or_else(|| VectorDbError::CollectionNotFound {
                    collection: collection.to_string(),
                })?;

        let mut candidates: Vec<Candidate> = coll
            .chunks
            .values()
            .filter(|c| doc_filter.is_none() || doc_filter == Some(c.doc_id.as_str()))
            .map(|c| Candidate {
                content: c.content.clone(),
                distance: similarity_to_distance(cosine_similarity(&query, &c.vector)),
                doc_id: c.doc_id.clone(),
                chunk_index: c.chunk_index,
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        candidates.truncate(limit as usize);
        Ok(candidates)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
