use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use std::collections::HashMap;
use tracing::debug;

use super::error::VectorDbError;
use super::model::{Candidate, ChunkRecord};

#[derive(Clone)]
/// Direct Qdrant client wrapper.
pub struct QdrantSearchClient {
    client: Qdrant,
    url: String,
}

impl QdrantSearchClient {
    /// Creates a client for `url`.
    pub async fn new(url: &str) -> Result<Self, VectorDbError> {
        let client =
            Qdrant::from_url(url)
                .build()
                .map_err(|e| VectorDbError::ConnectionFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Returns the underlying Qdrant client.
    pub fn client(&self) -> &Qdrant {
        &self.client
    }

    /// Returns the configured URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs a basic health check request.
    pub async fn health_check(&self) -> Result<(), VectorDbError> {
        self.client
            .health_check()
            .await
            .map_err(|e| VectorDbError::ConnectionFailed {
                url: self.url.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    /// Creates a collection with cosine distance.
    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDbError> {
        let vectors_config = VectorParamsBuilder::new(vector_size, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(vectors_config)
                    .on_disk_payload(true),
            )
            .await
            .map_err(|e| VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Returns `true` if the collection exists.
    pub async fn collection_exists(&self, name: &str) -> Result<bool, VectorDbError> {
        self.client.collection_exists(name).await.map_err(|e| {
            VectorDbError::CreateCollectionFailed {
                collection: name.to_string(),
                message: e.to_string(),
            }
        })
    }
}

/// Minimal async interface used by the retrieval pipeline.
pub trait VectorSearchClient: Send + Sync {
    /// Ensures a collection exists.
    fn ensure_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Upserts document chunks with their embeddings.
    fn upsert_chunks(
        &self,
        collection: &str,
        chunks: Vec<ChunkRecord>,
    ) -> impl std::future::Future<Output = Result<(), VectorDbError>> + Send;

    /// Searches for the `limit` nearest chunks, distance ascending.
    fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        doc_filter: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<Candidate>, VectorDbError>> + Send;
}

impl VectorSearchClient for QdrantSearchClient {
    async fn ensure_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDbError> {
        let exists = self.collection_exists(name).await?;

        if !exists {
            self.create_collection(name, vector_size).await?;
        }

        Ok(())
    }

    async fn upsert_chunks(
        &self,
        collection: &str,
        chunks: Vec<ChunkRecord>,
    ) -> Result<(), VectorDbError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = chunks
            .into_iter()
            .map(|c| {
                let mut payload: HashMap<String, qdrant_client::qdrant::Value> = HashMap::new();
                payload.insert("content".to_string(), c.content.into());
                payload.insert("doc_id".to_string(), c.doc_id.into());
                payload.insert("chunk_index".to_string(), (c.chunk_index as i64).into());

                PointStruct::new(c.id, c.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| VectorDbError::UpsertFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: u64,
        doc_filter: Option<&str>,
    ) -> Result<Vec<Candidate>, VectorDbError> {
        let mut search_builder =
            SearchPointsBuilder::new(collection, query, limit).with_payload(true);

        if let Some(doc_id) = doc_filter {
            let filter = Filter::must([Condition::matches("doc_id", doc_id.to_string())]);
            search_builder = search_builder.filter(filter);
        }

        let search_result = self
            .client
            .search_points(search_builder)
            .await
            .map_err(|e| VectorDbError::SearchFailed {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;

        // Qdrant returns cosine similarity descending; conversion keeps the
        // order (distance ascending).
        let candidates: Vec<Candidate> = search_result
            .result
            .into_iter()
            .filter_map(Candidate::from_scored_point)
            .collect();

        debug!(
            collection,
            num_candidates = candidates.len(),
            "Vector search complete"
        );

        Ok(candidates)
    }
}
