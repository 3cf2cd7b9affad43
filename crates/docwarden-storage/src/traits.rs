//! Collection store trait definitions

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use docwarden_core::limits::{validate_batch_documents, validate_document_ids, validate_n_results};
use docwarden_core::{
    cosine_distance, Collection, Document, Embedder, GetRequest, GetResult, QueryRequest,
    QueryResult, RecordId, StoredRecord,
};

/// Trait for collection store implementations.
///
/// Backends implement the raw record primitives; the bulk `get`, `add`,
/// `delete`, `query` and `count` operations are provided on top of them.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection. Later calls fail as unavailable.
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    /// Embedder used for stored documents and query texts
    fn embedder(&self) -> &dyn Embedder;

    // ─────────────────────────────────────────────────────────────────────────
    // Collection Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Look up a collection by name
    async fn get_collection(&self, name: &str) -> StorageResult<Option<Collection>>;

    /// Create a collection; fails if the name is taken
    async fn create_collection(&self, name: &str) -> StorageResult<Collection>;

    /// List all collections
    async fn list_collections(&self) -> StorageResult<Vec<Collection>>;

    /// Delete a collection and all its records
    async fn delete_collection(&self, name: &str) -> StorageResult<()>;

    /// Return the named collection, creating it when absent
    async fn get_or_create_collection(&self, name: &str) -> StorageResult<Collection> {
        match self.get_collection(name).await? {
            Some(collection) => Ok(collection),
            None => {
                let collection = self.create_collection(name).await?;
                tracing::info!("Created new collection: {}", name);
                Ok(collection)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Primitives
    // ─────────────────────────────────────────────────────────────────────────

    /// Load every record of a collection
    async fn load_records(&self, collection: &str) -> StorageResult<Vec<StoredRecord>>;

    /// Insert records; fails on an id that already exists
    async fn insert_records(&self, collection: &str, records: Vec<StoredRecord>) -> StorageResult<()>;

    /// Remove records by id, returning how many existed
    async fn remove_records(&self, collection: &str, ids: &[RecordId]) -> StorageResult<usize>;

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Bulk read, optionally restricted by ids and a metadata filter
    async fn get(&self, collection: &str, request: &GetRequest) -> StorageResult<GetResult> {
        let records: Vec<StoredRecord> = self
            .load_records(collection)
            .await?
            .into_iter()
            .filter(|r| request.selects(r))
            .skip(request.offset)
            .take(request.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(GetResult::from_records(records, request.include))
    }

    /// Bulk insert; ids must be unique non-empty strings
    async fn add(&self, collection: &str, documents: Vec<Document>) -> StorageResult<()> {
        if documents.is_empty() {
            return Ok(());
        }
        validate_batch_documents(documents.len())?;
        validate_document_ids(documents.iter().map(|d| d.id.as_str()))?;

        let embedder = self.embedder();
        let records = documents
            .into_iter()
            .map(|doc| {
                let embedding = embedder.embed(&doc.text);
                doc.into_record(Some(embedding))
            })
            .collect();
        self.insert_records(collection, records).await
    }

    /// Bulk delete by id
    async fn delete(&self, collection: &str, ids: &[RecordId]) -> StorageResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.remove_records(collection, ids).await
    }

    /// Nearest-neighbour search, one result list per query text
    async fn query(&self, collection: &str, request: &QueryRequest) -> StorageResult<QueryResult> {
        validate_n_results(request.n_results)?;
        if request.query_texts.is_empty() {
            return Err(StorageError::InvalidRequest(
                "query_texts cannot be empty".to_string(),
            ));
        }

        let candidates: Vec<StoredRecord> = self
            .load_records(collection)
            .await?
            .into_iter()
            .filter(|r| match &request.filter {
                Some(filter) => r.metadata.as_ref().is_some_and(|m| filter.matches(m)),
                None => true,
            })
            .collect();

        let embedder = self.embedder();
        let mut result = QueryResult::default();
        for text in &request.query_texts {
            let query_embedding = embedder.embed(text);

            let mut scored: Vec<(f32, &StoredRecord)> = candidates
                .iter()
                .filter_map(|r| {
                    r.embedding
                        .as_ref()
                        .map(|emb| (cosine_distance(&query_embedding, emb), r))
                })
                .collect();
            scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            scored.truncate(request.n_results);

            result.ids.push(scored.iter().map(|(_, r)| r.id.clone()).collect());
            result
                .documents
                .push(scored.iter().map(|(_, r)| r.document.clone()).collect());
            result
                .metadatas
                .push(scored.iter().map(|(_, r)| r.metadata.clone()).collect());
            result.distances.push(scored.iter().map(|(d, _)| *d).collect());
        }

        tracing::debug!(
            "Query on {} returned {} result lists",
            collection,
            result.ids.len()
        );
        Ok(result)
    }

    /// Current document count
    async fn count(&self, collection: &str) -> StorageResult<usize> {
        Ok(self.load_records(collection).await?.len())
    }
}
