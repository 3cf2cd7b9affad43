//! In-memory collection store for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::CollectionStore;
use async_trait::async_trait;
use docwarden_core::{Collection, Embedder, HashEmbedder, RecordId, StoredRecord};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// In-memory collection store
///
/// Records keep their insertion order. Useful for tests and dry runs.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    records: RwLock<HashMap<String, Vec<StoredRecord>>>,
    embedder: Box<dyn Embedder>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_embedder(Box::new(HashEmbedder::default()))
    }

    pub fn with_embedder(embedder: Box<dyn Embedder>) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            records: RwLock::new(HashMap::new()),
            embedder,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is closed".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Database(format!("Lock error: {}", e))
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn initialize(&self) -> StorageResult<()> {
        self.closed.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(!self.closed.load(Ordering::SeqCst))
    }

    fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    // Collection operations

    async fn get_collection(&self, name: &str) -> StorageResult<Option<Collection>> {
        self.ensure_open()?;
        let collections = self.collections.read().map_err(lock_error)?;
        Ok(collections.get(name).cloned())
    }

    async fn create_collection(&self, name: &str) -> StorageResult<Collection> {
        self.ensure_open()?;
        docwarden_core::limits::validate_collection_name(name)?;

        let mut collections = self.collections.write().map_err(lock_error)?;
        if collections.contains_key(name) {
            return Err(StorageError::DuplicateCollection(name.to_string()));
        }
        let collection = Collection::new(name);
        collections.insert(name.to_string(), collection.clone());

        let mut records = self.records.write().map_err(lock_error)?;
        records.insert(name.to_string(), Vec::new());
        Ok(collection)
    }

    async fn list_collections(&self) -> StorageResult<Vec<Collection>> {
        self.ensure_open()?;
        let collections = self.collections.read().map_err(lock_error)?;
        let mut list: Vec<Collection> = collections.values().cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn delete_collection(&self, name: &str) -> StorageResult<()> {
        self.ensure_open()?;
        let mut collections = self.collections.write().map_err(lock_error)?;
        if collections.remove(name).is_none() {
            return Err(StorageError::CollectionNotFound(name.to_string()));
        }
        let mut records = self.records.write().map_err(lock_error)?;
        records.remove(name);
        Ok(())
    }

    // Record primitives

    async fn load_records(&self, collection: &str) -> StorageResult<Vec<StoredRecord>> {
        self.ensure_open()?;
        let records = self.records.read().map_err(lock_error)?;
        records
            .get(collection)
            .cloned()
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))
    }

    async fn insert_records(
        &self,
        collection: &str,
        new_records: Vec<StoredRecord>,
    ) -> StorageResult<()> {
        self.ensure_open()?;
        let mut records = self.records.write().map_err(lock_error)?;
        let existing = records
            .get_mut(collection)
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))?;

        let mut ids: HashSet<RecordId> = existing.iter().map(|r| r.id.clone()).collect();
        for record in &new_records {
            if !ids.insert(record.id.clone()) {
                return Err(StorageError::DuplicateDocument {
                    collection: collection.to_string(),
                    id: record.id.to_string(),
                });
            }
        }
        existing.extend(new_records);
        Ok(())
    }

    async fn remove_records(&self, collection: &str, ids: &[RecordId]) -> StorageResult<usize> {
        self.ensure_open()?;
        let mut records = self.records.write().map_err(lock_error)?;
        let existing = records
            .get_mut(collection)
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))?;

        let doomed: HashSet<&RecordId> = ids.iter().collect();
        let before = existing.len();
        existing.retain(|r| !doomed.contains(&r.id));
        Ok(before - existing.len())
    }

    async fn count(&self, collection: &str) -> StorageResult<usize> {
        self.ensure_open()?;
        let records = self.records.read().map_err(lock_error)?;
        records
            .get(collection)
            .map(Vec::len)
            .ok_or_else(|| StorageError::CollectionNotFound(collection.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwarden_core::{Document, Filter, GetRequest, Include, QueryRequest};

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.initialize().await.unwrap();
        store.create_collection("docs").await.unwrap();
        store
            .add(
                "docs",
                vec![
                    Document::new("a", "rust borrow checker").with_meta("lang", "en"),
                    Document::new("b", "database connection pool").with_meta("lang", "en"),
                    Document::new("c", "Datenbank Verbindung").with_meta("lang", "de"),
                ],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = seeded().await;
        assert_eq!(store.count("docs").await.unwrap(), 3);

        let result = store
            .get("docs", &GetRequest::all().with_ids(vec!["b".into()]))
            .await
            .unwrap();
        assert_eq!(result.ids, vec![RecordId::from("b")]);
        assert_eq!(
            result.documents.unwrap()[0].as_deref(),
            Some("database connection pool")
        );

        let removed = store.delete("docs", &["b".into()]).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count("docs").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_with_filter_limit_and_include() {
        let store = seeded().await;
        let result = store
            .get(
                "docs",
                &GetRequest::all()
                    .with_filter(Filter::equals("lang", "en"))
                    .with_include(Include::ids_only())
                    .with_limit(1),
            )
            .await
            .unwrap();
        assert_eq!(result.ids, vec![RecordId::from("a")]);
        assert!(result.documents.is_none());
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let store = seeded().await;
        let result = store
            .query("docs", &QueryRequest::new("database connection").with_n_results(2))
            .await
            .unwrap();
        assert_eq!(result.ids.len(), 1);
        assert_eq!(result.ids[0][0], RecordId::from("b"));
        assert!(result.distances[0].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(result.ids[0].len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let store = seeded().await;
        let err = store
            .add("docs", vec![Document::new("a", "again")])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateDocument { .. }));
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let store = MemoryStore::new();
        assert!(store.get_collection("nope").await.unwrap().is_none());
        let err = store.load_records("nope").await.unwrap_err();
        assert!(matches!(err, StorageError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_get_or_create_collection() {
        let store = MemoryStore::new();
        let first = store.get_or_create_collection("notes").await.unwrap();
        let second = store.get_or_create_collection("notes").await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(matches!(
            store.create_collection("notes").await.unwrap_err(),
            StorageError::DuplicateCollection(_)
        ));
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let store = seeded().await;
        store.close().await.unwrap();
        let err = store.count("docs").await.unwrap_err();
        assert!(err.is_unavailable());
        assert!(!store.health_check().await.unwrap());
    }
}
