//! ReDB collection store

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::CollectionStore;
use async_trait::async_trait;
use docwarden_core::{Collection, Embedder, HashEmbedder, RecordId, StoredRecord};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Mutex;

// Table definitions
const COLLECTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// ReDB collection store
///
/// Documents live in one table keyed by `<collection>\0<record id>`, so a
/// collection is a contiguous key range and reads come back in id order.
pub struct RedbStore {
    db: Mutex<Option<Database>>,
    embedder: Box<dyn Embedder>,
}

impl RedbStore {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;

        // Initialize tables
        {
            let write_txn = db.begin_write()?;
            {
                write_txn.open_table(COLLECTIONS)?;
                write_txn.open_table(DOCUMENTS)?;
                write_txn.open_table(META)?;
            }
            write_txn.commit()?;
        }

        let store = Self {
            db: Mutex::new(Some(db)),
            embedder: Box::new(HashEmbedder::default()),
        };
        store.migrate_to_latest()?;
        Ok(store)
    }

    /// Replace the embedder used for new documents and queries
    pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> StorageResult<T>) -> StorageResult<T> {
        let guard = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let db = guard
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("redb store is closed".to_string()))?;
        f(db)
    }

    fn make_record_key(collection: &str, id: &RecordId) -> String {
        format!("{}\0{}", collection, id.storage_key())
    }

    /// Key range `[lo, hi)` covering every record of a collection
    fn collection_range(collection: &str) -> (String, String) {
        (format!("{}\0", collection), format!("{}\u{1}", collection))
    }

    fn collection_exists(
        table: &impl ReadableTable<&'static str, &'static [u8]>,
        name: &str,
    ) -> StorageResult<bool> {
        Ok(table.get(name)?.is_some())
    }
}

impl Migratable for RedbStore {
    fn get_schema_version(&self) -> StorageResult<u32> {
        self.with_db(|db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(META)?;
            let version = table.get(SCHEMA_VERSION_KEY)?.map(|v| v.value()).unwrap_or(0);
            u32::try_from(version).map_err(|e| StorageError::Migration(e.to_string()))
        })
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        self.with_db(|db| {
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(META)?;
                table.insert(SCHEMA_VERSION_KEY, u64::from(version))?;
            }
            write_txn.commit()?;
            Ok(())
        })
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        match version {
            // v1 tables are created on open
            1 => Ok(()),
            _ => Err(StorageError::Migration(format!("no migration produces v{}", version))),
        }
    }
}

#[async_trait]
impl CollectionStore for RedbStore {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        let mut guard = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        guard.take();
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let guard = self
            .db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(guard.is_some())
    }

    fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    async fn get_collection(&self, name: &str) -> StorageResult<Option<Collection>> {
        self.with_db(|db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(COLLECTIONS)?;
            match table.get(name)? {
                Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
                None => Ok(None),
            }
        })
    }

    async fn create_collection(&self, name: &str) -> StorageResult<Collection> {
        docwarden_core::limits::validate_collection_name(name)?;
        self.with_db(|db| {
            let collection = Collection::new(name);
            let value = serde_json::to_vec(&collection)?;

            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(COLLECTIONS)?;
                if Self::collection_exists(&table, name)? {
                    return Err(StorageError::DuplicateCollection(name.to_string()));
                }
                table.insert(name, value.as_slice())?;
            }
            write_txn.commit()?;
            Ok(collection)
        })
    }

    async fn list_collections(&self) -> StorageResult<Vec<Collection>> {
        self.with_db(|db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(COLLECTIONS)?;

            let mut collections = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                collections.push(serde_json::from_slice(value.value())?);
            }
            Ok(collections)
        })
    }

    async fn delete_collection(&self, name: &str) -> StorageResult<()> {
        self.with_db(|db| {
            let (lo, hi) = Self::collection_range(name);
            let write_txn = db.begin_write()?;
            {
                let mut collections = write_txn.open_table(COLLECTIONS)?;
                if collections.remove(name)?.is_none() {
                    return Err(StorageError::CollectionNotFound(name.to_string()));
                }

                let mut documents = write_txn.open_table(DOCUMENTS)?;
                let keys = documents
                    .range(lo.as_str()..hi.as_str())?
                    .map(|entry| entry.map(|(k, _)| k.value().to_string()))
                    .collect::<Result<Vec<String>, _>>()?;
                for key in &keys {
                    documents.remove(key.as_str())?;
                }
                tracing::debug!("Removed {} records with collection {}", keys.len(), name);
            }
            write_txn.commit()?;
            Ok(())
        })
    }

    async fn load_records(&self, collection: &str) -> StorageResult<Vec<StoredRecord>> {
        self.with_db(|db| {
            let read_txn = db.begin_read()?;
            let collections = read_txn.open_table(COLLECTIONS)?;
            if !Self::collection_exists(&collections, collection)? {
                return Err(StorageError::CollectionNotFound(collection.to_string()));
            }

            let (lo, hi) = Self::collection_range(collection);
            let table = read_txn.open_table(DOCUMENTS)?;
            let mut records = Vec::new();
            for entry in table.range(lo.as_str()..hi.as_str())? {
                let (_, value) = entry?;
                records.push(serde_json::from_slice(value.value())?);
            }
            Ok(records)
        })
    }

    async fn insert_records(
        &self,
        collection: &str,
        records: Vec<StoredRecord>,
    ) -> StorageResult<()> {
        self.with_db(|db| {
            let write_txn = db.begin_write()?;
            {
                let collections = write_txn.open_table(COLLECTIONS)?;
                if !Self::collection_exists(&collections, collection)? {
                    return Err(StorageError::CollectionNotFound(collection.to_string()));
                }

                let mut table = write_txn.open_table(DOCUMENTS)?;
                for record in &records {
                    let key = Self::make_record_key(collection, &record.id);
                    if table.get(key.as_str())?.is_some() {
                        // Dropping the transaction discards the partial batch
                        return Err(StorageError::DuplicateDocument {
                            collection: collection.to_string(),
                            id: record.id.to_string(),
                        });
                    }
                    let value = serde_json::to_vec(record)?;
                    table.insert(key.as_str(), value.as_slice())?;
                }
            }
            write_txn.commit()?;
            tracing::debug!(
                "Batch saved {} records in single transaction",
                records.len()
            );
            Ok(())
        })
    }

    async fn remove_records(&self, collection: &str, ids: &[RecordId]) -> StorageResult<usize> {
        self.with_db(|db| {
            let write_txn = db.begin_write()?;
            let mut removed = 0;
            {
                let collections = write_txn.open_table(COLLECTIONS)?;
                if !Self::collection_exists(&collections, collection)? {
                    return Err(StorageError::CollectionNotFound(collection.to_string()));
                }

                let mut table = write_txn.open_table(DOCUMENTS)?;
                for id in ids {
                    let key = Self::make_record_key(collection, id);
                    if table.remove(key.as_str())?.is_some() {
                        removed += 1;
                    }
                }
            }
            write_txn.commit()?;
            Ok(removed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwarden_core::{Document, GetRequest, Include, QueryRequest};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_redb_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        let store = RedbStore::open(&db_path).unwrap();
        store.initialize().await.unwrap();
        store.create_collection("docs").await.unwrap();

        store
            .add(
                "docs",
                vec![
                    Document::new("a", "first document").with_meta("n", 1i64),
                    Document::new("b", "second document"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(store.count("docs").await.unwrap(), 2);

        let removed = store.delete("docs", &["a".into()]).await.unwrap();
        assert_eq!(removed, 1);

        let result = store.get("docs", &GetRequest::all()).await.unwrap();
        assert_eq!(result.ids, vec![RecordId::from("b")]);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.redb");

        {
            let store = RedbStore::open(&db_path).unwrap();
            store.create_collection("docs").await.unwrap();
            store
                .insert_records(
                    "docs",
                    vec![StoredRecord {
                        id: RecordId::Other(serde_json::json!(17)),
                        document: Some("orphan".into()),
                        metadata: None,
                        embedding: None,
                    }],
                )
                .await
                .unwrap();
        }

        let store = RedbStore::open(&db_path).unwrap();
        let result = store
            .get("docs", &GetRequest::all().with_include(Include::ids_only()))
            .await
            .unwrap();
        assert_eq!(result.ids, vec![RecordId::Other(serde_json::json!(17))]);
        assert_eq!(store.get_schema_version().unwrap(), crate::CURRENT_VERSION);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("iso.redb")).unwrap();
        store.create_collection("a").await.unwrap();
        store.create_collection("ab").await.unwrap();
        store.add("a", vec![Document::new("x", "one")]).await.unwrap();
        store.add("ab", vec![Document::new("x", "two")]).await.unwrap();

        assert_eq!(store.count("a").await.unwrap(), 1);
        store.delete_collection("a").await.unwrap();
        assert_eq!(store.count("ab").await.unwrap(), 1);
        assert!(matches!(
            store.count("a").await.unwrap_err(),
            StorageError::CollectionNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_batch_is_not_applied() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("dup.redb")).unwrap();
        store.create_collection("docs").await.unwrap();
        store.add("docs", vec![Document::new("a", "one")]).await.unwrap();

        let err = store
            .insert_records(
                "docs",
                vec![
                    Document::new("b", "two").into_record(None),
                    Document::new("a", "dup").into_record(None),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateDocument { .. }));
        assert_eq!(store.count("docs").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("closed.redb")).unwrap();
        store.create_collection("docs").await.unwrap();
        store.close().await.unwrap();

        let err = store
            .query("docs", &QueryRequest::new("anything"))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
