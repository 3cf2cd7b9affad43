//! SQLite collection store

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::CollectionStore;
use async_trait::async_trait;
use docwarden_core::{Collection, Embedder, HashEmbedder, RecordId, StoredRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite collection store
///
/// Records come back in insertion (rowid) order.
pub struct SqliteStore {
    conn: Mutex<Option<Connection>>,
    embedder: Box<dyn Embedder>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(|e| StorageError::Database(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Mutex::new(Some(conn)),
            embedder: Box::new(HashEmbedder::default()),
        };
        store.init_tables()?;
        store.migrate_to_latest()?;
        Ok(store)
    }

    /// Replace the embedder used for new documents and queries
    pub fn with_embedder(mut self, embedder: Box<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> StorageResult<T>) -> StorageResult<T> {
        let guard = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let conn = guard
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("sqlite store is closed".to_string()))?;
        f(conn)
    }

    fn init_tables(&self) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS collections (
                    name TEXT PRIMARY KEY,
                    data TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS documents (
                    collection TEXT NOT NULL,
                    record_key TEXT NOT NULL,
                    data TEXT NOT NULL,
                    PRIMARY KEY (collection, record_key)
                );

                CREATE TABLE IF NOT EXISTS meta (
                    key TEXT PRIMARY KEY,
                    value INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
                "#,
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
            Ok(())
        })
    }

    fn collection_exists(conn: &Connection, name: &str) -> StorageResult<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn require_collection(conn: &Connection, name: &str) -> StorageResult<()> {
        if Self::collection_exists(conn, name)? {
            Ok(())
        } else {
            Err(StorageError::CollectionNotFound(name.to_string()))
        }
    }
}

impl Migratable for SqliteStore {
    fn get_schema_version(&self) -> StorageResult<u32> {
        self.with_conn(|conn| {
            let version: Option<i64> = conn
                .query_row(
                    "SELECT value FROM meta WHERE key = 'schema_version'",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            u32::try_from(version.unwrap_or(0)).map_err(|e| StorageError::Migration(e.to_string()))
        })
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
                params![i64::from(version)],
            )?;
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
impl CollectionStore for SqliteStore {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        guard.take();
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(true)
        })
    }

    fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    async fn get_collection(&self, name: &str) -> StorageResult<Option<Collection>> {
        self.with_conn(|conn| {
            let data: Option<String> = conn
                .query_row(
                    "SELECT data FROM collections WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            match data {
                Some(data) => Ok(Some(serde_json::from_str(&data)?)),
                None => Ok(None),
            }
        })
    }

    async fn create_collection(&self, name: &str) -> StorageResult<Collection> {
        docwarden_core::limits::validate_collection_name(name)?;
        self.with_conn(|conn| {
            if Self::collection_exists(conn, name)? {
                return Err(StorageError::DuplicateCollection(name.to_string()));
            }
            let collection = Collection::new(name);
            let data = serde_json::to_string(&collection)?;
            conn.execute(
                "INSERT INTO collections (name, data) VALUES (?1, ?2)",
                params![name, data],
            )?;
            Ok(collection)
        })
    }

    async fn list_collections(&self) -> StorageResult<Vec<Collection>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT data FROM collections ORDER BY name")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

            let mut collections = Vec::new();
            for row in rows {
                collections.push(serde_json::from_str(&row?)?);
            }
            Ok(collections)
        })
    }

    async fn delete_collection(&self, name: &str) -> StorageResult<()> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            let deleted = tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
            if deleted == 0 {
                return Err(StorageError::CollectionNotFound(name.to_string()));
            }
            tx.execute("DELETE FROM documents WHERE collection = ?1", params![name])?;
            tx.commit()?;
            Ok(())
        })
    }

    async fn load_records(&self, collection: &str) -> StorageResult<Vec<StoredRecord>> {
        self.with_conn(|conn| {
            Self::require_collection(conn, collection)?;

            let mut stmt =
                conn.prepare("SELECT data FROM documents WHERE collection = ?1 ORDER BY rowid")?;
            let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

            let mut records = Vec::new();
            for row in rows {
                records.push(serde_json::from_str(&row?)?);
            }
            Ok(records)
        })
    }

    async fn insert_records(
        &self,
        collection: &str,
        records: Vec<StoredRecord>,
    ) -> StorageResult<()> {
        self.with_conn(|conn| {
            Self::require_collection(conn, collection)?;

            let tx = conn.unchecked_transaction()?;
            for record in &records {
                let key = record.id.storage_key();
                let exists: Option<i64> = tx
                    .query_row(
                        "SELECT 1 FROM documents WHERE collection = ?1 AND record_key = ?2",
                        params![collection, key],
                        |row| row.get(0),
                    )
                    .optional()?;
                if exists.is_some() {
                    return Err(StorageError::DuplicateDocument {
                        collection: collection.to_string(),
                        id: record.id.to_string(),
                    });
                }
                let data = serde_json::to_string(record)?;
                tx.execute(
                    "INSERT INTO documents (collection, record_key, data) VALUES (?1, ?2, ?3)",
                    params![collection, key, data],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    async fn remove_records(&self, collection: &str, ids: &[RecordId]) -> StorageResult<usize> {
        self.with_conn(|conn| {
            Self::require_collection(conn, collection)?;

            let tx = conn.unchecked_transaction()?;
            let mut removed = 0;
            for id in ids {
                removed += tx.execute(
                    "DELETE FROM documents WHERE collection = ?1 AND record_key = ?2",
                    params![collection, id.storage_key()],
                )?;
            }
            tx.commit()?;
            Ok(removed)
        })
    }

    async fn count(&self, collection: &str) -> StorageResult<usize> {
        self.with_conn(|conn| {
            Self::require_collection(conn, collection)?;
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        })
    }
}
