//! Removal of records whose id is not a string

use docwarden_core::{GetRequest, Include, RecordId};
use docwarden_storage::CollectionStore;

use crate::error::MaintResult;
use crate::maintainer::Maintainer;
use crate::report::InvalidIdReport;

const OPERATION: &str = "cleanup_invalid_ids";

impl<S: CollectionStore + ?Sized> Maintainer<S> {
    /// Delete every record with a non-string id. Running it twice in a row
    /// reports nothing the second time.
    pub async fn cleanup_invalid_ids(&self, collection: &str) -> MaintResult<InvalidIdReport> {
        let result = self.run_invalid_id_cleanup(collection).await;
        self.logged(OPERATION, collection, result)
    }

    async fn run_invalid_id_cleanup(&self, collection: &str) -> MaintResult<InvalidIdReport> {
        self.require_collection(collection).await?;

        let ids = self
            .store
            .get(collection, &GetRequest::all().with_include(Include::ids_only()))
            .await?
            .ids;
        let invalid: Vec<RecordId> = ids.into_iter().filter(|id| !id.is_text()).collect();
        if invalid.is_empty() {
            return Ok(InvalidIdReport::default());
        }

        self.store.delete(collection, &invalid).await?;
        tracing::info!("Removed {} invalid ids from {}", invalid.len(), collection);

        Ok(InvalidIdReport {
            removed_count: invalid.len(),
            removed_ids: invalid.iter().map(|id| id.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errlog::MemoryErrorLog;
    use crate::error::MaintenanceError;
    use docwarden_core::{Document, StoredRecord};
    use docwarden_storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn corrupt(id: serde_json::Value, text: &str) -> StoredRecord {
        StoredRecord {
            id: RecordId::Other(id),
            document: Some(text.to_string()),
            metadata: None,
            embedding: None,
        }
    }

    async fn seeded() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.create_collection("docs").await.unwrap();
        store
            .add("docs", vec![Document::new("good", "fine")])
            .await
            .unwrap();
        store
            .insert_records(
                "docs",
                vec![corrupt(json!(42), "numeric id"), corrupt(json!(null), "null id")],
            )
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let store = seeded().await;
        let maint = Maintainer::with_tracing_log(store.clone());

        let first = maint.cleanup_invalid_ids("docs").await.unwrap();
        assert_eq!(first.removed_count, 2);
        assert_eq!(first.removed_ids, vec!["42", "null"]);
        assert_eq!(store.count("docs").await.unwrap(), 1);

        let second = maint.cleanup_invalid_ids("docs").await.unwrap();
        assert_eq!(second, InvalidIdReport::default());
    }

    #[tokio::test]
    async fn test_string_that_looks_numeric_is_kept() {
        let store = Arc::new(MemoryStore::new());
        store.create_collection("docs").await.unwrap();
        store
            .add("docs", vec![Document::new("42", "string id")])
            .await
            .unwrap();
        store
            .insert_records("docs", vec![corrupt(json!(42), "numeric id")])
            .await
            .unwrap();

        let maint = Maintainer::with_tracing_log(store.clone());
        let report = maint.cleanup_invalid_ids("docs").await.unwrap();
        assert_eq!(report.removed_count, 1);

        let remaining = store.get("docs", &GetRequest::all()).await.unwrap();
        assert_eq!(remaining.ids, vec![RecordId::from("42")]);
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let log = Arc::new(MemoryErrorLog::new());
        let maint = Maintainer::new(Arc::new(MemoryStore::new()), log.clone());

        let err = maint.cleanup_invalid_ids("ghost").await.unwrap_err();
        assert!(matches!(err, MaintenanceError::CollectionNotFound(_)));
        assert_eq!(log.entries()[0].operation, "cleanup_invalid_ids");
    }
}
