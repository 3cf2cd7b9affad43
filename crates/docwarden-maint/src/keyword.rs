//! Keyword-match bulk delete

use docwarden_core::limits::validate_keyword;
use docwarden_core::{GetRequest, Include, RecordId, StoredRecord};
use docwarden_storage::CollectionStore;

use crate::error::MaintResult;
use crate::maintainer::Maintainer;
use crate::report::{KeywordDeleteReport, KeywordField};

const OPERATION: &str = "delete_by_keyword";

/// Whether a record contains the keyword in the chosen field
pub fn record_matches(record: &StoredRecord, keyword: &str, field: KeywordField) -> bool {
    match field {
        KeywordField::Documents => record.text().contains(keyword),
        KeywordField::Metadatas => record
            .metadata
            .as_ref()
            .is_some_and(|meta| meta.values().any(|v| v.to_string().contains(keyword))),
    }
}

impl<S: CollectionStore + ?Sized> Maintainer<S> {
    /// Delete every document whose text, or any metadata value, contains
    /// `keyword`. Invalid ids are cleaned up first.
    pub async fn delete_by_keyword(
        &self,
        collection: &str,
        keyword: &str,
        field: KeywordField,
    ) -> MaintResult<KeywordDeleteReport> {
        let result = self.run_keyword_delete(collection, keyword, field).await;
        self.logged(OPERATION, collection, result)
    }

    async fn run_keyword_delete(
        &self,
        collection: &str,
        keyword: &str,
        field: KeywordField,
    ) -> MaintResult<KeywordDeleteReport> {
        validate_keyword(keyword)?;

        // Already logged by the cleanup itself
        if let Err(e) = self.cleanup_invalid_ids(collection).await {
            tracing::debug!("Continuing keyword delete after failed cleanup: {}", e);
        }

        self.require_collection(collection).await?;

        let include = Include {
            documents: field == KeywordField::Documents,
            metadatas: field == KeywordField::Metadatas,
            embeddings: false,
        };
        let records = self
            .store
            .get(collection, &GetRequest::all().with_include(include))
            .await?
            .into_records();

        let matched: Vec<RecordId> = records
            .into_iter()
            .filter(|r| record_matches(r, keyword, field))
            .map(|r| r.id)
            .collect();

        if matched.is_empty() {
            return Ok(KeywordDeleteReport {
                deleted_count: 0,
                deleted_ids: Vec::new(),
                message: format!("No documents contain '{}' in {}", keyword, field),
            });
        }

        self.store.delete(collection, &matched).await?;
        tracing::info!(
            "Deleted {} documents containing '{}' from {}",
            matched.len(),
            keyword,
            collection
        );

        Ok(KeywordDeleteReport {
            deleted_count: matched.len(),
            deleted_ids: matched.iter().map(|id| id.to_string()).collect(),
            message: format!(
                "Deleted {} documents containing '{}' in {}",
                matched.len(),
                keyword,
                field
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errlog::MemoryErrorLog;
    use crate::error::MaintenanceError;
    use docwarden_core::Document;
    use docwarden_storage::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    async fn seeded() -> (Maintainer<MemoryStore>, Arc<MemoryErrorLog>) {
        let store = Arc::new(MemoryStore::new());
        store.create_collection("logs").await.unwrap();
        store
            .add(
                "logs",
                vec![
                    Document::new("d0", "系统运行正常").with_meta("level", "info"),
                    Document::new("d1", "发生错误: 连接超时").with_meta("level", "error"),
                    Document::new("d2", "everything is fine"),
                    Document::new("d3", "磁盘错误").with_meta("level", "error"),
                    Document::new("d4", "retrying").with_meta("attempt", 3i64),
                ],
            )
            .await
            .unwrap();
        let log = Arc::new(MemoryErrorLog::new());
        (Maintainer::new(store, log.clone()), log)
    }

    #[tokio::test]
    async fn test_delete_by_keyword_in_documents() {
        let (maint, log) = seeded().await;

        let report = maint
            .delete_by_keyword("logs", "错误", KeywordField::Documents)
            .await
            .unwrap();
        assert_eq!(report.deleted_count, 2);
        assert_eq!(report.deleted_ids, vec!["d1", "d3"]);
        assert!(report.message.contains("Deleted 2"));
        assert_eq!(maint.store().count("logs").await.unwrap(), 3);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_keyword_in_metadatas() {
        let (maint, _) = seeded().await;

        let report = maint
            .delete_by_keyword("logs", "err", KeywordField::Metadatas)
            .await
            .unwrap();
        assert_eq!(report.deleted_ids, vec!["d1", "d3"]);

        let report = maint
            .delete_by_keyword("logs", "3", KeywordField::Metadatas)
            .await
            .unwrap();
        assert_eq!(report.deleted_ids, vec!["d4"]);
    }

    #[tokio::test]
    async fn test_no_match_is_not_an_error() {
        let (maint, log) = seeded().await;

        let report = maint
            .delete_by_keyword("logs", "panic", KeywordField::Documents)
            .await
            .unwrap();
        assert_eq!(report.deleted_count, 0);
        assert!(report.deleted_ids.is_empty());
        assert!(report.message.starts_with("No documents"));
        assert_eq!(maint.store().count("logs").await.unwrap(), 5);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_ids_are_cleaned_first() {
        let (maint, _) = seeded().await;
        maint
            .store()
            .insert_records(
                "logs",
                vec![StoredRecord {
                    id: RecordId::Other(json!(7)),
                    document: Some("unrelated".to_string()),
                    metadata: None,
                    embedding: None,
                }],
            )
            .await
            .unwrap();

        let report = maint
            .delete_by_keyword("logs", "fine", KeywordField::Documents)
            .await
            .unwrap();
        assert_eq!(report.deleted_ids, vec!["d2"]);
        assert_eq!(maint.store().count("logs").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_missing_collection_logs_both_steps() {
        let (maint, log) = seeded().await;

        let err = maint
            .delete_by_keyword("nope", "x", KeywordField::Documents)
            .await
            .unwrap_err();
        assert!(matches!(err, MaintenanceError::CollectionNotFound(_)));

        let ops: Vec<String> = log.entries().into_iter().map(|e| e.operation).collect();
        assert_eq!(ops, vec!["cleanup_invalid_ids", "delete_by_keyword"]);
    }

    #[tokio::test]
    async fn test_empty_keyword_rejected() {
        let (maint, _) = seeded().await;
        let err = maint
            .delete_by_keyword("logs", "", KeywordField::Documents)
            .await
            .unwrap_err();
        assert!(matches!(err, MaintenanceError::InvalidArgument(_)));
        assert_eq!(maint.store().count("logs").await.unwrap(), 5);
    }

    #[test]
    fn test_record_matches_without_metadata() {
        let record = Document::new("a", "text").into_record(None);
        assert!(!record_matches(&record, "text", KeywordField::Metadatas));
        assert!(record_matches(&record, "ex", KeywordField::Documents));
    }

    #[test]
    fn test_record_matches_float_metadata() {
        let record = Document::new("a", "text")
            .with_meta("score", 1.0f64)
            .into_record(None);
        assert!(record_matches(&record, "1.0", KeywordField::Metadatas));
        assert!(!record_matches(&record, "2.0", KeywordField::Metadatas));
    }
}
