//! Length pass: drop undersized documents, split or drop oversized ones
//!
//! The pass reads the collection once and classifies every record exactly
//! once against that snapshot. A record whose trimmed text is shorter than
//! `min_length` is undersized even when its raw text is also longer than
//! `max_length`, so whitespace padding is never split into fragments.

use std::collections::HashSet;

use docwarden_core::limits::{validate_length_bounds, MAX_BATCH_DOCUMENTS};
use docwarden_core::{
    chunk_text, fragment_id, text_len, Document, GetRequest, MetadataValue, RecordId,
    StoredRecord, SPLIT_FROM_KEY,
};
use docwarden_storage::CollectionStore;

use crate::error::MaintResult;
use crate::maintainer::Maintainer;
use crate::report::{LengthOptions, LengthReport};

const OPERATION: &str = "maintain_lengths";

/// What the length pass will do with a snapshot
#[derive(Debug, Default)]
pub struct LengthPlan {
    pub undersized: Vec<RecordId>,
    pub oversized: Vec<StoredRecord>,
}

impl LengthPlan {
    pub fn is_empty(&self) -> bool {
        self.undersized.is_empty() && self.oversized.is_empty()
    }
}

/// Classify each record of a snapshot
pub fn plan_length_pass(records: Vec<StoredRecord>, options: &LengthOptions) -> LengthPlan {
    let mut plan = LengthPlan::default();
    for record in records {
        let text = record.text();
        if text_len(text.trim()) < options.min_length {
            plan.undersized.push(record.id);
        } else if text_len(text) > options.max_length {
            plan.oversized.push(record);
        }
    }
    plan
}

/// Fragments replacing one oversized record
fn fragments_of(record: &StoredRecord, max_length: usize) -> Vec<Document> {
    let source = record.id.to_string();
    let mut metadata = record.metadata_or_empty();
    metadata.insert(SPLIT_FROM_KEY.to_string(), MetadataValue::from(source.as_str()));

    chunk_text(record.text(), max_length)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            Document::new(fragment_id(&source, i), chunk).with_metadata(metadata.clone())
        })
        .collect()
}

impl<S: CollectionStore + ?Sized> Maintainer<S> {
    /// Remove undersized documents and split or remove oversized ones
    pub async fn maintain_lengths(
        &self,
        collection: &str,
        options: &LengthOptions,
    ) -> MaintResult<LengthReport> {
        let result = self.run_length_pass(collection, options).await;
        self.logged(OPERATION, collection, result)
    }

    async fn run_length_pass(
        &self,
        collection: &str,
        options: &LengthOptions,
    ) -> MaintResult<LengthReport> {
        validate_length_bounds(options.min_length, options.max_length)?;
        self.require_collection(collection).await?;

        let snapshot = self
            .store
            .get(collection, &GetRequest::all())
            .await?
            .into_records();
        tracing::debug!("Length pass on {}: {} documents", collection, snapshot.len());

        let mut existing: HashSet<RecordId> = snapshot.iter().map(|r| r.id.clone()).collect();
        let plan = plan_length_pass(snapshot, options);
        let mut report = LengthReport::default();
        if plan.is_empty() {
            return Ok(report);
        }

        if !plan.undersized.is_empty() {
            self.store.delete(collection, &plan.undersized).await?;
            for id in &plan.undersized {
                existing.remove(id);
            }
            report.removed_empty = plan.undersized.iter().map(|id| id.to_string()).collect();
        }

        if options.delete_large {
            let ids: Vec<RecordId> = plan.oversized.iter().map(|r| r.id.clone()).collect();
            self.store.delete(collection, &ids).await?;
            report.removed_large = ids.iter().map(|id| id.to_string()).collect();
        } else if options.split_large {
            for record in &plan.oversized {
                // Fragments left by an interrupted earlier split stay as they are
                let fragments: Vec<Document> = fragments_of(record, options.max_length)
                    .into_iter()
                    .filter(|d| !existing.contains(&RecordId::from(d.id.as_str())))
                    .collect();
                let added: Vec<String> = fragments.iter().map(|d| d.id.clone()).collect();

                let mut fragments = fragments.into_iter().peekable();
                while fragments.peek().is_some() {
                    let batch: Vec<Document> =
                        fragments.by_ref().take(MAX_BATCH_DOCUMENTS).collect();
                    self.store.add(collection, batch).await?;
                }
                self.store
                    .delete(collection, std::slice::from_ref(&record.id))
                    .await?;

                tracing::debug!("Split {} into {} new fragments", record.id, added.len());
                report.split_large_count += 1;
                report.added_ids.extend(added);
            }
        }

        tracing::info!(
            "Length pass on {}: {} empty removed, {} large removed, {} split",
            collection,
            report.removed_empty.len(),
            report.removed_large.len(),
            report.split_large_count
        );
        Ok(report)
    }
}
