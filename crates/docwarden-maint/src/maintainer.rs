//! Maintenance pass runner

use docwarden_storage::CollectionStore;
use std::sync::Arc;

use crate::errlog::{ErrorEntry, ErrorLog, TracingErrorLog};
use crate::error::{MaintResult, MaintenanceError};

/// Runs maintenance passes against one store.
///
/// The passes themselves live in [`crate::lengths`], [`crate::keyword`] and
/// [`crate::invalid_ids`]. Each public pass records its failure to the
/// error log before handing it back.
pub struct Maintainer<S: CollectionStore + ?Sized> {
    pub(crate) store: Arc<S>,
    error_log: Arc<dyn ErrorLog>,
}

impl<S: CollectionStore + ?Sized> Maintainer<S> {
    pub fn new(store: Arc<S>, error_log: Arc<dyn ErrorLog>) -> Self {
        Self { store, error_log }
    }

    /// Maintainer that reports failures through tracing only
    pub fn with_tracing_log(store: Arc<S>) -> Self {
        Self::new(store, Arc::new(TracingErrorLog))
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub(crate) async fn require_collection(&self, collection: &str) -> MaintResult<()> {
        match self.store.get_collection(collection).await? {
            Some(_) => Ok(()),
            None => Err(MaintenanceError::CollectionNotFound(collection.to_string())),
        }
    }

    /// Record a failed pass and pass the result through
    pub(crate) fn logged<T>(
        &self,
        operation: &str,
        collection: &str,
        result: MaintResult<T>,
    ) -> MaintResult<T> {
        if let Err(e) = &result {
            tracing::warn!("{} on {} failed: {}", operation, collection, e);
            self.error_log
                .record(&ErrorEntry::new(operation, collection, e.to_string()));
        }
        result
    }
}
