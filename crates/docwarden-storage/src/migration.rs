//! On-disk schema versioning for the persistent backends
//!
//! Each backend records the schema version it last wrote in its `meta`
//! table. Opening a store walks it forward one version at a time.

use crate::{StorageError, StorageResult};

/// Schema version written by this build
pub const CURRENT_VERSION: u32 = 1;

/// One step of the schema history
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
}

/// Every schema step, oldest first
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "collections, documents and meta tables",
}];

/// Look up the step that produces `version`
pub fn migration_for(version: u32) -> StorageResult<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .ok_or_else(|| StorageError::Migration(format!("no migration produces v{}", version)))
}

/// Implemented by backends that persist a schema version
pub trait Migratable {
    fn get_schema_version(&self) -> StorageResult<u32>;

    fn set_schema_version(&self, version: u32) -> StorageResult<()>;

    /// Apply the changes of a single step
    fn run_migration(&self, version: u32) -> StorageResult<()>;

    /// Bring the schema up to [`CURRENT_VERSION`].
    ///
    /// A store written by a newer build is refused rather than guessed at.
    fn migrate_to_latest(&self) -> StorageResult<()> {
        let found = self.get_schema_version()?;
        if found > CURRENT_VERSION {
            return Err(StorageError::Migration(format!(
                "store schema v{} is newer than supported v{}",
                found, CURRENT_VERSION
            )));
        }

        for version in found + 1..=CURRENT_VERSION {
            let step = migration_for(version)?;
            tracing::info!("Upgrading store schema to v{}: {}", version, step.description);
            self.run_migration(version)?;
            self.set_schema_version(version)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        version: Mutex<u32>,
        applied: Mutex<Vec<u32>>,
    }

    impl Migratable for Recorder {
        fn get_schema_version(&self) -> StorageResult<u32> {
            Ok(*self.version.lock().unwrap())
        }

        fn set_schema_version(&self, version: u32) -> StorageResult<()> {
            *self.version.lock().unwrap() = version;
            Ok(())
        }

        fn run_migration(&self, version: u32) -> StorageResult<()> {
            self.applied.lock().unwrap().push(version);
            Ok(())
        }
    }

    #[test]
    fn test_history_ends_at_current() {
        assert_eq!(MIGRATIONS.last().map(|m| m.version), Some(CURRENT_VERSION));
        assert!(migration_for(CURRENT_VERSION + 1).is_err());
    }

    #[test]
    fn test_fresh_store_upgrades_once() {
        let store = Recorder::default();
        store.migrate_to_latest().unwrap();
        store.migrate_to_latest().unwrap();
        assert_eq!(*store.applied.lock().unwrap(), vec![1]);
        assert_eq!(store.get_schema_version().unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_newer_store_is_refused() {
        let store = Recorder::default();
        store.set_schema_version(CURRENT_VERSION + 1).unwrap();
        let err = store.migrate_to_latest().unwrap_err();
        assert!(matches!(err, StorageError::Migration(_)));
        assert!(store.applied.lock().unwrap().is_empty());
    }
}
