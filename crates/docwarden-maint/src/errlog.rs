//! Error log sinks for failed maintenance passes
//!
//! Every public pass reports its failure to an [`ErrorLog`] before returning
//! it. The sink is injected into [`crate::Maintainer`], so tests can observe
//! entries through [`MemoryErrorLog`] while the binary appends to a file.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One failed maintenance pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub collection: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(
        operation: impl Into<String>,
        collection: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            collection: collection.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.operation,
            self.collection,
            self.message
        )
    }
}

/// Sink for maintenance failures.
///
/// Recording never fails the caller; sinks swallow their own I/O errors.
pub trait ErrorLog: Send + Sync {
    fn record(&self, entry: &ErrorEntry);
}

/// Appends one line per entry to a file
pub struct FileErrorLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl ErrorLog for FileErrorLog {
    fn record(&self, entry: &ErrorEntry) {
        let _guard = self.lock.lock();
        if let Err(e) = self.append(&entry.to_string()) {
            tracing::warn!("Failed to write error log {}: {}", self.path.display(), e);
        }
    }
}

/// Keeps entries in memory
#[derive(Default)]
pub struct MemoryErrorLog {
    entries: Mutex<Vec<ErrorEntry>>,
}

impl MemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorLog for MemoryErrorLog {
    fn record(&self, entry: &ErrorEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

/// Emits entries as tracing events only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorLog;

impl ErrorLog for TracingErrorLog {
    fn record(&self, entry: &ErrorEntry) {
        tracing::error!(
            operation = %entry.operation,
            collection = %entry.collection,
            "{}",
            entry.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_entry_line_format() {
        let mut entry = ErrorEntry::new("maintain_lengths", "docs", "Collection not found: docs");
        entry.timestamp = DateTime::parse_from_rfc3339("2024-05-01T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            entry.to_string(),
            "[2024-05-01T12:30:00Z] maintain_lengths (docs): Collection not found: docs"
        );
    }

    #[test]
    fn test_file_log_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("errors.log");
        let log = FileErrorLog::new(&path);

        log.record(&ErrorEntry::new("delete_by_keyword", "a", "first"));
        log.record(&ErrorEntry::new("cleanup_invalid_ids", "b", "second"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("delete_by_keyword (a): first"));
        assert!(lines[1].ends_with("cleanup_invalid_ids (b): second"));
    }

    #[test]
    fn test_memory_log() {
        let log = MemoryErrorLog::new();
        assert!(log.is_empty());
        log.record(&ErrorEntry::new("op", "c", "msg"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].operation, "op");
    }
}
