//! Docwarden Maint - Bulk maintenance passes over document collections
//!
//! Provides the length pass (drop undersized, split or drop oversized
//! documents), keyword-match deletion and invalid-id cleanup. Every pass
//! reports failures to an injected [`ErrorLog`] and returns a typed error.

pub mod error;
pub mod errlog;
pub mod invalid_ids;
pub mod keyword;
pub mod lengths;
pub mod maintainer;
pub mod report;

pub use errlog::{ErrorEntry, ErrorLog, FileErrorLog, MemoryErrorLog, TracingErrorLog};
pub use error::{MaintenanceError, MaintResult};
pub use lengths::{plan_length_pass, LengthPlan};
pub use maintainer::Maintainer;
pub use report::{InvalidIdReport, KeywordDeleteReport, KeywordField, LengthOptions, LengthReport, Outcome};
