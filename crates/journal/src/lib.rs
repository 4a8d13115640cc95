//! Versioned code store
//!
//! This crate provides:
//! - Append-only per-(owner, subject) timelines (sled embedded DB)
//! - Dedup of unchanged automatic saves
//! - Cursor-stable history pagination
//! - Diffs between versions and non-destructive restore
//! - Owner/subject catalog, with atomic owner removal
//! - Store-wide stats and per-owner history

pub mod catalog;
pub mod codec;
pub mod diff;
pub mod error;
pub mod journal;
pub mod page;
pub mod restore;
pub mod stats;

// Re-exports
pub use catalog::{Directory, MemoryDirectory, NewSubject, Owner, SledCatalog, Subject};
pub use diff::VersionDiff;
pub use error::{ErrorKind, Result, StoreError};
pub use journal::{Journal, DB_DIR};
pub use page::{Cursor, Page};
pub use restore::restore_annotation;
pub use stats::{HistoryStats, TimelineSummary};

/// Current time as Unix milliseconds
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
