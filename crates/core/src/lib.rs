//! Codetrail core - domain types shared by the version store
//!
//! This crate provides:
//! - Owner keys, version records, and save outcomes
//! - BLAKE3 content hashing
//! - Line-oriented diffing
//! - Store configuration

pub mod config;
pub mod diff;
pub mod hash;
pub mod version;

// Re-export main types for convenience
pub use config::StoreConfig;
pub use diff::{DiffBlock, DiffOp, DiffStats, LineDiff};
pub use hash::{hash_content, ContentHash};
pub use version::{
    Current, OwnerId, OwnerKey, Position, SaveKind, SaveOutcome, SubjectId, Version, VersionId,
};
