//! Restoring a historical version
//!
//! Restore never rewrites history: the target's content is saved again as a
//! new checkpoint at the head of the same timeline.

use crate::error::{Result, StoreError};
use crate::journal::Journal;
use trail_core::{OwnerKey, SaveKind, SaveOutcome, Version, VersionId};

impl Journal {
    /// Make `target`'s content the current program of `key`
    ///
    /// Fails with `NotFound` for an unknown target and `InvalidArgument`
    /// when the target belongs to another timeline.
    pub fn restore(&self, key: OwnerKey, target: VersionId) -> Result<Version> {
        let source = self.get(target)?;
        if source.key != key {
            return Err(StoreError::InvalidArgument(format!(
                "version {} belongs to {}, not {}",
                target, source.key, key
            )));
        }

        let annotation = restore_annotation(target);
        match self.save(key, &source.content, Some(&annotation), SaveKind::Checkpoint)? {
            SaveOutcome::Appended(version) => {
                tracing::info!(key = %key, from = %target, version = %version.id, "restored version");
                Ok(version)
            }
            // Checkpoint saves bypass dedup
            SaveOutcome::Unchanged { head } => Err(StoreError::Corrupt(format!(
                "checkpoint restoring {} was suppressed at head {}",
                target, head
            ))),
        }
    }
}

/// Annotation recorded on restore checkpoints
pub fn restore_annotation(target: VersionId) -> String {
    format!("Restored from version {}", target)
}
