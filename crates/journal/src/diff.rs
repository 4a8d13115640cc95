//! Diffs between stored versions

use crate::error::Result;
use crate::journal::Journal;
use trail_core::{LineDiff, VersionId};

/// Line diff between two stored versions
#[derive(Debug, Clone)]
pub struct VersionDiff {
    pub from: VersionId,
    pub to: VersionId,
    pub lines: LineDiff,
}

impl VersionDiff {
    /// Unified diff with `Version <id>` headers
    pub fn unified(&self, context: usize) -> String {
        self.lines.unified(
            context,
            &format!("Version {}", self.from),
            &format!("Version {}", self.to),
        )
    }
}

impl Journal {
    /// Compare two versions by id
    ///
    /// Versions from different timelines may be compared; guarding against
    /// that is up to the caller.
    pub fn diff(&self, from: VersionId, to: VersionId) -> Result<VersionDiff> {
        let old = self.get(from)?;
        let new = self.get(to)?;

        Ok(VersionDiff {
            from,
            to,
            lines: LineDiff::with_timeout(
                old.content,
                new.content,
                self.config.diff_timeout(),
            ),
        })
    }
}
