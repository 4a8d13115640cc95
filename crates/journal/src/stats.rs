//! Store-wide counters and per-owner history summaries
//!
//! Both are answered from the head records alone: every head carries its
//! timeline's version and checkpoint counts, so no version is decoded to
//! count it.

use crate::codec::{self, decode, HeadRecord};
use crate::error::{Result, StoreError};
use crate::journal::Journal;
use std::collections::BTreeMap;
use trail_core::{OwnerId, OwnerKey, SubjectId, Version};

/// Version counts across the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub versions: u64,
    pub checkpoints: u64,
    /// Timelines with at least one version
    pub timelines: u64,
    pub by_owner: BTreeMap<OwnerId, u64>,
    pub by_subject: BTreeMap<SubjectId, u64>,
}

impl HistoryStats {
    pub fn auto_saves(&self) -> u64 {
        self.versions - self.checkpoints
    }

    fn add(&mut self, key: OwnerKey, head: &HeadRecord) {
        self.versions += head.count;
        self.checkpoints += head.checkpoints;
        self.timelines += 1;
        *self.by_owner.entry(key.owner).or_default() += head.count;
        *self.by_subject.entry(key.subject).or_default() += head.count;
    }
}

/// One of an owner's timelines with its newest versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSummary {
    pub key: OwnerKey,
    pub count: u64,
    pub checkpoints: u64,
    /// Newest first
    pub recent: Vec<Version>,
}

impl Journal {
    /// Count versions by owner, by subject and by kind
    pub fn stats(&self) -> Result<HistoryStats> {
        let mut stats = HistoryStats::default();
        for (key, head) in self.heads_under(&[])? {
            stats.add(key, &head);
        }

        tracing::debug!(
            versions = stats.versions,
            timelines = stats.timelines,
            "computed history stats"
        );
        Ok(stats)
    }

    /// Every non-empty timeline of `owner` in subject order, each with up to
    /// `recent` of its newest versions
    pub fn owner_history(&self, owner: OwnerId, recent: usize) -> Result<Vec<TimelineSummary>> {
        let mut summaries = Vec::new();
        for (key, head) in self.heads_under(&codec::owner_prefix(owner))? {
            let recent = if recent == 0 {
                Vec::new()
            } else {
                self.list(key, recent, None)?.items
            };
            summaries.push(TimelineSummary {
                key,
                count: head.count,
                checkpoints: head.checkpoints,
                recent,
            });
        }
        Ok(summaries)
    }

    fn heads_under(&self, prefix: &[u8]) -> Result<Vec<(OwnerKey, HeadRecord)>> {
        self.heads
            .scan_prefix(prefix)
            .map(|item| {
                let (raw_key, raw) = item?;
                let key = codec::parse_owner_key(&raw_key).ok_or_else(|| {
                    StoreError::Corrupt(format!("head key of {} bytes", raw_key.len()))
                })?;
                Ok((key, decode::<HeadRecord>(&raw)?))
            })
            .collect()
    }
}
