//! Append-only version journal using sled
//!
//! Every timeline is an ordered index of `(created_at, id)` positions under
//! its owner key. A save reads the head record, applies the dedup rule, and
//! appends the version, its index entry and the new head inside one sled
//! transaction, so concurrent saves to the same key serialize.

use crate::catalog::{self, Directory, Owner, SledCatalog};
use crate::codec::{self, decode, encode, HeadRecord};
use crate::error::{abort, Result, StoreError};
use sled::transaction::ConflictableTransactionError;
use sled::{Db, IVec, Transactional, Tree};
use std::path::Path;
use std::sync::Arc;
use trail_core::{
    hash_content, Current, OwnerId, OwnerKey, Position, SaveKind, SaveOutcome, StoreConfig,
    Version, VersionId,
};

/// File name of the sled database inside the data directory
pub const DB_DIR: &str = "versions.db";

/// Versioned code store
pub struct Journal {
    /// Sled database
    db: Db,
    /// version_id -> Version
    pub(crate) versions: Tree,
    /// owner key | created_at | id -> ()
    pub(crate) timeline: Tree,
    /// owner key -> HeadRecord
    pub(crate) heads: Tree,
    /// Catalog owner rows, consulted inside transactions
    owners: Tree,
    owner_names: Tree,
    /// True when `owners` is the identity source (built-in catalog)
    owns_identity: bool,
    /// Owner/subject oracle and template provider
    directory: Arc<dyn Directory>,
    pub(crate) config: StoreConfig,
}

/// Timelines selected for deletion, as scanned before the commit
pub(crate) struct PurgePlan {
    heads: Vec<(IVec, HeadRecord)>,
    entries: Vec<(IVec, VersionId)>,
}

impl Journal {
    /// Open or create a store in `dir`, using the built-in catalog
    pub fn open(dir: &Path, config: StoreConfig) -> Result<(Self, Arc<SledCatalog>)> {
        let db = sled::open(dir.join(DB_DIR))?;
        let catalog = Arc::new(SledCatalog::open(&db)?);
        let mut journal = Self::with_directory(db, config, catalog.clone())?;
        journal.owns_identity = true;
        Ok((journal, catalog))
    }

    /// Build a store over an open database with an external directory
    pub fn with_directory(
        db: Db,
        config: StoreConfig,
        directory: Arc<dyn Directory>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Ok(Self {
            versions: db.open_tree("versions")?,
            timeline: db.open_tree("timeline")?,
            heads: db.open_tree("heads")?,
            owners: db.open_tree(catalog::OWNERS_TREE)?,
            owner_names: db.open_tree(catalog::OWNER_NAMES_TREE)?,
            owns_identity: false,
            db,
            directory,
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Save program text to a timeline
    ///
    /// An auto-save whose content equals the head is suppressed and reports
    /// [`SaveOutcome::Unchanged`]; checkpoint saves always append.
    pub fn save(
        &self,
        key: OwnerKey,
        content: &str,
        annotation: Option<&str>,
        kind: SaveKind,
    ) -> Result<SaveOutcome> {
        self.check_content(content)?;
        let annotation = self.check_annotation(annotation)?;
        self.ensure_known(key)?;

        // Ids are drawn before the transaction; a suppressed save burns one.
        let id = VersionId(self.db.generate_id()? + 1);
        let content_hash = hash_content(content);
        let now = crate::now_ms();
        let head_key = codec::owner_key(key);
        let owner_row = codec::owner_prefix(key.owner);

        let outcome = (&self.versions, &self.timeline, &self.heads, &self.owners).transaction(
            |(versions, timeline, heads, owners)| {
                // Serializes with owner removal
                if self.owns_identity && owners.get(owner_row)?.is_none() {
                    return Err(abort(StoreError::not_found("owner", key.owner)));
                }

                let head = match heads.get(head_key)? {
                    Some(raw) => Some(decode::<HeadRecord>(&raw).map_err(abort)?),
                    None => None,
                };

                if let (SaveKind::Auto, Some(head)) = (kind, &head) {
                    if head.content_hash == content_hash {
                        let raw = versions
                            .get(codec::version_key(head.position.id))?
                            .ok_or_else(|| abort(missing_head(key, head.position.id)))?;
                        let stored: Version = decode(&raw).map_err(abort)?;
                        if stored.content == content {
                            return Ok(SaveOutcome::Unchanged {
                                head: head.position.id,
                            });
                        }
                    }
                }

                let position = next_position(head.as_ref().map(|h| h.position), now, id);
                let version = Version {
                    id,
                    key,
                    content: content.to_string(),
                    annotation: annotation.clone(),
                    checkpoint: kind.is_checkpoint(),
                    created_at: position.created_at,
                };
                let new_head = HeadRecord {
                    position,
                    content_hash,
                    count: head.map_or(0, |h| h.count) + 1,
                    checkpoints: head.map_or(0, |h| h.checkpoints) + u64::from(version.checkpoint),
                };

                versions.insert(&codec::version_key(id)[..], encode(&version).map_err(abort)?)?;
                timeline.insert(&codec::timeline_key(key, position)[..], Vec::<u8>::new())?;
                heads.insert(&head_key[..], encode(&new_head).map_err(abort)?)?;

                Ok::<_, ConflictableTransactionError<StoreError>>(SaveOutcome::Appended(version))
            },
        )?;

        if outcome.is_appended() {
            // Already committed; a failed flush is left to sled's background flusher
            if let Err(e) = self.db.flush() {
                tracing::warn!(key = %key, error = %e, "flush after append failed");
            }
        }

        match &outcome {
            SaveOutcome::Appended(version) => tracing::info!(
                key = %key,
                version = %version.id,
                checkpoint = version.checkpoint,
                hash = %content_hash.short(),
                "appended version"
            ),
            SaveOutcome::Unchanged { head } => {
                tracing::debug!(key = %key, head = %head, "auto-save unchanged, skipped")
            }
        }

        Ok(outcome)
    }

    /// Most recent version of a timeline, `None` when it has no history
    pub fn head(&self, key: OwnerKey) -> Result<Option<Version>> {
        match self.head_record(key)? {
            Some(head) => Ok(Some(self.get(head.position.id)?)),
            None => Ok(None),
        }
    }

    /// Current program: the head, or the subject's template for an empty timeline
    pub fn load(&self, key: OwnerKey) -> Result<Current> {
        if let Some(head) = self.head(key)? {
            return Ok(Current::Saved(head));
        }

        match self.directory.template(key.subject)? {
            Some(template) => Ok(Current::Template(template)),
            None => Err(StoreError::not_found("subject", key.subject)),
        }
    }

    /// Fetch a version by id
    pub fn get(&self, id: VersionId) -> Result<Version> {
        self.find(id)?
            .ok_or_else(|| StoreError::not_found("version", id))
    }

    /// Fetch a version by id, `None` when absent
    pub fn find(&self, id: VersionId) -> Result<Option<Version>> {
        match self.versions.get(codec::version_key(id))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Number of versions in a timeline
    pub fn count(&self, key: OwnerKey) -> Result<u64> {
        Ok(self.head_record(key)?.map_or(0, |h| h.count))
    }

    /// Delete one timeline; returns the number of versions removed
    pub fn purge(&self, key: OwnerKey) -> Result<u64> {
        let label = key.to_string();
        let plan = self.plan_purge(&codec::owner_key(key), &label)?;
        self.commit_purge(&plan, None, &label).map(|(_, removed)| removed)
    }

    /// Delete every timeline of an owner, keeping the owner itself
    pub fn purge_owner(&self, owner: OwnerId) -> Result<u64> {
        let label = owner.to_string();
        let plan = self.plan_purge(&codec::owner_prefix(owner), &label)?;
        self.commit_purge(&plan, None, &label).map(|(_, removed)| removed)
    }

    /// Delete an owner record and every timeline it has, in one commit
    ///
    /// Only available when the store was opened with its built-in catalog.
    /// A save racing the removal either lands before the scan, lands
    /// in between and turns the removal into a `Conflict`, or fails with
    /// `NotFound` once the owner is gone.
    pub fn remove_owner(&self, owner: OwnerId) -> Result<(Owner, u64)> {
        if !self.owns_identity {
            return Err(StoreError::InvalidArgument(
                "owners are managed by an external directory".to_string(),
            ));
        }

        let label = owner.to_string();
        let plan = self.plan_purge(&codec::owner_prefix(owner), &label)?;
        let (removed_owner, removed) = self.commit_purge(&plan, Some(owner), &label)?;
        let removed_owner = removed_owner.ok_or_else(|| StoreError::not_found("owner", owner))?;

        tracing::info!(owner = %owner, versions = removed, "removed owner");
        Ok((removed_owner, removed))
    }

    /// Flush pending writes to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn head_record(&self, key: OwnerKey) -> Result<Option<HeadRecord>> {
        match self.heads.get(codec::owner_key(key))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Scan the heads and index entries under `prefix`
    pub(crate) fn plan_purge(&self, prefix: &[u8], label: &str) -> Result<PurgePlan> {
        let heads = self.scan_heads(prefix)?;
        let entries = self.scan_entries(prefix, &heads, label)?;
        Ok(PurgePlan { heads, entries })
    }

    fn scan_heads(&self, prefix: &[u8]) -> Result<Vec<(IVec, HeadRecord)>> {
        self.heads
            .scan_prefix(prefix)
            .map(|item| {
                let (key, raw) = item?;
                Ok((key, decode::<HeadRecord>(&raw)?))
            })
            .collect()
    }

    /// Index entries under `prefix`; their number must match the scanned heads
    fn scan_entries(
        &self,
        prefix: &[u8],
        heads: &[(IVec, HeadRecord)],
        label: &str,
    ) -> Result<Vec<(IVec, VersionId)>> {
        let mut entries = Vec::new();
        for item in self.timeline.scan_prefix(prefix).keys() {
            let raw = item?;
            let (_, position) = codec::parse_timeline_key(&raw)
                .ok_or_else(|| StoreError::Corrupt(format!("timeline key of {} bytes", raw.len())))?;
            entries.push((raw, position.id));
        }

        let expected: u64 = heads.iter().map(|(_, head)| head.count).sum();
        if entries.len() as u64 != expected {
            tracing::warn!(scope = label, "timeline changed during purge scan");
            return Err(purge_conflict(label));
        }
        Ok(entries)
    }

    /// Remove a scanned plan, and optionally the owner row, in one transaction
    ///
    /// Fails with `Conflict` when any scanned head moved since the scan;
    /// nothing is removed in that case.
    pub(crate) fn commit_purge(
        &self,
        plan: &PurgePlan,
        owner: Option<OwnerId>,
        label: &str,
    ) -> Result<(Option<Owner>, u64)> {
        let removed_owner = (
            &self.versions,
            &self.timeline,
            &self.heads,
            &self.owners,
            &self.owner_names,
        )
            .transaction(|(versions, timeline, heads, owners, owner_names)| {
                for (head_key, scanned) in &plan.heads {
                    let unchanged = match heads.get(head_key)? {
                        Some(raw) => decode::<HeadRecord>(&raw).map_err(abort)? == *scanned,
                        None => false,
                    };
                    if !unchanged {
                        return Err(abort(purge_conflict(label)));
                    }
                    heads.remove(head_key.clone())?;
                }
                for (timeline_key, id) in &plan.entries {
                    timeline.remove(timeline_key.clone())?;
                    versions.remove(&codec::version_key(*id)[..])?;
                }

                let Some(owner) = owner else {
                    return Ok(None);
                };
                let row = codec::owner_prefix(owner);
                let raw = owners
                    .remove(&row[..])?
                    .ok_or_else(|| abort(StoreError::not_found("owner", owner)))?;
                let record: Owner = decode(&raw).map_err(abort)?;
                owner_names.remove(record.name.as_bytes())?;
                Ok::<_, ConflictableTransactionError<StoreError>>(Some(record))
            })?;

        let removed = plan.entries.len() as u64;
        tracing::info!(scope = label, removed, "purged history");
        Ok((removed_owner, removed))
    }

    fn ensure_known(&self, key: OwnerKey) -> Result<()> {
        if !self.directory.owner_exists(key.owner)? {
            return Err(StoreError::not_found("owner", key.owner));
        }
        if !self.directory.subject_exists(key.subject)? {
            return Err(StoreError::not_found("subject", key.subject));
        }
        Ok(())
    }

    fn check_content(&self, content: &str) -> Result<()> {
        if content.len() > self.config.max_content_bytes {
            return Err(StoreError::InvalidArgument(format!(
                "content is {} bytes, limit is {}",
                content.len(),
                self.config.max_content_bytes
            )));
        }
        Ok(())
    }

    fn check_annotation(&self, annotation: Option<&str>) -> Result<Option<String>> {
        let annotation = annotation.map(str::trim).filter(|a| !a.is_empty());
        if let Some(text) = annotation {
            let chars = text.chars().count();
            if chars > self.config.max_annotation_chars {
                return Err(StoreError::InvalidArgument(format!(
                    "annotation is {} characters, limit is {}",
                    chars, self.config.max_annotation_chars
                )));
            }
        }
        Ok(annotation.map(str::to_string))
    }
}

/// Position for a new version that sorts strictly after the head
fn next_position(head: Option<Position>, now: u64, id: VersionId) -> Position {
    let mut position = Position { created_at: now, id };
    if let Some(head) = head {
        position.created_at = position.created_at.max(head.created_at);
        if position <= head {
            position.created_at = head.created_at + 1;
        }
    }
    position
}

fn purge_conflict(label: &str) -> StoreError {
    StoreError::Conflict(format!("history of {} changed while purging", label))
}

fn missing_head(key: OwnerKey, id: VersionId) -> StoreError {
    StoreError::Corrupt(format!("head {} of {} has no version record", id, key))
}
