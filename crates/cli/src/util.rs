//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use journal::{Journal, Owner, SledCatalog, Subject, DB_DIR};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trail_core::{OwnerId, OwnerKey, StoreConfig, SubjectId};

/// Name of the store directory created by `trail init`
pub const STORE_DIR: &str = ".trail";

/// Find the store by walking up from cwd to find .trail/
pub fn find_store_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()
        .context("Failed to get current directory")?;

    loop {
        let store_dir = current.join(STORE_DIR);
        if store_dir.is_dir() {
            return Ok(store_dir);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => anyhow::bail!("Not a Codetrail store (no .trail directory found)"),
        }
    }
}

/// Store directory from `--dir`, or the nearest one above cwd
pub fn store_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => {
            if !dir.join(DB_DIR).exists() {
                anyhow::bail!("Not a Codetrail store: {}", dir.display());
            }
            Ok(dir.to_path_buf())
        }
        None => find_store_dir(),
    }
}

/// An opened store: journal, catalog, and the config they were opened with
pub struct Repo {
    pub config: StoreConfig,
    pub journal: Journal,
    pub catalog: Arc<SledCatalog>,
}

impl Repo {
    pub fn open(explicit: Option<&Path>) -> Result<Self> {
        let dir = store_dir(explicit)?;
        let config = StoreConfig::load(&dir)?;
        let (journal, catalog) = Journal::open(&dir, config.clone())
            .context("Failed to open version store")?;

        Ok(Self {
            config,
            journal,
            catalog,
        })
    }

    /// Resolve a learner and an exercise into a timeline key
    pub fn resolve_key(&self, user: &str, game: &str) -> Result<(Owner, Subject, OwnerKey)> {
        let owner = resolve_user(&self.catalog, user)?;
        let subject = resolve_game(&self.catalog, game)?;
        let key = OwnerKey::new(owner.id, subject.id);
        Ok((owner, subject, key))
    }
}

/// Resolve a learner reference
/// Supports:
/// - Numeric id: "3"
/// - Name: "ada"
pub fn resolve_user(catalog: &SledCatalog, reference: &str) -> Result<Owner> {
    if let Ok(id) = reference.parse::<u64>() {
        if let Some(owner) = catalog.owner(OwnerId(id))? {
            return Ok(owner);
        }
    }

    catalog
        .owner_by_name(reference)?
        .ok_or_else(|| anyhow::anyhow!("Unknown user: '{}'", reference))
}

/// Resolve an exercise reference by id or name
pub fn resolve_game(catalog: &SledCatalog, reference: &str) -> Result<Subject> {
    if let Ok(id) = reference.parse::<u64>() {
        if let Some(subject) = catalog.subject(SubjectId(id))? {
            return Ok(subject);
        }
    }

    catalog
        .subject_by_name(reference)?
        .ok_or_else(|| anyhow::anyhow!("Unknown game: '{}'", reference))
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts_ms: u64) -> String {
    relative_to(ts_ms, Utc::now())
}

fn relative_to(ts_ms: u64, now: DateTime<Utc>) -> String {
    let Some(then) = utc(ts_ms) else {
        return "unknown time".to_string();
    };

    let seconds = (now - then).num_seconds();
    if seconds < 0 {
        "in the future".to_string()
    } else if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Format timestamp as local absolute time ("2024-01-03 14:30:00")
pub fn format_absolute_time(ts_ms: u64) -> String {
    match utc(ts_ms) {
        Some(time) => time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown time".to_string(),
    }
}

/// RFC 3339 timestamp for machine output
pub fn format_iso_time(ts_ms: u64) -> String {
    match utc(ts_ms) {
        Some(time) => time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        None => ts_ms.to_string(),
    }
}

fn utc(ts_ms: u64) -> Option<DateTime<Utc>> {
    let ms = i64::try_from(ts_ms).ok()?;
    Utc.timestamp_millis_opt(ms).single()
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
    println!("{}", text);
    Ok(())
}
