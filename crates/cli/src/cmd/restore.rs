//! Restore an earlier version

use crate::util::{self, Repo};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;
use trail_core::VersionId;

pub fn run(dir: Option<&Path>, user: &str, game: &str, version: u64, json: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let (_, _, key) = repo.resolve_key(user, game)?;

    let restored = repo
        .journal
        .restore(key, VersionId(version))
        .with_context(|| format!("Failed to restore version {}", version))?;

    if json {
        return util::print_json(&json!({
            "message": "Version restored successfully",
            "version_id": restored.id,
            "code": restored.content,
        }));
    }

    println!(
        "{} version {} as {}",
        "Restored".green(),
        version.to_string().yellow(),
        restored.id.to_string().yellow().bold()
    );
    Ok(())
}
