//! Save a program

use crate::util::{self, Repo};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::json;
use std::io::Read;
use std::path::Path;
use trail_core::{SaveKind, SaveOutcome};

pub fn run(
    dir: Option<&Path>,
    user: &str,
    game: &str,
    file: Option<&Path>,
    checkpoint: bool,
    message: Option<&str>,
    json: bool,
) -> Result<()> {
    // 1. Open store and resolve the timeline
    let repo = Repo::open(dir)?;
    let (owner, subject, key) = repo.resolve_key(user, game)?;

    // 2. Read the program text
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read program from stdin")?;
            buf
        }
    };

    // 3. Save
    let kind = if checkpoint {
        SaveKind::Checkpoint
    } else {
        SaveKind::Auto
    };
    let outcome = repo
        .journal
        .save(key, &content, message, kind)
        .with_context(|| format!("Failed to save code for {} in {}", owner.name, subject.name))?;

    // 4. Report
    match &outcome {
        SaveOutcome::Appended(version) => {
            if json {
                return util::print_json(&json!({
                    "message": "Code saved successfully",
                    "version_id": version.id,
                    "created_at": util::format_iso_time(version.created_at),
                }));
            }
            let label = if version.checkpoint { "checkpoint" } else { "version" };
            println!("{} {} {}", "Saved".green(), label, version.id.to_string().yellow());
        }
        SaveOutcome::Unchanged { head } => {
            if json {
                return util::print_json(&json!({
                    "message": "No changes detected",
                    "version_id": head,
                }));
            }
            println!(
                "{} (head is still version {})",
                "No changes detected".dimmed(),
                head.to_string().yellow()
            );
        }
    }
    Ok(())
}
