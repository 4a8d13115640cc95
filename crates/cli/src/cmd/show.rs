//! Show version details

use crate::util::{self, Repo};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;
use trail_core::{hash_content, VersionId};

/// Show detailed information about a version
pub fn run(dir: Option<&Path>, version_id: u64, json: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let version = repo.journal.get(VersionId(version_id))?;

    if json {
        return util::print_json(&json!({
            "id": version.id,
            "code": version.content,
            "message": version.annotation.clone().unwrap_or_default(),
            "is_checkpoint": version.checkpoint,
            "created_at": util::format_iso_time(version.created_at),
        }));
    }

    let owner = repo.catalog.owner(version.key.owner)?;
    let subject = repo.catalog.subject(version.key.subject)?;

    println!("{} {}", "version".yellow().bold(), version.id.to_string().cyan());
    println!(
        "{} {}",
        "User:      ".dimmed(),
        owner.map_or_else(|| version.key.owner.to_string(), |o| o.name)
    );
    println!(
        "{} {}",
        "Game:      ".dimmed(),
        subject.map_or_else(|| version.key.subject.to_string(), |s| s.display_name)
    );
    println!(
        "{} {} ({})",
        "Date:      ".dimmed(),
        util::format_absolute_time(version.created_at),
        util::format_relative_time(version.created_at).dimmed()
    );
    println!(
        "{} {}",
        "Kind:      ".dimmed(),
        if version.checkpoint { "checkpoint" } else { "auto-save" }
    );
    if let Some(annotation) = &version.annotation {
        println!("{} {}", "Message:   ".dimmed(), annotation);
    }
    println!(
        "{} {}",
        "Content:   ".dimmed(),
        hash_content(&version.content).short().bright_green()
    );

    println!();
    print!("{}", version.content);
    if !version.content.is_empty() && !version.content.ends_with('\n') {
        println!();
    }
    Ok(())
}
