//! Show diff between versions

use crate::diff_utils;
use crate::util::{self, Repo};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;
use trail_core::VersionId;

pub fn run(dir: Option<&Path>, from: u64, to: u64, context: usize, json: bool) -> Result<()> {
    // 1. Open store
    let repo = Repo::open(dir)?;

    // 2. Compute diff
    let diff = repo.journal.diff(VersionId(from), VersionId(to))?;

    if json {
        let unified = diff.unified(context);
        let blocks: Vec<_> = diff.lines.blocks().collect();
        return util::print_json(&json!({
            "diff": unified.lines().collect::<Vec<_>>(),
            "blocks": blocks,
            "stats": diff.lines.stats(),
            "from_version": diff.from,
            "to_version": diff.to,
        }));
    }

    // 3. Display
    println!("{}", "Diff Summary".bold());
    println!("From: version {}", diff.from.to_string().yellow());
    println!("To:   version {}", diff.to.to_string().yellow());
    println!();

    if diff.lines.is_identical() {
        println!("{}", "No changes between versions".dimmed());
        return Ok(());
    }

    let stats = diff.lines.stats();
    println!(
        "{} {}",
        format!("+{}", stats.inserted).green(),
        format!("-{}", stats.deleted).red()
    );
    println!();
    print!("{}", diff_utils::colorize_unified(&diff.unified(context)));
    Ok(())
}
