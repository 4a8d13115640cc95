//! Show the version history of a timeline

use crate::util::{self, Repo};
use anyhow::{Context, Result};
use journal::Cursor;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub fn run(
    dir: Option<&Path>,
    user: &str,
    game: &str,
    limit: Option<usize>,
    cursor: Option<&str>,
    json: bool,
) -> Result<()> {
    // 1. Open store and resolve the timeline
    let repo = Repo::open(dir)?;
    let (owner, subject, key) = repo.resolve_key(user, game)?;

    // 2. Fetch one page
    let cursor = cursor
        .map(Cursor::parse)
        .transpose()
        .context("Invalid --cursor")?;
    let page_size = limit.unwrap_or(repo.config.default_page_size);
    let page = repo.journal.list(key, page_size, cursor.as_ref())?;
    let preview_chars = repo.config.preview_chars;

    if json {
        let versions: Vec<_> = page
            .items
            .iter()
            .map(|v| {
                json!({
                    "id": v.id,
                    "message": v.annotation.clone().unwrap_or_default(),
                    "is_checkpoint": v.checkpoint,
                    "created_at": util::format_iso_time(v.created_at),
                    "preview": v.preview(preview_chars),
                })
            })
            .collect();
        return util::print_json(&json!({
            "versions": versions,
            "total": page.total,
            "limit": repo.config.clamp_page_size(page_size),
            "has_more": page.next_cursor.is_some(),
            "next_cursor": page.next_cursor,
        }));
    }

    // 3. Display
    println!(
        "{} {} / {} ({} versions)",
        "History".bold(),
        owner.name,
        subject.display_name,
        page.total
    );
    println!();

    if page.items.is_empty() {
        println!("{}", "No versions".dimmed());
        return Ok(());
    }

    for version in &page.items {
        let marker = if version.checkpoint { "*" } else { " " };
        let annotation = version.annotation.as_deref().unwrap_or("");
        println!(
            "{} {:>6}  {}  {}",
            marker.yellow().bold(),
            version.id.to_string().yellow(),
            util::format_relative_time(version.created_at).dimmed(),
            annotation.cyan()
        );

        let preview = version.preview(preview_chars);
        if let Some(first_line) = preview.lines().find(|l| !l.trim().is_empty()) {
            println!("           {}", first_line.dimmed());
        }
    }

    if let Some(next) = page.next_cursor {
        println!();
        println!("{} --cursor {}", "More:".dimmed(), next);
    }
    Ok(())
}
