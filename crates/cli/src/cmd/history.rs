//! One learner's history across every exercise

use crate::util::{self, Repo};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub fn run(dir: Option<&Path>, user: &str, recent: usize, json: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let owner = util::resolve_user(&repo.catalog, user)?;
    let timelines = repo.journal.owner_history(owner.id, recent)?;

    let mut games = Vec::with_capacity(timelines.len());
    for timeline in &timelines {
        let display_name = repo
            .catalog
            .subject(timeline.key.subject)?
            .map_or_else(|| timeline.key.subject.to_string(), |s| s.display_name);
        games.push((timeline, display_name));
    }

    if json {
        let body: Vec<_> = games
            .iter()
            .map(|(timeline, display_name)| {
                let versions: Vec<_> = timeline
                    .recent
                    .iter()
                    .map(|v| {
                        json!({
                            "id": v.id,
                            "message": v.annotation.clone().unwrap_or_default(),
                            "is_checkpoint": v.checkpoint,
                            "created_at": util::format_iso_time(v.created_at),
                        })
                    })
                    .collect();
                json!({
                    "game_id": timeline.key.subject,
                    "display_name": display_name,
                    "saves": timeline.count,
                    "checkpoints": timeline.checkpoints,
                    "versions": versions,
                })
            })
            .collect();
        return util::print_json(&json!({
            "user_id": owner.id,
            "username": owner.name,
            "games": body,
        }));
    }

    println!("{} {}", "History of".bold(), owner.name.bold());

    if games.is_empty() {
        println!();
        println!("{}", "No saves yet".dimmed());
        return Ok(());
    }

    for (timeline, display_name) in &games {
        println!();
        println!("{}: {} saves", display_name.cyan(), timeline.count);
        for version in &timeline.recent {
            let marker = if version.checkpoint { "*" } else { " " };
            println!(
                "  {} {:>6}  {}  {}",
                marker.yellow().bold(),
                version.id.to_string().yellow(),
                util::format_absolute_time(version.created_at),
                version.annotation.as_deref().unwrap_or("").dimmed()
            );
        }
        let shown = timeline.recent.len() as u64;
        if timeline.count > shown {
            println!("  {}", format!("... and {} more", timeline.count - shown).dimmed());
        }
    }
    Ok(())
}
