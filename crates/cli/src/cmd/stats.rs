//! Store-wide statistics

use crate::util::{self, Repo};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;
use trail_core::{OwnerId, SubjectId};

/// Show learner, exercise and save counts
pub fn run(dir: Option<&Path>, json: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let owners = repo.catalog.owners()?;
    let subjects = repo.catalog.subjects()?;
    let stats = repo.journal.stats()?;

    let saves_of_owner = |id: OwnerId| stats.by_owner.get(&id).copied().unwrap_or(0);
    let saves_of_subject = |id: SubjectId| stats.by_subject.get(&id).copied().unwrap_or(0);

    if json {
        let users: Vec<_> = owners
            .iter()
            .map(|o| json!({ "id": o.id, "username": o.name, "saves": saves_of_owner(o.id) }))
            .collect();
        let games: Vec<_> = subjects
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "display_name": s.display_name,
                    "saves": saves_of_subject(s.id),
                })
            })
            .collect();
        return util::print_json(&json!({
            "total_users": owners.len(),
            "total_games": subjects.len(),
            "total_saves": stats.versions,
            "checkpoints": stats.checkpoints,
            "auto_saves": stats.auto_saves(),
            "users": users,
            "games": games,
        }));
    }

    println!("{}", "Codetrail Statistics".bold());
    println!();

    println!("{} {}", "Users:".bold(), owners.len());
    for owner in &owners {
        println!("  {:<20} {} saves", owner.name, saves_of_owner(owner.id));
    }
    println!();

    println!("{} {}", "Games:".bold(), subjects.len());
    for subject in &subjects {
        println!(
            "  {:<20} {} saves",
            subject.display_name,
            saves_of_subject(subject.id)
        );
    }
    println!();

    println!("{} {}", "Saves:".bold(), stats.versions);
    println!("  Checkpoints:  {}", stats.checkpoints.to_string().yellow());
    println!("  Auto-saves:   {}", stats.auto_saves());
    println!("  Timelines:    {}", stats.timelines.to_string().dimmed());

    Ok(())
}
