//! Learner management

use crate::util::{self, Repo};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub fn run_add(dir: Option<&Path>, name: &str) -> Result<()> {
    let repo = Repo::open(dir)?;
    let owner = repo.catalog.create_owner(name)?;

    println!("{} {} (id {})", "Added user".green(), owner.name.bold(), owner.id);
    Ok(())
}

pub fn run_list(dir: Option<&Path>, json: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let owners = repo.catalog.owners()?;

    if json {
        let body: Vec<_> = owners
            .iter()
            .map(|o| json!({ "id": o.id, "username": o.name }))
            .collect();
        return util::print_json(&body);
    }

    if owners.is_empty() {
        println!("{}", "No users yet".dimmed());
        return Ok(());
    }

    for owner in &owners {
        println!(
            "{:>5}  {}  {}",
            owner.id.to_string().yellow(),
            owner.name,
            util::format_relative_time(owner.created_at).dimmed()
        );
    }
    Ok(())
}

/// Remove a learner together with their history
pub fn run_remove(dir: Option<&Path>, user: &str, yes: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let owner = util::resolve_user(&repo.catalog, user)?;

    if !yes && !confirm(&format!("Remove user '{}' and all saved code?", owner.name))? {
        println!("Aborted");
        return Ok(());
    }

    let (_, removed) = repo
        .journal
        .remove_owner(owner.id)
        .with_context(|| format!("Failed to remove {}", owner.name))?;

    println!(
        "{} {} ({} versions deleted)",
        "Removed user".green(),
        owner.name.bold(),
        removed
    );
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
