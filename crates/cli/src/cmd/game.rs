//! Exercise management

use crate::util::{self, Repo};
use anyhow::{Context, Result};
use journal::NewSubject;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub fn run_add(
    dir: Option<&Path>,
    name: &str,
    display_name: Option<String>,
    description: Option<String>,
    template: Option<&Path>,
) -> Result<()> {
    let repo = Repo::open(dir)?;

    let template = match template {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?,
        None => String::new(),
    };

    let subject = repo.catalog.create_subject(NewSubject {
        name: name.to_string(),
        display_name: display_name.unwrap_or_default(),
        description,
        template,
    })?;

    println!(
        "{} {} (id {})",
        "Added game".green(),
        subject.display_name.bold(),
        subject.id
    );
    Ok(())
}

pub fn run_list(dir: Option<&Path>, json: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let subjects = repo.catalog.subjects()?;

    if json {
        let body: Vec<_> = subjects
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "name": s.name,
                    "display_name": s.display_name,
                    "description": s.description,
                })
            })
            .collect();
        return util::print_json(&body);
    }

    if subjects.is_empty() {
        println!("{}", "No games yet".dimmed());
        return Ok(());
    }

    for subject in &subjects {
        println!(
            "{:>5}  {}  {}",
            subject.id.to_string().yellow(),
            subject.name.bold(),
            subject.display_name
        );
        if let Some(description) = &subject.description {
            println!("       {}", description.dimmed());
        }
    }
    Ok(())
}
