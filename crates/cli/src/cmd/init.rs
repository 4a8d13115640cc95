//! Create a Codetrail store

use crate::util::STORE_DIR;
use anyhow::{Context, Result};
use journal::{Journal, DB_DIR};
use owo_colors::OwoColorize;
use std::path::Path;
use trail_core::config::CONFIG_FILE;
use trail_core::StoreConfig;

pub fn run(dir: Option<&Path>) -> Result<()> {
    // 1. Pick the store location
    let store_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()
            .context("Failed to get current directory")?
            .join(STORE_DIR),
    };

    if store_dir.join(DB_DIR).exists() {
        anyhow::bail!("Codetrail store already initialized at {}", store_dir.display());
    }

    // 2. Write the default config unless one is already there
    std::fs::create_dir_all(&store_dir)
        .with_context(|| format!("Failed to create {}", store_dir.display()))?;
    let config = StoreConfig::load(&store_dir)?;
    if !store_dir.join(CONFIG_FILE).exists() {
        config.save(&store_dir)?;
    }

    // 3. Create the database
    let (journal, _catalog) = Journal::open(&store_dir, config)
        .context("Failed to create version store")?;
    journal.flush()?;

    println!("{} {}", "Initialized Codetrail store at".green(), store_dir.display());
    println!();
    println!("Created:");
    println!("  - {}/{}   (versions and catalog)", store_dir.display(), DB_DIR);
    println!("  - {}/{}   (store settings)", store_dir.display(), CONFIG_FILE);
    println!();
    println!("Next steps:");
    println!("  - Run 'trail user add <name>' to register a learner");
    println!("  - Run 'trail game add <name> --template <file>' to add an exercise");
    Ok(())
}
