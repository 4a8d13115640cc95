//! Configuration management command
//!
//! Provides CLI interface to view and edit store configuration.

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use trail_core::config::{example_config, CONFIG_FILE};
use trail_core::StoreConfig;

/// List all configuration values
pub fn run_list(dir: Option<&Path>) -> Result<()> {
    let store_dir = util::store_dir(dir)?;
    let config = StoreConfig::load(&store_dir)?;

    println!("{}", "Store Configuration".bold());
    println!(
        "{}: {}\n",
        "Location".dimmed(),
        store_dir.join(CONFIG_FILE).display().dimmed()
    );

    for key in StoreConfig::KEYS {
        println!("  {} = {}", key.cyan(), config.get(key)?);
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  max_content_bytes: 1-67,108,864");
    println!("  max_annotation_chars: 1-10,000");
    println!("  max_page_size: 1-1000");
    println!("  default_page_size: 1-max_page_size");
    println!("  preview_chars: 0-10,000");
    println!("  diff_timeout_ms: 1-60,000");

    Ok(())
}

/// Get a single configuration value
pub fn run_get(dir: Option<&Path>, key: &str) -> Result<()> {
    let config = StoreConfig::load(&util::store_dir(dir)?)?;
    let value = config
        .get(key)
        .context("Use 'trail config list' to see available keys")?;

    println!("{}", value);
    Ok(())
}

/// Set a configuration value
pub fn run_set(dir: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let store_dir = util::store_dir(dir)?;
    let mut config = StoreConfig::load(&store_dir)?;

    config.set(key, value)?;

    // Validate before saving
    config.validate().context("Invalid configuration value")?;
    config.save(&store_dir)?;

    println!("{} {} = {}", "Set".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path
pub fn run_path(dir: Option<&Path>) -> Result<()> {
    let store_dir = util::store_dir(dir)?;
    println!("{}", store_dir.join(CONFIG_FILE).display());
    Ok(())
}

pub fn run_example() -> Result<()> {
    print!("{}", example_config());
    Ok(())
}
