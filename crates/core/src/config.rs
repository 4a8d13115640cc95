//! Store configuration (`.trail/config.toml`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Tunables for the version store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Largest accepted program, in bytes (default: 1 MiB)
    pub max_content_bytes: usize,
    /// Longest accepted annotation, in characters (default: 200)
    pub max_annotation_chars: usize,
    /// Upper bound applied to every page request (default: 50)
    pub max_page_size: usize,
    /// Page size used when the caller does not ask for one (default: 20)
    pub default_page_size: usize,
    /// Characters of content shown in history previews (default: 100)
    pub preview_chars: usize,
    /// Time budget for aligning a diff, in milliseconds (default: 1000)
    pub diff_timeout_ms: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: 1024 * 1024,
            max_annotation_chars: 200,
            max_page_size: 50,
            default_page_size: 20,
            preview_chars: 100,
            diff_timeout_ms: 1000,
        }
    }
}

impl StoreConfig {
    /// Keys accepted by [`StoreConfig::get`] and [`StoreConfig::set`]
    pub const KEYS: [&'static str; 6] = [
        "max_content_bytes",
        "max_annotation_chars",
        "max_page_size",
        "default_page_size",
        "preview_chars",
        "diff_timeout_ms",
    ];

    /// Load from `dir/config.toml`, falling back to defaults when absent
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and write to `dir/config.toml`
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.validate()?;
        let path = dir.join(CONFIG_FILE);
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Check every value against its valid range
    pub fn validate(&self) -> Result<()> {
        check_range("max_content_bytes", self.max_content_bytes, 1, 64 * 1024 * 1024)?;
        check_range("max_annotation_chars", self.max_annotation_chars, 1, 10_000)?;
        check_range("max_page_size", self.max_page_size, 1, 1000)?;
        check_range("default_page_size", self.default_page_size, 1, self.max_page_size)?;
        check_range("preview_chars", self.preview_chars, 0, 10_000)?;
        check_range("diff_timeout_ms", self.diff_timeout_ms, 1, 60_000)?;
        Ok(())
    }

    /// Read a value by key
    pub fn get(&self, key: &str) -> Result<usize> {
        let value = match key {
            "max_content_bytes" => self.max_content_bytes,
            "max_annotation_chars" => self.max_annotation_chars,
            "max_page_size" => self.max_page_size,
            "default_page_size" => self.default_page_size,
            "preview_chars" => self.preview_chars,
            "diff_timeout_ms" => self.diff_timeout_ms,
            _ => anyhow::bail!("Unknown config key: {}", key),
        };
        Ok(value)
    }

    /// Set a value by key (not validated until [`StoreConfig::validate`])
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parsed: usize = value
            .parse()
            .with_context(|| format!("Invalid value for {}: must be a non-negative integer", key))?;

        match key {
            "max_content_bytes" => self.max_content_bytes = parsed,
            "max_annotation_chars" => self.max_annotation_chars = parsed,
            "max_page_size" => self.max_page_size = parsed,
            "default_page_size" => self.default_page_size = parsed,
            "preview_chars" => self.preview_chars = parsed,
            "diff_timeout_ms" => self.diff_timeout_ms = parsed,
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    pub fn diff_timeout(&self) -> Duration {
        Duration::from_millis(self.diff_timeout_ms as u64)
    }

    /// Clamp a requested page size into `1..=max_page_size`
    pub fn clamp_page_size(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_page_size)
    }
}

fn check_range(key: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        anyhow::bail!("{} must be in {}..={} (got {})", key, min, max, value);
    }
    Ok(())
}

/// Commented example configuration
pub fn example_config() -> &'static str {
    r#"# Codetrail store configuration

# Largest accepted program in bytes (1 - 67108864)
max_content_bytes = 1048576

# Longest annotation in characters (1 - 10000)
max_annotation_chars = 200

# Page size ceiling for history listings (1 - 1000)
max_page_size = 50

# Page size used when none is requested (1 - max_page_size)
default_page_size = 20

# Characters of content in history previews (0 - 10000)
preview_chars = 100

# Milliseconds spent aligning a diff before falling back to a coarse one (1 - 60000)
diff_timeout_ms = 1000
"#
}
