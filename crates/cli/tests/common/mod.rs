//! Common utilities for integration tests

pub mod cli;

use anyhow::Result;
use std::path::Path;
use tempfile::TempDir;

/// A fresh store with one learner ("ada") and one exercise ("maze")
pub struct TestStore {
    pub dir: TempDir,
}

impl TestStore {
    pub const USER: &'static str = "ada";
    pub const GAME: &'static str = "maze";
    pub const TEMPLATE: &'static str = "# Reach the exit\nrobot.forward()\n";

    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let store = Self { dir };

        crate::trail!(store.path(), "init").assert_success()?;
        crate::trail!(store.path(), "user", "add", Self::USER).assert_success()?;

        let template = store.path().join("template.py");
        std::fs::write(&template, Self::TEMPLATE)?;
        let template = template.to_string_lossy().to_string();
        crate::trail!(
            store.path(),
            "game",
            "add",
            Self::GAME,
            "--display-name",
            "The Maze",
            "--template",
            template.as_str()
        )
        .assert_success()?;

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Save through stdin and return the resulting version id
    pub fn save(&self, content: &str, extra: &[&str]) -> Result<u64> {
        let mut cmd = cli::TrailCommand::new(self.path());
        cmd.args(&["save", Self::USER, Self::GAME, "--json"])
            .args(extra)
            .stdin(content);
        cmd.assert_success()?.version_id()
    }
}
