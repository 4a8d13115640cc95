//! Drives the `trail` binary from tests
//!
//! Every run is timed; results carry stdout, stderr, the exit code and the
//! elapsed time so workflows can assert on any of them.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// One invocation of `trail`, built up before running
pub struct TrailCommand {
    cwd: PathBuf,
    args: Vec<String>,
    input: Option<String>,
}

impl TrailCommand {
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            args: Vec::new(),
            input: None,
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    /// Text piped to the command's stdin
    pub fn stdin(&mut self, input: &str) -> &mut Self {
        self.input = Some(input.to_string());
        self
    }

    pub fn execute(&self) -> Result<CommandResult> {
        let started = Instant::now();

        let mut child = Command::new(env!("CARGO_BIN_EXE_trail"))
            .args(&self.args)
            .current_dir(&self.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn trail {:?}", self.args))?;

        // Dropping the handle closes stdin, so readers see EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(self.input.as_deref().unwrap_or("").as_bytes())?;
        }

        let output = child.wait_with_output().context("trail did not exit")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: started.elapsed(),
        })
    }

    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if !result.success() {
            anyhow::bail!(
                "trail {:?} exited with {}\n--- stdout\n{}\n--- stderr\n{}",
                self.args,
                result.exit_code,
                result.stdout,
                result.stderr
            );
        }
        Ok(result)
    }

    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if result.success() {
            anyhow::bail!("trail {:?} should have failed\n{}", self.args, result.stdout);
        }
        Ok(result)
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    #[allow(dead_code)]
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }

    /// Parse stdout of a `--json` command
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.stdout)
            .with_context(|| format!("stdout is not JSON:\n{}", self.stdout))
    }

    /// `version_id` field of a `--json` save or restore
    pub fn version_id(&self) -> Result<u64> {
        self.json()?["version_id"]
            .as_u64()
            .context("missing version_id")
    }
}

/// Build a [`TrailCommand`] in `dir` with the given arguments
///
/// ```ignore
/// trail!(dir, "init").assert_success()?;
/// trail!(dir, "save", "ada", "maze", "--json").stdin("go()\n").assert_success()?;
/// ```
#[macro_export]
macro_rules! trail {
    ($dir:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::TrailCommand::new($dir);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
