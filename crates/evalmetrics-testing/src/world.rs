//! TestWorld pattern for declarative integration test setup.
//!
//! Provides a fluent interface for:
//! - Creating isolated working directories
//! - Writing eval logs and draft-data folders
//! - Executing CLI commands with a clean environment

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables the CLI reads; cleared so the host never leaks in.
const CLI_ENV_VARS: &[&str] = &["EVAL_METRICS_FILE", "DRAFT_DATA_FOLDER", "RUST_LOG"];

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use evalmetrics_testing::{TestWorld, sample_eval_log};
///
/// let world = TestWorld::new().with_eval_log("eval.txt", &sample_eval_log());
///
/// let result = world.run(&["report", "--input", "eval.txt"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        Self {
            temp_dir,
            env_vars: HashMap::new(),
        }
    }

    /// Get the temp directory root (also the command's working directory).
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolve a path relative to the temp root.
    pub fn path<P: AsRef<Path>>(&self, relative: P) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Set an environment variable for commands run in this world.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Write an eval log relative to the temp root.
    pub fn with_eval_log(self, name: &str, text: &str) -> Self {
        self.write_file(name, text).expect("Failed to write eval log");
        self
    }

    /// Create a draft-data folder holding the given `(relative path, content)` files.
    pub fn with_draft_folder(self, name: &str, files: &[(&str, &str)]) -> Self {
        let folder = self.path(name);
        fs::create_dir_all(&folder).expect("Failed to create draft folder");
        for (relative, content) in files {
            self.write_file(Path::new(name).join(relative), content)
                .expect("Failed to write draft file");
        }
        self
    }

    /// Write a file relative to the temp root, creating parent directories.
    pub fn write_file<P: AsRef<Path>>(&self, relative: P, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Read a file relative to the temp root.
    pub fn read_file<P: AsRef<Path>>(&self, relative: P) -> Result<String> {
        Ok(fs::read_to_string(self.path(relative))?)
    }

    /// Read and parse a JSON file relative to the temp root.
    pub fn read_json<P: AsRef<Path>>(&self, relative: P) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.read_file(relative)?)?)
    }

    /// Configure a CLI command with this test environment's settings.
    ///
    /// The caller must provide the base command (e.g., from `cargo_bin_cmd!("evalmetrics")`).
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.root());

        for key in CLI_ENV_VARS {
            cmd.env_remove(key);
        }
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute the CLI with the given arguments.
    ///
    /// This method uses `Command::cargo_bin()` which requires the binary to be
    /// built (which cargo test does automatically).
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("evalmetrics")
            .map_err(|e| anyhow::anyhow!("Failed to find evalmetrics binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    /// Get stdout as a string.
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Get stderr as a string.
    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
