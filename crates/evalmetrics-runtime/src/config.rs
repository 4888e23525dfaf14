use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the eval log to aggregate.
pub const INPUT_ENV: &str = "EVAL_METRICS_FILE";

/// Environment variable naming the draft-data folder to archive.
pub const DRAFT_FOLDER_ENV: &str = "DRAFT_DATA_FOLDER";

pub const DEFAULT_INPUT: &str = "/mnt/data/EVAL_METRICS_All.txt";
pub const DEFAULT_OUTPUT: &str = "metrics.json";
pub const DEFAULT_DRAFT_FOLDER: &str = "draft_data";
pub const DEFAULT_ARCHIVE_OUTPUT: &str = "reports/draft_data.zip";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Eval log to read
    pub input: PathBuf,
    /// Where `metrics.json` is written
    pub output: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Draft-data folder to zip
    pub folder: PathBuf,
    /// Where the offline archive is written
    pub output: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_DRAFT_FOLDER),
            output: PathBuf::from(DEFAULT_ARCHIVE_OUTPUT),
        }
    }
}

/// Settings for one invocation.
///
/// Resolved once at startup and passed down by reference; nothing below the
/// CLI reads the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Load a TOML config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.expand_paths();
        Ok(config)
    }

    /// Overlay environment overrides, read through `lookup`.
    ///
    /// Takes a lookup function instead of reading the process environment so the
    /// caller decides where values come from.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input) = lookup(INPUT_ENV).filter(|v| !v.is_empty()) {
            self.report.input = expand_tilde(&input);
        }
        if let Some(folder) = lookup(DRAFT_FOLDER_ENV).filter(|v| !v.is_empty()) {
            self.archive.folder = expand_tilde(&folder);
        }
        self
    }

    fn expand_paths(&mut self) {
        for path in [
            &mut self.report.input,
            &mut self.report.output,
            &mut self.archive.folder,
            &mut self.archive.output,
        ] {
            if let Some(raw) = path.to_str() {
                *path = expand_tilde(raw);
            }
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}
