use evalmetrics_engine::{aggregate, derive_report, extract_events};
use evalmetrics_types::Report;
use std::path::{Path, PathBuf};

use crate::{Error, ReportConfig, Result};

/// What a report invocation produced.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub report: Report,
    pub output: PathBuf,
    /// Candidates skipped because they were not valid JSON
    pub malformed: usize,
    /// Well-formed candidates dropped for carrying another `event`
    pub foreign: usize,
}

/// Read the eval log, aggregate it and write `metrics.json`.
///
/// Fails before writing anything when the input is missing.
pub fn generate_report(config: &ReportConfig) -> Result<ReportOutcome> {
    let input = &config.input;
    if !input.is_file() {
        return Err(Error::MissingInput(input.clone()));
    }

    tracing::info!(path = %input.display(), "Reading EVAL_METRICS file");
    let bytes = std::fs::read(input)?;
    let text = String::from_utf8_lossy(&bytes);

    let mut stream = extract_events(&text);
    let totals = aggregate(stream.by_ref());
    let (malformed, foreign) = (stream.malformed(), stream.foreign());
    if malformed > 0 {
        tracing::warn!(malformed, "Skipped malformed telemetry blocks");
    }
    tracing::debug!(foreign, "Ignored non-eval telemetry blocks");

    let report = derive_report(totals);
    write_report(&report, &config.output)?;
    tracing::info!(path = %config.output.display(), "Wrote report");

    Ok(ReportOutcome {
        report,
        output: config.output.clone(),
        malformed,
        foreign,
    })
}

/// Persist a report as pretty-printed JSON, creating parent directories.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;

    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    };

    write().map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalmetrics_testing::sample_eval_log;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> ReportConfig {
        ReportConfig {
            input: dir.path().join("EVAL_METRICS_All.txt"),
            output: dir.path().join("dashboard/metrics.json"),
        }
    }

    #[test]
    fn test_missing_input_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let config = config_in(&dir);

        let err = generate_report(&config).unwrap_err();
        assert!(matches!(err, Error::MissingInput(ref path) if path == &config.input));
        assert!(!config.output.exists());
        Ok(())
    }

    #[test]
    fn test_generate_report_writes_pretty_json() -> Result<()> {
        let dir = TempDir::new()?;
        let config = config_in(&dir);
        std::fs::write(&config.input, sample_eval_log())?;

        let outcome = generate_report(&config)?;
        assert_eq!(outcome.report.total_entries, 4);
        assert_eq!(outcome.malformed, 1);
        assert_eq!(outcome.foreign, 1);

        let written = std::fs::read_to_string(&config.output)?;
        assert!(written.contains("\n  \"total_entries\": 4"));
        let parsed: Report = serde_json::from_str(&written)?;
        assert_eq!(parsed, outcome.report);
        Ok(())
    }

    #[test]
    fn test_empty_log_still_writes_report() -> Result<()> {
        let dir = TempDir::new()?;
        let config = config_in(&dir);
        std::fs::write(&config.input, "")?;

        let outcome = generate_report(&config)?;
        assert_eq!(outcome.report.total_entries, 0);
        assert!(config.output.exists());
        Ok(())
    }

    #[test]
    fn test_write_failure_is_write_error() -> Result<()> {
        let dir = TempDir::new()?;
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "")?;

        let report = evalmetrics_engine::build_report("");
        let err = write_report(&report, &blocker.join("metrics.json")).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        Ok(())
    }
}
