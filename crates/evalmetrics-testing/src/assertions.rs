//! Custom assertions for evalmetrics-specific validation.
//!
//! Provides high-level assertions that make tests more readable:
//! - Report headline counts
//! - Absent (null) statistics
//! - Download response status

use anyhow::{Context, Result};
use serde_json::Value;

/// Assert the headline counts of a report.
pub fn assert_report_counts(json: &Value, total_entries: u64, unique_threads: u64) -> Result<()> {
    let total = json["total_entries"]
        .as_u64()
        .context("Expected numeric 'total_entries' in report")?;
    let threads = json["unique_threads"]
        .as_u64()
        .context("Expected numeric 'unique_threads' in report")?;

    if total != total_entries {
        anyhow::bail!("Expected {} entries, got {}", total_entries, total);
    }
    if threads != unique_threads {
        anyhow::bail!("Expected {} unique threads, got {}", unique_threads, threads);
    }

    Ok(())
}

/// Assert that every listed report field is present and `null`.
pub fn assert_null_fields(json: &Value, fields: &[&str]) -> Result<()> {
    let object = json.as_object().context("Expected report to be a JSON object")?;

    for field in fields {
        match object.get(*field) {
            Some(Value::Null) => {}
            Some(other) => anyhow::bail!("Expected '{}' to be null, got {}", field, other),
            None => anyhow::bail!("Report is missing '{}'", field),
        }
    }

    Ok(())
}

/// Assert the status code of a download response.
pub fn assert_response_status(json: &Value, expected: u64) -> Result<()> {
    let status = json["statusCode"]
        .as_u64()
        .context("Expected numeric 'statusCode' in response")?;

    if status != expected {
        anyhow::bail!(
            "Expected status {}, got {} (body: {})",
            expected,
            status,
            json["body"]
        );
    }

    Ok(())
}
