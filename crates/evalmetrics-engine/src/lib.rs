// Engine module - the report pipeline (extract -> aggregate -> derive)
// Every stage is a pure transformation over in-memory values; reading the log
// and writing the report belong to the runtime layer.

pub mod aggregate;
pub mod derive;
pub mod error;
pub mod extract;

pub use aggregate::{RunningTotals, aggregate};
pub use derive::{
    Bucket, PAGES_TOTAL_BUCKETS, QUESTIONS_TOTAL_BUCKETS, average, bucket_distribution,
    derive_report, derive_report_at, empty_report, median,
};
pub use error::{Error, Result};
pub use extract::{EventStream, extract_events};

use chrono::{DateTime, Utc};
use evalmetrics_types::Report;

// Façade API - Stable public interface for the runtime/CLI layers

/// Build a report from raw log text, stamped with the current time.
pub fn build_report(text: &str) -> Report {
    derive_report(aggregate(extract_events(text)))
}

/// Build a report from raw log text with a caller-supplied timestamp.
pub fn build_report_at(text: &str, generated_at: DateTime<Utc>) -> Report {
    derive_report_at(aggregate(extract_events(text)), generated_at)
}
