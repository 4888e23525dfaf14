use chrono::{DateTime, SecondsFormat, Utc};
use evalmetrics_types::{Distribution, Report};
use std::collections::BTreeMap;

use crate::RunningTotals;

/// One histogram range. `max: None` is the open-ended top bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub min: u64,
    pub max: Option<u64>,
}

impl Bucket {
    pub const fn range(min: u64, max: u64) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: u64) -> Self {
        Self { min, max: None }
    }

    /// `"5"` for a single value, `"6-10"` for a range, `"31+"` when unbounded.
    pub fn label(&self) -> String {
        match self.max {
            None => format!("{}+", self.min),
            Some(max) if max == self.min => self.min.to_string(),
            Some(max) => format!("{}-{}", self.min, max),
        }
    }
}

pub const QUESTIONS_TOTAL_BUCKETS: &[Bucket] = &[
    Bucket::range(0, 5),
    Bucket::range(6, 10),
    Bucket::range(11, 15),
    Bucket::range(16, 20),
    Bucket::range(21, 30),
    Bucket::at_least(31),
];

pub const PAGES_TOTAL_BUCKETS: &[Bucket] = &[
    Bucket::range(1, 1),
    Bucket::range(2, 2),
    Bucket::range(3, 3),
    Bucket::range(4, 4),
    Bucket::at_least(5),
];

pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Count samples per bucket.
///
/// Buckets must be sorted by `min`. A sample lands in the last bucket whose
/// lower bound it reaches, so integer samples honor the inclusive ranges and
/// fractional ones fall into the range they follow. Samples below the first
/// bound are not counted.
pub fn bucket_distribution(values: &[f64], buckets: &[Bucket]) -> Distribution {
    let mut counts = vec![0u64; buckets.len()];

    for &value in values {
        match buckets.iter().rposition(|bucket| value >= bucket.min as f64) {
            Some(index) => counts[index] += 1,
            None => tracing::debug!(value, "Sample below the lowest bucket"),
        }
    }

    let mut distribution = Distribution::new();
    for (bucket, count) in buckets.iter().zip(counts) {
        distribution.push(bucket.label(), count);
    }
    distribution
}

/// Derive the final report, stamped with the current time.
pub fn derive_report(totals: RunningTotals) -> Report {
    derive_report_at(totals, Utc::now())
}

/// Derive the final report from folded totals.
pub fn derive_report_at(totals: RunningTotals, generated_at: DateTime<Utc>) -> Report {
    if totals.is_empty() {
        return empty_report(generated_at);
    }

    let token_field = |field: fn(&evalmetrics_types::TokenUsage) -> Option<f64>| {
        let values: Vec<f64> = totals
            .token_usage_entries
            .iter()
            .map(|usage| field(usage).unwrap_or(0.0))
            .collect();
        average(&values)
    };
    let avg_total_tokens = token_field(|usage| usage.total_tokens);
    let avg_prompt_tokens = token_field(|usage| usage.prompt_tokens);
    let avg_completion_tokens = token_field(|usage| usage.completion_tokens);

    Report {
        total_entries: totals.total_entries,
        unique_threads: totals.unique_threads(),
        question_runs_count: totals.question_runs_count,
        avg_questions_total: average(&totals.questions_total_values),
        median_questions_total: median(&totals.questions_total_values),
        avg_pages_total: average(&totals.pages_total_values),
        median_pages_total: median(&totals.pages_total_values),
        duplicate_question_id_runs: totals.duplicate_question_id_runs,
        total_missing_required_fields: totals.total_missing_required_fields,
        invalid_question_type_runs: totals.invalid_question_type_runs,
        invalid_question_type_total: totals.invalid_question_type_total,
        schema_error_runs: totals.schema_error_runs,
        total_schema_errors: totals.total_schema_errors,
        rules_runs_count: totals.rules_runs_count,
        avg_rules_total: average(&totals.rules_total_values),
        rules_invalid_ref_count: totals.rules_invalid_ref_count,
        rules_schema_error_count: totals.rules_schema_error_count,
        missing_conditions_count: totals.missing_conditions_count,
        missing_actions_count: totals.missing_actions_count,
        runs_with_token_usage: totals.token_usage_entries.len() as u64,
        avg_total_tokens,
        avg_prompt_tokens,
        avg_completion_tokens,
        questions_total_distribution: bucket_distribution(
            &totals.questions_total_values,
            QUESTIONS_TOTAL_BUCKETS,
        ),
        pages_total_distribution: bucket_distribution(
            &totals.pages_total_values,
            PAGES_TOTAL_BUCKETS,
        ),
        flow_counts: totals.flow_counts,
        invalid_question_type_breakdown: totals.invalid_question_type_breakdown,
        model_name_breakdown: totals.model_name_breakdown,
        generated_at: format_timestamp(generated_at),
    }
}

/// Report for a run that accepted no events: zero counts, empty tables, no
/// averages or medians.
pub fn empty_report(generated_at: DateTime<Utc>) -> Report {
    Report {
        total_entries: 0,
        unique_threads: 0,
        flow_counts: BTreeMap::new(),
        question_runs_count: 0,
        avg_questions_total: None,
        median_questions_total: None,
        avg_pages_total: None,
        median_pages_total: None,
        duplicate_question_id_runs: 0,
        total_missing_required_fields: 0,
        invalid_question_type_runs: 0,
        invalid_question_type_total: 0,
        invalid_question_type_breakdown: BTreeMap::new(),
        schema_error_runs: 0,
        total_schema_errors: 0,
        rules_runs_count: 0,
        avg_rules_total: None,
        rules_invalid_ref_count: 0,
        rules_schema_error_count: 0,
        missing_conditions_count: 0,
        missing_actions_count: 0,
        runs_with_token_usage: 0,
        avg_total_tokens: None,
        avg_prompt_tokens: None,
        avg_completion_tokens: None,
        model_name_breakdown: BTreeMap::new(),
        questions_total_distribution: Distribution::new(),
        pages_total_distribution: Distribution::new(),
        generated_at: format_timestamp(generated_at),
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
