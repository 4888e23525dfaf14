use evalmetrics_types::{RawEvent, TokenUsage, count_value};
use std::collections::{BTreeMap, HashSet};

/// Running totals for one aggregation pass.
///
/// Created empty, fed each accepted event once through [`RunningTotals::ingest`],
/// then consumed by derivation. Absent fields never touch any counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningTotals {
    pub total_entries: u64,
    pub threads: HashSet<String>,
    pub flow_counts: BTreeMap<String, u64>,

    pub question_runs_count: u64,
    pub questions_total_values: Vec<f64>,
    pub pages_total_values: Vec<f64>,
    pub duplicate_question_id_runs: u64,
    pub total_missing_required_fields: u64,

    pub invalid_question_type_runs: u64,
    pub invalid_question_type_total: u64,
    pub invalid_question_type_breakdown: BTreeMap<String, u64>,
    pub schema_error_runs: u64,
    pub total_schema_errors: u64,

    pub rules_runs_count: u64,
    pub rules_total_values: Vec<f64>,
    pub rules_invalid_ref_count: u64,
    pub rules_schema_error_count: u64,
    pub missing_conditions_count: u64,
    pub missing_actions_count: u64,

    pub token_usage_entries: Vec<TokenUsage>,
    pub model_name_breakdown: BTreeMap<String, u64>,
}

/// Add to a counter, pinning at `u64::MAX` instead of wrapping.
fn bump(counter: &mut u64, by: u64) {
    *counter = counter.saturating_add(by);
}

/// Fold accepted events into running totals.
pub fn aggregate<I>(events: I) -> RunningTotals
where
    I: IntoIterator<Item = RawEvent>,
{
    events
        .into_iter()
        .fold(RunningTotals::default(), |mut totals, event| {
            totals.ingest(&event);
            totals
        })
}

impl RunningTotals {
    pub fn unique_threads(&self) -> u64 {
        self.threads.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.total_entries == 0
    }

    /// Apply one accepted event.
    pub fn ingest(&mut self, event: &RawEvent) {
        bump(&mut self.total_entries, 1);

        if let Some(thread) = event.thread_key() {
            self.threads.insert(thread);
        }

        if let Some(flow) = event.flow_label() {
            bump(self.flow_counts.entry(flow.to_string()).or_insert(0), 1);
        }

        if let Some(questions) = event.questions_total {
            bump(&mut self.question_runs_count, 1);
            self.questions_total_values.push(questions);
        }

        // No run counter for pages, unlike questions and rules.
        if let Some(pages) = event.pages_total {
            self.pages_total_values.push(pages);
        }

        if event.question_ids_unique == Some(false) {
            bump(&mut self.duplicate_question_id_runs, 1);
        }

        if let Some(missing) = event.missing_required_fields_count {
            bump(&mut self.total_missing_required_fields, missing);
        }

        if let Some(invalid) = event.invalid_question_type_count
            && invalid > 0
        {
            bump(&mut self.invalid_question_type_runs, 1);
            bump(&mut self.invalid_question_type_total, invalid);

            if let Some(breakdown) = &event.invalid_question_type_breakdown {
                for (question_type, count) in breakdown {
                    match count_value(count) {
                        Some(count) => bump(
                            self.invalid_question_type_breakdown
                                .entry(question_type.clone())
                                .or_insert(0),
                            count,
                        ),
                        None => tracing::debug!(
                            question_type = %question_type,
                            "Skipping non-numeric invalid question type count"
                        ),
                    }
                }
            }
        }

        if let Some(schema_errors) = event.schema_error_count
            && schema_errors > 0
        {
            bump(&mut self.schema_error_runs, 1);
            bump(&mut self.total_schema_errors, schema_errors);
        }

        if let Some(rules) = event.rules_total {
            bump(&mut self.rules_runs_count, 1);
            self.rules_total_values.push(rules);
        }

        bump(&mut self.rules_invalid_ref_count, event.rules_invalid_ref_count.unwrap_or(0));
        bump(&mut self.rules_schema_error_count, event.rules_schema_error_count.unwrap_or(0));
        bump(&mut self.missing_conditions_count, event.missing_conditions_count.unwrap_or(0));
        bump(&mut self.missing_actions_count, event.missing_actions_count.unwrap_or(0));

        if let Some(usage) = &event.token_usage {
            if let Some(model) = usage.model_label() {
                bump(self.model_name_breakdown.entry(model.to_string()).or_insert(0), 1);
            }
            self.token_usage_entries.push(usage.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_sequence_gives_empty_totals() {
        let totals = aggregate(Vec::new());
        assert!(totals.is_empty());
        assert_eq!(totals, RunningTotals::default());
    }

    #[test]
    fn test_bare_event_counts_only_as_entry() {
        let totals = aggregate(vec![RawEvent::eval()]);

        assert_eq!(totals.total_entries, 1);
        assert_eq!(totals.unique_threads(), 0);
        assert_eq!(
            totals,
            RunningTotals {
                total_entries: 1,
                ..RunningTotals::default()
            }
        );
    }

    #[test]
    fn test_shared_thread_counts_once() {
        let totals = aggregate(vec![
            event(json!({"event": "EVAL_METRICS", "thread_id": "t-1"})),
            event(json!({"event": "EVAL_METRICS", "thread_id": "t-1"})),
            event(json!({"event": "EVAL_METRICS", "thread_id": "t-2"})),
            event(json!({"event": "EVAL_METRICS", "thread_id": ""})),
        ]);

        assert_eq!(totals.total_entries, 4);
        assert_eq!(totals.unique_threads(), 2);
    }

    #[test]
    fn test_breakdown_is_additive() {
        let run = json!({
            "event": "EVAL_METRICS",
            "invalid_question_type_count": 1,
            "invalid_question_type_breakdown": {"short_answer": 1}
        });
        let totals = aggregate(vec![event(run.clone()), event(run)]);

        assert_eq!(totals.invalid_question_type_runs, 2);
        assert_eq!(totals.invalid_question_type_total, 2);
        assert_eq!(totals.invalid_question_type_breakdown.get("short_answer"), Some(&2));
    }

    #[test]
    fn test_breakdown_ignored_without_positive_count() {
        let totals = aggregate(vec![event(json!({
            "event": "EVAL_METRICS",
            "invalid_question_type_count": 0,
            "invalid_question_type_breakdown": {"matrix": 3}
        }))]);

        assert_eq!(totals.invalid_question_type_runs, 0);
        assert!(totals.invalid_question_type_breakdown.is_empty());
    }

    #[test]
    fn test_duplicate_ids_require_strict_false() {
        let totals = aggregate(vec![
            event(json!({"event": "EVAL_METRICS", "question_ids_unique": false})),
            event(json!({"event": "EVAL_METRICS", "question_ids_unique": true})),
            event(json!({"event": "EVAL_METRICS", "question_ids_unique": 0})),
            event(json!({"event": "EVAL_METRICS"})),
        ]);

        assert_eq!(totals.duplicate_question_id_runs, 1);
    }

    #[test]
    fn test_pages_have_no_run_counter() {
        let totals = aggregate(vec![event(json!({
            "event": "EVAL_METRICS",
            "questions_total": 12,
            "pages_total": 3,
            "rules_total": 2
        }))]);

        assert_eq!(totals.question_runs_count, 1);
        assert_eq!(totals.rules_runs_count, 1);
        assert_eq!(totals.pages_total_values, vec![3.0]);
    }

    #[test]
    fn test_additive_counters() {
        let run = json!({
            "event": "EVAL_METRICS",
            "missing_required_fields_count": 2,
            "schema_error_count": 3,
            "rules_invalid_ref_count": 1,
            "rules_schema_error_count": 4,
            "missing_conditions_count": 5,
            "missing_actions_count": 6
        });
        let totals = aggregate(vec![event(run.clone()), event(run)]);

        assert_eq!(totals.total_missing_required_fields, 4);
        assert_eq!(totals.schema_error_runs, 2);
        assert_eq!(totals.total_schema_errors, 6);
        assert_eq!(totals.rules_invalid_ref_count, 2);
        assert_eq!(totals.rules_schema_error_count, 8);
        assert_eq!(totals.missing_conditions_count, 10);
        assert_eq!(totals.missing_actions_count, 12);
    }

    #[test]
    fn test_counters_saturate_instead_of_overflowing() {
        let totals = aggregate(vec![
            event(json!({
                "event": "EVAL_METRICS",
                "missing_required_fields_count": u64::MAX,
                "invalid_question_type_count": u64::MAX,
                "invalid_question_type_breakdown": {"matrix": u64::MAX},
                "missing_actions_count": u64::MAX
            })),
            event(json!({
                "event": "EVAL_METRICS",
                "missing_required_fields_count": 1,
                "invalid_question_type_count": 1,
                "invalid_question_type_breakdown": {"matrix": 1},
                "missing_actions_count": 1
            })),
        ]);

        assert_eq!(totals.total_missing_required_fields, u64::MAX);
        assert_eq!(totals.invalid_question_type_total, u64::MAX);
        assert_eq!(totals.invalid_question_type_breakdown.get("matrix"), Some(&u64::MAX));
        assert_eq!(totals.missing_actions_count, u64::MAX);
        assert_eq!(totals.invalid_question_type_runs, 2);
    }

    #[test]
    fn test_float_encoded_counts_are_added() {
        let totals = aggregate(vec![event(json!({
            "event": "EVAL_METRICS",
            "missing_required_fields_count": 2.0,
            "schema_error_count": 1.0,
            "invalid_question_type_count": 3.0,
            "invalid_question_type_breakdown": {"matrix": 2.0, "short_answer": 1}
        }))]);

        assert_eq!(totals.total_missing_required_fields, 2);
        assert_eq!(totals.schema_error_runs, 1);
        assert_eq!(totals.total_schema_errors, 1);
        assert_eq!(totals.invalid_question_type_total, 3);
        assert_eq!(totals.invalid_question_type_breakdown.get("matrix"), Some(&2));
        assert_eq!(totals.invalid_question_type_breakdown.get("short_answer"), Some(&1));
    }

    #[test]
    fn test_string_and_numeric_thread_ids_are_distinct() {
        let totals = aggregate(vec![
            event(json!({"event": "EVAL_METRICS", "thread_id": "42"})),
            event(json!({"event": "EVAL_METRICS", "thread_id": 42})),
            event(json!({"event": "EVAL_METRICS", "thread_id": 42.0})),
        ]);

        assert_eq!(totals.unique_threads(), 2);
    }

    #[test]
    fn test_token_usage_is_retained_and_tallied() {
        let totals = aggregate(vec![
            event(json!({"event": "EVAL_METRICS", "token_usage": {"model_name": "gpt-4o", "total_tokens": 10}})),
            event(json!({"event": "EVAL_METRICS", "token_usage": {"model_name": "gpt-4o"}})),
            event(json!({"event": "EVAL_METRICS", "token_usage": {"total_tokens": 4}})),
        ]);

        assert_eq!(totals.token_usage_entries.len(), 3);
        assert_eq!(totals.model_name_breakdown.get("gpt-4o"), Some(&2));
        assert_eq!(totals.model_name_breakdown.len(), 1);
    }

    #[test]
    fn test_flow_counts() {
        let totals = aggregate(vec![
            event(json!({"event": "EVAL_METRICS", "flow": "create"})),
            event(json!({"event": "EVAL_METRICS", "flow": "edit"})),
            event(json!({"event": "EVAL_METRICS", "flow": "create"})),
        ]);

        assert_eq!(totals.flow_counts.get("create"), Some(&2));
        assert_eq!(totals.flow_counts.get("edit"), Some(&1));
    }
}
