//! Fixtures for eval log generation.
//!
//! Logs are built the way the survey builder writes them: free-form log lines
//! with telemetry blocks pretty-printed after a `Full JSON:` marker.

use evalmetrics_types::{JSON_MARKER, RawEvent, TokenUsage};
use serde_json::Value;

/// Fluent builder for eval log text.
#[derive(Debug, Default)]
pub struct EvalLogBuilder {
    text: String,
    line_no: usize,
}

impl EvalLogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain log line.
    pub fn line(mut self, line: &str) -> Self {
        self.line_no += 1;
        self.text
            .push_str(&format!("2024-05-01 12:00:{:02} INFO {}\n", self.line_no % 60, line));
        self
    }

    /// Append an event block, pretty-printed over several lines.
    pub fn event(self, event: &RawEvent) -> Self {
        let value = serde_json::to_value(event).expect("RawEvent always serializes");
        self.block(&value)
    }

    /// Append an arbitrary JSON block after the marker.
    pub fn block(mut self, value: &Value) -> Self {
        let json = serde_json::to_string_pretty(value).expect("Value always serializes");
        self = self.line("Evaluation finished");
        self.text.push_str(&format!("{} {}\n", JSON_MARKER, json));
        self
    }

    /// Append a marker followed by text that is not valid JSON.
    pub fn malformed(mut self) -> Self {
        self = self.line("Evaluation finished");
        self.text
            .push_str(&format!("{} {{\"event\": \"EVAL_METRICS\", truncated\n}}\n", JSON_MARKER));
        self
    }

    pub fn build(self) -> String {
        self.text
    }
}

/// An eval run tagged with the sentinel, belonging to `thread` and `flow`.
pub fn eval_run(thread: &str, flow: &str) -> RawEvent {
    RawEvent {
        thread_id: Some(Value::String(thread.to_string())),
        flow: Some(flow.to_string()),
        ..RawEvent::eval()
    }
}

/// A realistic log with four accepted runs, one malformed block and one
/// foreign event.
///
/// Expected aggregates: 4 entries over 3 threads, flows `create: 3, edit: 1`,
/// question totals `[4, 12, 25]`, page totals `[1, 3, 6]`, rules totals
/// `[4, 2]`, token usage on three runs averaging 1000 prompt / 200 completion
/// / 1200 total tokens.
pub fn sample_eval_log() -> String {
    let first = RawEvent {
        questions_total: Some(4.0),
        pages_total: Some(1.0),
        question_ids_unique: Some(true),
        token_usage: Some(TokenUsage::new("gpt-4o", 1000.0, 200.0)),
        ..eval_run("t-1", "create")
    };

    let second = RawEvent {
        questions_total: Some(12.0),
        pages_total: Some(3.0),
        question_ids_unique: Some(false),
        missing_required_fields_count: Some(2),
        invalid_question_type_count: Some(1),
        invalid_question_type_breakdown: Some(breakdown(&[("short_answer", 1)])),
        token_usage: Some(TokenUsage::new("gpt-4o", 1500.0, 300.0)),
        ..eval_run("t-1", "edit")
    };

    let third = RawEvent {
        questions_total: Some(25.0),
        pages_total: Some(6.0),
        invalid_question_type_count: Some(2),
        invalid_question_type_breakdown: Some(breakdown(&[("short_answer", 1), ("matrix", 1)])),
        schema_error_count: Some(1),
        rules_total: Some(4.0),
        rules_invalid_ref_count: Some(1),
        missing_conditions_count: Some(2),
        token_usage: Some(TokenUsage::new("gpt-4o-mini", 500.0, 100.0)),
        ..eval_run("t-2", "create")
    };

    let fourth = RawEvent {
        rules_total: Some(2.0),
        rules_schema_error_count: Some(1),
        missing_actions_count: Some(1),
        ..eval_run("t-3", "create")
    };

    EvalLogBuilder::new()
        .line("Starting survey builder evaluation")
        .event(&first)
        .block(&serde_json::json!({"event": "EVAL_STARTED", "thread_id": "t-9"}))
        .event(&second)
        .malformed()
        .event(&third)
        .line("Retrying with rules enabled")
        .event(&fourth)
        .build()
}

fn breakdown(entries: &[(&str, u64)]) -> serde_json::Map<String, Value> {
    entries
        .iter()
        .map(|(name, count)| (name.to_string(), Value::from(*count)))
        .collect()
}
