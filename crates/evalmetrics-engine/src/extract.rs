use evalmetrics_types::{EVAL_METRICS_EVENT, JSON_MARKER, RawEvent};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Marker followed by optional whitespace and the opening brace of the block.
static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}\s*\{{", regex::escape(JSON_MARKER))).unwrap()
});

/// Scan raw log text for embedded eval telemetry blocks.
pub fn extract_events(text: &str) -> EventStream<'_> {
    EventStream::new(text)
}

/// Lazy, in-order sequence of accepted [`RawEvent`]s found in a log.
///
/// Malformed blocks are logged and skipped; well-formed blocks whose `event`
/// is not the eval sentinel are dropped silently. Both are counted so callers
/// can report them once the stream is drained.
#[derive(Debug)]
pub struct EventStream<'a> {
    text: &'a str,
    cursor: usize,
    malformed: usize,
    foreign: usize,
}

impl<'a> EventStream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cursor: 0,
            malformed: 0,
            foreign: 0,
        }
    }

    /// Number of candidates skipped because they were not valid JSON.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Number of well-formed candidates dropped for carrying another `event`.
    pub fn foreign(&self) -> usize {
        self.foreign
    }
}

impl Iterator for EventStream<'_> {
    type Item = RawEvent;

    fn next(&mut self) -> Option<RawEvent> {
        loop {
            let marker = MARKER_REGEX.find_at(self.text, self.cursor)?;
            let open = marker.end() - 1;

            let (value, end) = match parse_candidate(self.text, open) {
                Ok(parsed) => parsed,
                Err(err) => {
                    tracing::warn!(offset = err.offset(), "Failed to parse JSON block: {}", err);
                    self.malformed += 1;
                    // Resume inside the bad block so a later marker is still found.
                    self.cursor = marker.start() + JSON_MARKER.len();
                    continue;
                }
            };
            self.cursor = end;

            let event_name = value.get("event").and_then(Value::as_str);
            if event_name != Some(EVAL_METRICS_EVENT) {
                tracing::debug!(offset = open, event = ?event_name, "Ignoring non-eval block");
                self.foreign += 1;
                continue;
            }

            match serde_json::from_value::<RawEvent>(value) {
                Ok(event) => return Some(event),
                Err(source) => {
                    let err = Error::Parse {
                        offset: open,
                        source,
                    };
                    tracing::warn!(offset = open, "Failed to decode eval block: {}", err);
                    self.malformed += 1;
                }
            }
        }
    }
}

/// Parse the JSON object starting at `open`, returning it with the offset just
/// past its closing brace.
fn parse_candidate(text: &str, open: usize) -> Result<(Value, usize)> {
    let end = find_object_end(text, open)?;
    let value = serde_json::from_str(&text[open..end])
        .map_err(|source| Error::Parse { offset: open, source })?;
    Ok((value, end))
}

/// Find the end (exclusive) of the brace-balanced object opening at `open`.
///
/// Braces inside string literals do not count. Works on bytes: every byte the
/// scanner reacts to is ASCII and cannot occur inside a multi-byte character.
fn find_object_end(text: &str, open: usize) -> Result<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            _ => {}
        }
    }

    Err(Error::Unterminated { offset: open })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_yields_nothing() {
        let mut stream = extract_events("plain log line\n{\"event\": \"EVAL_METRICS\"}\n");
        assert!(stream.next().is_none());
        assert_eq!(stream.malformed(), 0);
        assert_eq!(stream.foreign(), 0);
    }

    #[test]
    fn test_multiline_block_with_nested_object() {
        let text = r#"
2024-05-01 INFO run finished
Full JSON: {
  "event": "EVAL_METRICS",
  "thread_id": "t-1",
  "token_usage": {"model_name": "gpt-4o", "total_tokens": 10}
}
trailing text
"#;
        let events: Vec<_> = extract_events(text).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].thread_key().as_deref(), Some("s:t-1"));
        assert_eq!(
            events[0].token_usage.as_ref().and_then(|t| t.total_tokens),
            Some(10.0)
        );
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let text = r#"Full JSON: {"event": "EVAL_METRICS", "flow": "a}b{\"c"}"#;
        let events: Vec<_> = extract_events(text).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].flow_label(), Some("a}b{\"c"));
    }

    #[test]
    fn test_malformed_block_is_skipped_and_scanning_continues() {
        let text = concat!(
            "Full JSON: {\"event\": \"EVAL_METRICS\", oops}\n",
            "Full JSON: {\"event\": \"EVAL_METRICS\", \"flow\": \"edit\"}\n",
        );
        let mut stream = extract_events(text);
        let events: Vec<_> = stream.by_ref().collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].flow_label(), Some("edit"));
        assert_eq!(stream.malformed(), 1);
    }

    #[test]
    fn test_unterminated_block_does_not_swallow_later_markers() {
        let text = concat!(
            "Full JSON: {\"event\": \"EVAL_METRICS\"\n",
            "Full JSON: {\"event\": \"EVAL_METRICS\", \"flow\": \"create\"}\n",
        );
        let mut stream = extract_events(text);
        let events: Vec<_> = stream.by_ref().collect();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].flow_label(), Some("create"));
        assert_eq!(stream.malformed(), 1);
    }

    #[test]
    fn test_foreign_events_are_filtered() {
        let text = concat!(
            "Full JSON: {\"event\": \"EVAL_STARTED\"}\n",
            "Full JSON: {\"flow\": \"create\"}\n",
            "Full JSON: {\"event\": \"EVAL_METRICS\"}\n",
        );
        let mut stream = extract_events(text);
        let events: Vec<_> = stream.by_ref().collect();

        assert_eq!(events.len(), 1);
        assert_eq!(stream.foreign(), 2);
        assert_eq!(stream.malformed(), 0);
    }

    #[test]
    fn test_marker_without_object_is_not_a_candidate() {
        let text = "Full JSON: none available\nFull JSON:\n  {\"event\": \"EVAL_METRICS\"}";
        let events: Vec<_> = extract_events(text).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let text = concat!(
            "Full JSON: {\"event\": \"EVAL_METRICS\", \"questions_total\": 4}\n",
            "Full JSON: {\"event\": \"EVAL_METRICS\", \"questions_total\": 9}\n",
        );
        let first: Vec<_> = extract_events(text).collect();
        let second: Vec<_> = extract_events(text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_find_object_end_handles_escaped_backslash() {
        let text = r#"{"path": "C:\\dir\\"}tail"#;
        let end = find_object_end(text, 0).unwrap();
        assert_eq!(&text[end..], "tail");
    }
}
