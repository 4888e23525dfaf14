use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EVAL_METRICS_EVENT;
use crate::util::{lenient, lenient_count};

/// One telemetry record embedded in an eval log.
///
/// Producers emit these blocks without a schema, so every field is optional and
/// decoded leniently: a missing or wrongly typed field has no effect on
/// aggregation and never rejects the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    /// Conversation the run belongs to. Opaque: producers write strings or numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<Value>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub questions_total: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pages_total: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub question_ids_unique: Option<bool>,

    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub missing_required_fields_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub invalid_question_type_count: Option<u64>,

    /// Per question-type counts; entries are validated one by one during aggregation.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub invalid_question_type_breakdown: Option<Map<String, Value>>,

    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub schema_error_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rules_total: Option<f64>,

    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub rules_invalid_ref_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub rules_schema_error_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub missing_conditions_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub missing_actions_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

impl RawEvent {
    /// An empty record already tagged with the eval sentinel.
    pub fn eval() -> Self {
        Self {
            event: Some(EVAL_METRICS_EVENT.to_string()),
            ..Self::default()
        }
    }

    pub fn is_eval_metrics(&self) -> bool {
        self.event.as_deref() == Some(EVAL_METRICS_EVENT)
    }

    /// Key used to count distinct conversations.
    ///
    /// Returns `None` for falsy ids (`null`, `false`, `0`, `""`) so they never
    /// count as a thread. Keys carry the JSON type, so `"42"` and `42` are two
    /// threads, while `42` and `42.0` are one.
    pub fn thread_key(&self) -> Option<String> {
        match self.thread_id.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(format!("s:{s}")),
            Value::Number(n) => match n.as_f64()? {
                n if n == 0.0 => None,
                n => Some(format!("n:{n}")),
            },
            other => Some(format!("j:{other}")),
        }
    }

    /// Flow label, if present and non-empty.
    pub fn flow_label(&self) -> Option<&str> {
        self.flow.as_deref().filter(|flow| !flow.is_empty())
    }
}

/// Token accounting for one run, kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<f64>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<f64>,

    /// Sub-fields this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenUsage {
    pub fn new(model_name: &str, prompt_tokens: f64, completion_tokens: f64) -> Self {
        Self {
            model_name: Some(model_name.to_string()),
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            total_tokens: Some(prompt_tokens + completion_tokens),
            extra: Map::new(),
        }
    }

    pub fn model_label(&self) -> Option<&str> {
        self.model_name.as_deref().filter(|name| !name.is_empty())
    }
}
