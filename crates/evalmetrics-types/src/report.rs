use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Summary of one aggregation run, written once as `metrics.json`.
///
/// Averages and medians are `None` (serialized as `null`) when there were no
/// samples to summarize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_entries: u64,
    pub unique_threads: u64,
    pub flow_counts: BTreeMap<String, u64>,

    pub question_runs_count: u64,
    pub avg_questions_total: Option<f64>,
    pub median_questions_total: Option<f64>,
    pub avg_pages_total: Option<f64>,
    pub median_pages_total: Option<f64>,
    pub duplicate_question_id_runs: u64,
    pub total_missing_required_fields: u64,

    pub invalid_question_type_runs: u64,
    pub invalid_question_type_total: u64,
    pub invalid_question_type_breakdown: BTreeMap<String, u64>,
    pub schema_error_runs: u64,
    pub total_schema_errors: u64,

    pub rules_runs_count: u64,
    pub avg_rules_total: Option<f64>,
    pub rules_invalid_ref_count: u64,
    pub rules_schema_error_count: u64,
    pub missing_conditions_count: u64,
    pub missing_actions_count: u64,

    pub runs_with_token_usage: u64,
    pub avg_total_tokens: Option<f64>,
    pub avg_prompt_tokens: Option<f64>,
    pub avg_completion_tokens: Option<f64>,
    pub model_name_breakdown: BTreeMap<String, u64>,

    pub questions_total_distribution: Distribution,
    pub pages_total_distribution: Distribution,

    /// RFC 3339 UTC timestamp taken when the report was derived.
    pub generated_at: String,
}

/// Labeled histogram counts, kept in bucket order.
///
/// Serializes as a JSON object whose keys follow bucket order rather than
/// sorted order, so `"6-10"` stays after `"0-5"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution(Vec<(String, u64)>);

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, count: u64) {
        self.0.push((label.into(), count));
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, count)| *count)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Distribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = Distribution;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of bucket labels to counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut distribution = Distribution::new();
                while let Some((label, count)) = access.next_entry::<String, u64>()? {
                    distribution.push(label, count);
                }
                Ok(distribution)
            }
        }

        deserializer.deserialize_map(DistributionVisitor)
    }
}
