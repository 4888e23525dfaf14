use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Decode a loosely typed field, treating a value of the wrong JSON type as absent.
///
/// Telemetry blocks are written by several producers and are not validated, so a
/// single oddly typed field must never reject the whole record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a counter field. Any JSON number holding a non-negative whole value
/// is accepted, so `2` and `2.0` both count as two.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_value(&value))
}

/// Read a JSON value as a whole, non-negative count.
///
/// Floats beyond `u64::MAX` saturate.
pub fn count_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => whole_number(number),
        _ => None,
    }
}

fn whole_number(number: &Number) -> Option<u64> {
    if let Some(n) = number.as_u64() {
        return Some(n);
    }
    let n = number.as_f64()?;
    (n >= 0.0 && n.fract() == 0.0).then_some(n as u64)
}
