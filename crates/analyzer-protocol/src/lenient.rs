//! Lenient field decoders for `#[serde(deserialize_with = ...)]`.
//!
//! The backend fills fields inconsistently (nulls, numbers as strings, `os`
//! as either an object or a label). Each decoder accepts any JSON value and
//! maps what it cannot use to the field's default, so one odd field never
//! fails a whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::OsInfo;

/// Non-negative integer. Accepts numbers and numeric strings, anything else is 0.
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from(&value))
}

/// Optional integer, `None` when absent or unusable.
pub fn opt_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(opt_count_from(&value))
}

/// Optional text. Numbers and bools are stringified, blank strings are `None`.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from(&value))
}

/// Boolean flag. Accepts bools, 0/1 and "true"/"false".
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Sequence of records. A non-array decodes as empty; elements that fail to
/// decode are dropped.
pub fn records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(records_from(value))
}

/// Operating system, either `{"name": .., "version": ..}` or a bare label.
pub fn os<'de, D>(deserializer: D) -> Result<Option<OsInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Object(map) => {
            let name = map.get("name").and_then(text_from);
            let version = map.get("version").and_then(text_from);
            if name.is_none() && version.is_none() {
                None
            } else {
                Some(OsInfo {
                    name: name.unwrap_or_default(),
                    version: version.unwrap_or_default(),
                })
            }
        }
        other => text_from(other).map(|name| OsInfo {
            name,
            version: String::new(),
        }),
    })
}

pub fn count_from(value: &Value) -> u64 {
    opt_count_from(value).unwrap_or(0)
}

pub fn opt_count_from(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| if f > 0.0 { f as u64 } else { 0 })),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| if f > 0.0 { f as u64 } else { 0 }),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

pub fn text_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn records_from<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}
