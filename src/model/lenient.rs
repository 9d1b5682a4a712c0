//! Forgiving field deserializers for stored and shared documents.
//!
//! Saved data may come from older versions or hand-edited share tokens. A
//! field holding `null` or a value of the wrong type falls back to its
//! default instead of failing the whole document.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::options::{AssumptionStatus, Priority, QuestionStatus, QuestionType};
use super::DEFAULT_ANALYSIS_NAME;

/// Text form of a scalar; `None` for null, arrays and objects.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_or<'de, D>(deserializer: D, fallback: &str) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_else(|| fallback.to_string()))
}

/// Free text; numbers and booleans keep their text form.
pub(super) fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, "")
}

pub(super) fn name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, DEFAULT_ANALYSIS_NAME)
}

pub(super) fn assumption_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, AssumptionStatus::Unvalidated.label())
}

pub(super) fn priority<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, Priority::Must.label())
}

pub(super) fn question_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, QuestionType::CanAnswerNow.label())
}

pub(super) fn question_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    string_or(deserializer, QuestionStatus::Open.label())
}

/// `true`, `"true"` or a non-zero number; anything else is `false`.
pub(super) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    })
}

/// RFC 3339 text or epoch milliseconds; anything else is the current time.
pub(super) fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse::<DateTime<Utc>>().ok(),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(Utc::now))
}

/// Only objects become records. Serde would otherwise fill a struct from an array.
fn from_object<T: DeserializeOwned>(value: Value) -> Option<T> {
    match value {
        Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    }
}

/// A nested record; anything that is not a readable object becomes the default.
pub(super) fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(from_object(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A list of records. Unreadable entries are skipped; a non-list is empty.
pub(super) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(from_object)
            .collect(),
        _ => Vec::new(),
    })
}
