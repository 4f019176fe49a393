//! Convention signup schedule.
//!
//! `conventions.maximum_event_signups` holds a scheduled value: a list of
//! timespans, each carrying the signup limit in effect from `start` until
//! `finish`. The first timespan normally has no `start` and the last one no
//! `finish`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One cutoff of the signup schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timespan {
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub finish: Option<DateTime<Utc>>,
    #[serde(default)]
    pub value: Value,
}

impl Timespan {
    /// Human readable form of the timespan value (`"1"`, `"unlimited"`, ...).
    pub fn label(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            other => other.to_string(),
        }
    }
}

/// Timespans in the order stored in the convention configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupSchedule {
    pub timespans: Vec<Timespan>,
}

impl SignupSchedule {
    pub fn new(timespans: Vec<Timespan>) -> Self {
        Self { timespans }
    }

    /// Parse `maximum_event_signups`, requiring a `timespans` array.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err(format!("expected an object, found {value}"));
        }
        if !value.get("timespans").is_some_and(Value::is_array) {
            return Err("maximum_event_signups has no timespans list".to_string());
        }
        Self::deserialize(value).map_err(|e| format!("invalid maximum_event_signups: {e}"))
    }
}

/// Parse a timestamp the way the convention configuration stores it.
///
/// Unparseable values become `None`, so the timespan is skipped instead of
/// failing the whole schedule.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => parse_timestamp(&s),
        // epoch milliseconds
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}
