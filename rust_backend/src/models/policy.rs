//! Event registration policies.
//!
//! A registration policy is stored as a JSON document on the event row:
//!
//! ```json
//! { "buckets": [
//!     { "key": "players", "name": "Players", "total_slots": 12 },
//!     { "key": "npcs", "name": "NPCs", "not_counted": true }
//! ] }
//! ```
//!
//! Only the fields used by the statistics are modeled; everything else in the
//! document is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named capacity slice of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Empty when the stored bucket has no key; such a bucket matches no
    /// signups.
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub key: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    /// Capacity of the bucket. Unlimited buckets usually store `null`.
    #[serde(default)]
    pub total_slots: Option<i64>,
    /// `true` for unlimited (NPC) buckets that are excluded from capacity.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub not_counted: bool,
}

impl Bucket {
    /// Capacity as used by the slot arithmetic; a missing capacity is zero.
    pub fn slots(&self) -> i64 {
        self.total_slots.unwrap_or(0)
    }

    pub fn is_counted(&self) -> bool {
        !self.not_counted
    }
}

/// Ordered list of buckets of one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPolicy {
    pub buckets: Vec<Bucket>,
}

impl RegistrationPolicy {
    /// Parse a registration policy document, requiring a `buckets` array.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        if value.is_null() {
            return Err("registration_policy is null".to_string());
        }
        if !value.get("buckets").is_some_and(Value::is_array) {
            return Err("registration_policy has no buckets list".to_string());
        }
        Self::deserialize(value).map_err(|e| format!("invalid registration_policy: {e}"))
    }

    pub fn find_bucket(&self, key: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| !b.key.is_empty() && b.key == key)
    }
}

/// Accept `true`/`false` as well as `null`; only a literal `true` marks a
/// bucket as not counted.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value == Value::Bool(true))
}

/// A `null` string field reads as empty.
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
