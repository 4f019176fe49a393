//! Rows returned by the repository layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::CONFIRMED_STATE;
use super::policy::RegistrationPolicy;
use crate::api::EventId;

/// A reportable event with its raw registration policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub length_seconds: i32,
    pub registration_policy: Value,
}

impl EventRecord {
    pub fn length_hours(&self) -> f64 {
        f64::from(self.length_seconds) / 3600.0
    }
}

/// A signup on one of an event's runs, in any state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRecord {
    pub bucket_key: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

impl SignupRecord {
    pub fn is_confirmed(&self) -> bool {
        self.state == CONFIRMED_STATE
    }
}

/// A signup joined with its run, event and user, as used by the early signup
/// report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LarpSignupRecord {
    pub event_id: EventId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub bucket_key: Option<String>,
    pub state: String,
    pub title: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub registration_policy: Value,
}

impl LarpSignupRecord {
    pub fn is_confirmed(&self) -> bool {
        self.state == CONFIRMED_STATE
    }
}

/// An event augmented with its parsed policy, run count and signups.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedEvent {
    pub event: EventRecord,
    pub policy: RegistrationPolicy,
    pub run_count: i64,
    pub signups: Vec<SignupRecord>,
}

impl EnrichedEvent {
    /// Number of confirmed signups in the bucket with the given key. An
    /// empty key matches nothing.
    pub fn confirmed_in_bucket(&self, bucket_key: &str) -> i64 {
        if bucket_key.is_empty() {
            return 0;
        }
        self.signups
            .iter()
            .filter(|s| s.is_confirmed() && s.bucket_key.as_deref() == Some(bucket_key))
            .count() as i64
    }
}
