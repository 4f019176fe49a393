//! Early NPC signups, categorized against the convention's signup schedule.
//!
//! A signup counts when its bucket name starts with "npc" (any case) and it
//! is confirmed. Each counted signup is labelled with the first schedule
//! cutoff that had not started yet when the signup was made.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::error::{StatsError, StatsResult};
use crate::api::ConventionId;
use crate::db::StatsRepository;
use crate::models::{EventFilter, LarpSignupRecord, RegistrationPolicy, SignupSchedule};

/// Signup count per schedule label, e.g. `{"Before 1": 3, "Unknown": 1}`.
///
/// Labels keep the order in which they were first recorded. Signups arrive
/// oldest first, so the serialized keys read in schedule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarlySignups {
    counts: Vec<(String, u64)>,
}

impl EarlySignups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one signup under `label`.
    pub fn record(&mut self, label: impl Into<String>) {
        let label = label.into();
        match self.counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label, 1)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&u64> {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, count)| count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Number of signups across all labels.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl Serialize for EarlySignups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (label, count) in &self.counts {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Name given to signups without a bucket (team members).
pub const TEAM_MEMBER_BUCKET: &str = "Event Team Member";
/// Name given to signups whose bucket key is not in the policy.
pub const UNKNOWN_BUCKET: &str = "unknown";
/// Label for signups made after every scheduled cutoff.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

const NPC_PREFIX: &str = "npc";

/// Resolve the display name of a signup's bucket.
///
/// The policy is only parsed when the signup holds a bucket key.
pub fn resolve_bucket_name(
    bucket_key: Option<&str>,
    registration_policy: &Value,
) -> Result<String, String> {
    let key = match bucket_key {
        Some(key) if !key.is_empty() => key,
        _ => return Ok(TEAM_MEMBER_BUCKET.to_string()),
    };

    let policy = RegistrationPolicy::from_value(registration_policy)?;
    Ok(policy
        .find_bucket(key)
        .map(|bucket| bucket.name.clone())
        .unwrap_or_else(|| UNKNOWN_BUCKET.to_string()))
}

fn is_npc_bucket(name: &str) -> bool {
    name.get(..NPC_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(NPC_PREFIX))
}

/// Label a signup with the first timespan, in stored order, that starts
/// strictly after the signup was created.
pub fn categorize_signup(created_at: DateTime<Utc>, schedule: &SignupSchedule) -> String {
    schedule
        .timespans
        .iter()
        .find(|span| span.start.is_some_and(|start| start > created_at))
        .map(|span| format!("Before {}", span.label()))
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Count confirmed NPC signups per schedule label.
pub fn tally_early_npc_signups(
    signups: &[LarpSignupRecord],
    schedule: &SignupSchedule,
) -> StatsResult<EarlySignups> {
    let mut tally = EarlySignups::new();

    for signup in signups {
        let bucket_name = resolve_bucket_name(signup.bucket_key.as_deref(), &signup.registration_policy)
            .map_err(|reason| StatsError::MalformedRegistrationPolicy {
                event_id: signup.event_id,
                title: signup.title.clone(),
                reason,
            })?;

        if !is_npc_bucket(&bucket_name) || !signup.is_confirmed() {
            continue;
        }

        let category = categorize_signup(signup.created_at, schedule);
        debug!(
            "{} signed up for {} ({}) at {}: {}",
            signup.email.as_deref().unwrap_or("<no email>"),
            signup.title,
            bucket_name,
            signup.created_at,
            category
        );
        tally.record(category);
    }

    Ok(tally)
}

/// Fetch the convention's signups and schedule and tally the early NPC
/// signups.
pub async fn compute_early_signups(
    repo: &dyn StatsRepository,
    convention_id: ConventionId,
    filter: &EventFilter,
) -> StatsResult<EarlySignups> {
    let (signups, schedule) = tokio::try_join!(
        repo.list_larp_signups(convention_id, filter),
        repo.fetch_signup_schedule(convention_id),
    )?;

    let schedule = match schedule {
        Some(value) if !value.is_null() => value,
        _ => return Err(StatsError::ScheduleMissing { convention_id }),
    };
    let schedule = SignupSchedule::from_value(&schedule)
        .map_err(|reason| StatsError::MalformedSchedule {
            convention_id,
            reason,
        })?;

    info!(
        "Categorizing {} signups against {} schedule cutoffs",
        signups.len(),
        schedule.timespans.len()
    );
    tally_early_npc_signups(&signups, &schedule)
}
