#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use larp_stats::api::{ConventionId, EventCategoryId, EventId};
use larp_stats::db::LocalRepository;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Fixed timestamp in March 2024, the month of the fixture convention.
pub fn march(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

/// Signup schedule with a closed period, a "1" round starting March 10 and
/// an "unlimited" round starting March 20.
pub fn intercon_schedule() -> Value {
    json!({ "timespans": [
        { "start": null, "finish": "2024-03-10T17:00:00Z", "value": 0 },
        { "start": "2024-03-10T17:00:00Z", "finish": "2024-03-20T17:00:00Z", "value": "1" },
        { "start": "2024-03-20T17:00:00Z", "finish": null, "value": "unlimited" }
    ] })
}

/// Policy with a counted player bucket and an uncounted NPC bucket.
pub fn players_and_npcs(players: i64) -> Value {
    json!({ "buckets": [
        { "key": "players", "name": "Players", "total_slots": players },
        { "key": "npc", "name": "NPC", "total_slots": null, "not_counted": true }
    ] })
}

/// A local repository holding one convention with a LARP category.
pub struct Fixture {
    pub repo: LocalRepository,
    pub convention: ConventionId,
    pub larp_category: EventCategoryId,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        let repo = LocalRepository::new();
        let convention = repo.add_convention(name, Some(intercon_schedule()));
        let larp = repo.add_event_category("Larp");
        Self {
            repo,
            convention,
            larp_category: larp,
        }
    }

    /// Active LARP event with `runs` runs; returns the event id.
    pub fn larp(&self, title: &str, length_seconds: i32, policy: Value, runs: usize) -> EventId {
        let event = self.repo.add_event(
            self.convention,
            Some(self.larp_category),
            title,
            "active",
            length_seconds,
            policy,
        );
        for i in 0..runs {
            self.repo.add_run(event, Some(march(22 + i as u32, 19)));
        }
        event
    }

    /// Signup on the first run of `event`, made by a fresh user profile.
    pub fn signup(
        &self,
        event: EventId,
        bucket_key: Option<&str>,
        state: &str,
        created_at: DateTime<Utc>,
    ) {
        let snapshot = self.repo.snapshot();
        let run = snapshot
            .runs
            .iter()
            .find(|r| r.event_id == event)
            .map(|r| r.id)
            .expect("event has no runs");
        let user = self.repo.add_user(Some("player@example.com"));
        let profile = self.repo.add_user_con_profile(Some(user));
        self.repo
            .add_signup(run, Some(profile), bucket_key, state, created_at);
    }
}
