//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`StatsRepository`]
//! suitable for unit testing, local development and offline runs against a
//! JSON snapshot of the convention database. Tables are plain `Vec`s and every
//! query reproduces the filtering, joining and ordering of the SQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::{
    ConventionId, EventCategoryId, EventId, RunId, SignupId, UserConProfileId, UserId,
};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, StatsRepository};
use crate::models::{EventFilter, EventRecord, LarpSignupRecord, SignupRecord};

/// Row of the `conventions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConventionRow {
    pub id: ConventionId,
    pub name: String,
    #[serde(default)]
    pub maximum_event_signups: Option<Value>,
}

/// Row of the `event_categories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCategoryRow {
    pub id: EventCategoryId,
    pub name: String,
}

/// Row of the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: EventId,
    pub convention_id: ConventionId,
    #[serde(default)]
    pub event_category_id: Option<EventCategoryId>,
    pub title: String,
    pub status: String,
    pub length_seconds: i32,
    #[serde(default)]
    pub registration_policy: Value,
}

/// Row of the `runs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRow {
    pub id: RunId,
    pub event_id: EventId,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
}

/// Row of the `signups` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRow {
    pub id: SignupId,
    pub run_id: RunId,
    #[serde(default)]
    pub user_con_profile_id: Option<UserConProfileId>,
    #[serde(default)]
    pub bucket_key: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `user_con_profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConProfileRow {
    pub id: UserConProfileId,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// Full contents of the in-memory database, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSnapshot {
    #[serde(default)]
    pub conventions: Vec<ConventionRow>,
    #[serde(default)]
    pub event_categories: Vec<EventCategoryRow>,
    #[serde(default)]
    pub events: Vec<EventRow>,
    #[serde(default)]
    pub runs: Vec<RunRow>,
    #[serde(default)]
    pub signups: Vec<SignupRow>,
    #[serde(default)]
    pub user_con_profiles: Vec<UserConProfileRow>,
    #[serde(default)]
    pub users: Vec<UserRow>,
}

struct LocalData {
    tables: LocalSnapshot,
    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            tables: LocalSnapshot::default(),
            is_healthy: true,
        }
    }
}

impl LocalData {
    fn category_name(&self, id: Option<EventCategoryId>) -> Option<&str> {
        let id = id?;
        self.tables
            .event_categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    fn larp_events<'a>(
        &'a self,
        convention_id: ConventionId,
        filter: &'a EventFilter,
    ) -> impl Iterator<Item = &'a EventRow> + 'a {
        self.tables.events.iter().filter(move |e| {
            e.convention_id == convention_id
                && filter.accepts(self.category_name(e.event_category_id), &e.status, &e.title)
        })
    }

    fn run(&self, id: RunId) -> Option<&RunRow> {
        self.tables.runs.iter().find(|r| r.id == id)
    }

    fn email_for_profile(&self, profile_id: Option<UserConProfileId>) -> Option<String> {
        let profile = self
            .tables
            .user_con_profiles
            .iter()
            .find(|p| Some(p.id) == profile_id)?;
        let user_id = profile.user_id?;
        self.tables
            .users
            .iter()
            .find(|u| u.id == user_id)
            .and_then(|u| u.email.clone())
    }
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use larp_stats::db::repositories::LocalRepository;
/// use serde_json::json;
///
/// let repo = LocalRepository::new();
/// let con = repo.add_convention("Intercon U", None);
/// let larp = repo.add_event_category("Larp");
/// repo.add_event(con, Some(larp), "The Last Voyage", "active", 14_400, json!({ "buckets": [] }));
/// assert_eq!(repo.event_count(), 1);
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with a snapshot.
    pub fn from_snapshot(snapshot: LocalSnapshot) -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                tables: snapshot,
                is_healthy: true,
            })),
        }
    }

    /// Load a JSON snapshot file.
    pub fn from_snapshot_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::ConfigurationError {
                message: format!("Failed to read snapshot: {}", e),
                context: ErrorContext::new("load_snapshot").with_details(path.display().to_string()),
            }
        })?;
        let snapshot: LocalSnapshot = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::ConfigurationError {
                message: format!("Failed to parse snapshot: {}", e),
                context: ErrorContext::new("load_snapshot").with_details(path.display().to_string()),
            }
        })?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> LocalSnapshot {
        self.read().tables.clone()
    }

    // Lock poisoning only happens if a writer panicked; the tables are still
    // consistent because every write is a single push.
    fn read(&self) -> RwLockReadGuard<'_, LocalData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, LocalData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.write().is_healthy = healthy;
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "local repository marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        self.write().tables = LocalSnapshot::default();
    }

    pub fn add_convention(
        &self,
        name: impl Into<String>,
        maximum_event_signups: Option<Value>,
    ) -> ConventionId {
        let mut data = self.write();
        let id = ConventionId(next_id(data.tables.conventions.iter().map(|c| c.id.0)));
        data.tables.conventions.push(ConventionRow {
            id,
            name: name.into(),
            maximum_event_signups,
        });
        id
    }

    pub fn add_event_category(&self, name: impl Into<String>) -> EventCategoryId {
        let mut data = self.write();
        let id = EventCategoryId(next_id(data.tables.event_categories.iter().map(|c| c.id.0)));
        data.tables.event_categories.push(EventCategoryRow {
            id,
            name: name.into(),
        });
        id
    }

    pub fn add_event(
        &self,
        convention_id: ConventionId,
        event_category_id: Option<EventCategoryId>,
        title: impl Into<String>,
        status: impl Into<String>,
        length_seconds: i32,
        registration_policy: Value,
    ) -> EventId {
        let mut data = self.write();
        let id = EventId(next_id(data.tables.events.iter().map(|e| e.id.0)));
        data.tables.events.push(EventRow {
            id,
            convention_id,
            event_category_id,
            title: title.into(),
            status: status.into(),
            length_seconds,
            registration_policy,
        });
        id
    }

    pub fn add_run(&self, event_id: EventId, starts_at: Option<DateTime<Utc>>) -> RunId {
        let mut data = self.write();
        let id = RunId(next_id(data.tables.runs.iter().map(|r| r.id.0)));
        data.tables.runs.push(RunRow {
            id,
            event_id,
            starts_at,
        });
        id
    }

    pub fn add_user(&self, email: Option<&str>) -> UserId {
        let mut data = self.write();
        let id = UserId(next_id(data.tables.users.iter().map(|u| u.id.0)));
        data.tables.users.push(UserRow {
            id,
            email: email.map(str::to_string),
        });
        id
    }

    pub fn add_user_con_profile(&self, user_id: Option<UserId>) -> UserConProfileId {
        let mut data = self.write();
        let id = UserConProfileId(next_id(data.tables.user_con_profiles.iter().map(|p| p.id.0)));
        data.tables
            .user_con_profiles
            .push(UserConProfileRow { id, user_id });
        id
    }

    pub fn add_signup(
        &self,
        run_id: RunId,
        user_con_profile_id: Option<UserConProfileId>,
        bucket_key: Option<&str>,
        state: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> SignupId {
        let mut data = self.write();
        let id = SignupId(next_id(data.tables.signups.iter().map(|s| s.id.0)));
        data.tables.signups.push(SignupRow {
            id,
            run_id,
            user_con_profile_id,
            bucket_key: bucket_key.map(str::to_string),
            state: state.into(),
            created_at,
            updated_at: created_at,
        });
        id
    }

    /// Get the number of events stored, reportable or not.
    pub fn event_count(&self) -> usize {
        self.read().tables.events.len()
    }
}

#[async_trait]
impl StatsRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.read().is_healthy)
    }

    async fn find_convention_id(&self, name: &str) -> RepositoryResult<Option<ConventionId>> {
        self.ensure_healthy("find_convention_id")?;
        let data = self.read();
        Ok(data
            .tables
            .conventions
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id))
    }

    async fn count_larp_events(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<i64> {
        self.ensure_healthy("count_larp_events")?;
        let data = self.read();
        Ok(data.larp_events(convention_id, filter).count() as i64)
    }

    async fn count_larp_runs(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<i64> {
        self.ensure_healthy("count_larp_runs")?;
        let data = self.read();
        let event_ids: Vec<EventId> = data.larp_events(convention_id, filter).map(|e| e.id).collect();
        Ok(data
            .tables
            .runs
            .iter()
            .filter(|r| event_ids.contains(&r.event_id))
            .count() as i64)
    }

    async fn list_larp_events(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<Vec<EventRecord>> {
        self.ensure_healthy("list_larp_events")?;
        let data = self.read();
        Ok(data
            .larp_events(convention_id, filter)
            .map(|e| EventRecord {
                id: e.id,
                title: e.title.clone(),
                length_seconds: e.length_seconds,
                registration_policy: e.registration_policy.clone(),
            })
            .collect())
    }

    async fn count_runs_for_event(&self, event_id: EventId) -> RepositoryResult<i64> {
        self.ensure_healthy("count_runs_for_event")?;
        let data = self.read();
        Ok(data
            .tables
            .runs
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn list_signups_for_event(&self, event_id: EventId) -> RepositoryResult<Vec<SignupRecord>> {
        self.ensure_healthy("list_signups_for_event")?;
        let data = self.read();
        Ok(data
            .tables
            .signups
            .iter()
            .filter(|s| data.run(s.run_id).is_some_and(|r| r.event_id == event_id))
            .map(|s| SignupRecord {
                bucket_key: s.bucket_key.clone(),
                state: s.state.clone(),
                created_at: s.created_at,
            })
            .collect())
    }

    async fn list_larp_signups(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<Vec<LarpSignupRecord>> {
        self.ensure_healthy("list_larp_signups")?;
        let data = self.read();
        let events: Vec<&EventRow> = data.larp_events(convention_id, filter).collect();

        let mut signups: Vec<LarpSignupRecord> = data
            .tables
            .signups
            .iter()
            .filter_map(|s| {
                let run = data.run(s.run_id)?;
                let event = events.iter().find(|e| e.id == run.event_id)?;
                Some(LarpSignupRecord {
                    event_id: event.id,
                    created_at: s.created_at,
                    updated_at: s.updated_at,
                    bucket_key: s.bucket_key.clone(),
                    state: s.state.clone(),
                    title: event.title.clone(),
                    starts_at: run.starts_at,
                    email: data.email_for_profile(s.user_con_profile_id),
                    registration_policy: event.registration_policy.clone(),
                })
            })
            .collect();
        signups.sort_by_key(|s| s.created_at);
        Ok(signups)
    }

    async fn fetch_signup_schedule(
        &self,
        convention_id: ConventionId,
    ) -> RepositoryResult<Option<Value>> {
        self.ensure_healthy("fetch_signup_schedule")?;
        let data = self.read();
        Ok(data
            .tables
            .conventions
            .iter()
            .find(|c| c.id == convention_id)
            .and_then(|c| c.maximum_event_signups.clone()))
    }
}
