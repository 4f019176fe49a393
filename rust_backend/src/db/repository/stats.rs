//! Read-only queries over the convention database.
//!
//! Every event-level query applies the same [`EventFilter`] so that counts,
//! slot statistics and early signups agree on which events are reportable.

use async_trait::async_trait;
use serde_json::Value;

use super::error::RepositoryResult;
use crate::api::{ConventionId, EventId};
use crate::models::{EventFilter, EventRecord, LarpSignupRecord, SignupRecord};

/// Repository trait for the statistics queries.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the report driver issues several
/// queries concurrently against the same repository.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Check if the database connection is healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Resolve a convention name to its id.
    ///
    /// # Returns
    /// * `Ok(Some(id))` - The convention exists
    /// * `Ok(None)` - No convention has this name
    async fn find_convention_id(&self, name: &str) -> RepositoryResult<Option<ConventionId>>;

    /// Count reportable events of a convention.
    async fn count_larp_events(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<i64>;

    /// Count the runs of all reportable events of a convention.
    async fn count_larp_runs(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<i64>;

    /// List reportable events of a convention.
    async fn list_larp_events(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<Vec<EventRecord>>;

    /// Count the runs of a single event.
    async fn count_runs_for_event(&self, event_id: EventId) -> RepositoryResult<i64>;

    /// List every signup on any run of an event, regardless of state.
    async fn list_signups_for_event(&self, event_id: EventId) -> RepositoryResult<Vec<SignupRecord>>;

    /// List signups on reportable events of a convention, joined with their
    /// run, event and user, ordered by `created_at` ascending.
    async fn list_larp_signups(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<Vec<LarpSignupRecord>>;

    /// Fetch the raw `maximum_event_signups` document of a convention.
    ///
    /// # Returns
    /// * `Ok(None)` - The convention does not exist or has no schedule
    async fn fetch_signup_schedule(
        &self,
        convention_id: ConventionId,
    ) -> RepositoryResult<Option<Value>>;
}
