//! Errors raised while computing the report.

use crate::api::{ConventionId, EventId};
use crate::db::RepositoryError;

/// Result type for the statistics services
pub type StatsResult<T> = Result<T, StatsError>;

/// Error type for the statistics services.
///
/// Any of these aborts the whole report; there is no partial output.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// No convention has the configured name.
    #[error("Convention not found: {0}")]
    ConventionNotFound(String),

    /// The convention has no `maximum_event_signups` configuration.
    #[error("Signup schedule missing for convention {convention_id}")]
    ScheduleMissing { convention_id: ConventionId },

    /// `maximum_event_signups` exists but cannot be read.
    #[error("Malformed signup schedule for convention {convention_id}: {reason}")]
    MalformedSchedule {
        convention_id: ConventionId,
        reason: String,
    },

    /// An event's registration policy has no usable bucket list.
    #[error("Malformed registration policy for event {event_id} ({title}): {reason}")]
    MalformedRegistrationPolicy {
        event_id: EventId,
        title: String,
        reason: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
