//! Loading of reportable events with their runs and signups.

use futures::future::try_join_all;
use log::debug;

use super::error::{StatsError, StatsResult};
use crate::api::ConventionId;
use crate::db::StatsRepository;
use crate::models::{EnrichedEvent, EventFilter, EventRecord, RegistrationPolicy};

/// Load every reportable event of a convention, enriched with its run count,
/// its signups (all states) and its parsed registration policy.
///
/// The per-event queries run concurrently. Events keep the order returned by
/// the repository. The first failure aborts the whole load.
pub async fn load_larp_events(
    repo: &dyn StatsRepository,
    convention_id: ConventionId,
    filter: &EventFilter,
) -> StatsResult<Vec<EnrichedEvent>> {
    let events = repo.list_larp_events(convention_id, filter).await?;
    debug!(
        "Loaded {} reportable events for convention {}",
        events.len(),
        convention_id
    );

    try_join_all(events.into_iter().map(|event| enrich(repo, event))).await
}

async fn enrich(repo: &dyn StatsRepository, event: EventRecord) -> StatsResult<EnrichedEvent> {
    let (run_count, signups) = tokio::try_join!(
        repo.count_runs_for_event(event.id),
        repo.list_signups_for_event(event.id),
    )?;

    let policy = RegistrationPolicy::from_value(&event.registration_policy).map_err(|reason| {
        StatsError::MalformedRegistrationPolicy {
            event_id: event.id,
            title: event.title.clone(),
            reason,
        }
    })?;

    Ok(EnrichedEvent {
        event,
        policy,
        run_count,
        signups,
    })
}
