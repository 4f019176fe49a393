//! Slot totals and event/run size distributions.

use log::debug;
use serde::Serialize;

use super::error::StatsResult;
use super::events::load_larp_events;
use crate::api::ConventionId;
use crate::db::StatsRepository;
use crate::models::{EnrichedEvent, EventFilter};

/// Summary statistics of a list of sizes.
///
/// `avg` is rounded half-up to one decimal and is `NaN` (serialized as `null`)
/// for an empty list. `median` is the element at index `ceil(n / 2)` of the
/// sorted list, which leans high and is absent for a single element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub size: usize,
    pub sum: i64,
    pub avg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<i64>,
}

/// Summarize a list of sizes. Input order does not matter.
pub fn summarize(values: &[i64]) -> StatsSummary {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let size = sorted.len();
    let sum: i64 = sorted.iter().sum();
    let avg = round_half_up(sum as f64 / size as f64 * 10.0) / 10.0;

    StatsSummary {
        size,
        sum,
        avg,
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        median: sorted.get(size.div_ceil(2)).copied(),
    }
}

/// Rounds halves toward positive infinity (`-2.5` becomes `-2`).
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Slot statistics of one convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotStats {
    /// Counted capacity across all runs.
    pub slots: i64,
    #[serde(rename = "slotHours")]
    pub slot_hours: f64,
    /// Confirmed signups in uncounted buckets.
    #[serde(rename = "slotNPC")]
    pub slot_npc: i64,
    #[serde(rename = "slotNPCHours")]
    pub slot_npc_hours: f64,
    pub runstats: StatsSummary,
    #[serde(rename = "eventStats")]
    pub event_stats: StatsSummary,
    #[serde(rename = "runStatsNPC")]
    pub run_stats_npc: StatsSummary,
}

/// Fold enriched events into slot totals and size distributions.
///
/// Counted buckets add their capacity once per run; uncounted buckets add
/// the number of confirmed signups holding their key.
pub fn aggregate_slots(events: &[EnrichedEvent]) -> SlotStats {
    let mut slots = 0i64;
    let mut slot_hours = 0.0f64;
    let mut slot_npc = 0i64;
    let mut slot_npc_hours = 0.0f64;

    let mut event_sizes = Vec::with_capacity(events.len());
    let mut run_sizes = Vec::new();
    let mut run_sizes_npc = Vec::new();

    for enriched in events {
        let hours = enriched.event.length_hours();
        let runs = enriched.run_count;
        let mut size = 0i64;
        let mut npc_size = 0i64;

        for bucket in &enriched.policy.buckets {
            if bucket.is_counted() {
                let capacity = bucket.slots();
                slots += capacity * runs;
                slot_hours += (capacity * runs) as f64 * hours;
                size += capacity;
                debug!(
                    "{}: bucket '{}' counts {} slots x {} runs",
                    enriched.event.title, bucket.key, capacity, runs
                );
            } else {
                let confirmed = enriched.confirmed_in_bucket(&bucket.key);
                slot_npc += confirmed;
                slot_npc_hours += confirmed as f64 * hours;
                npc_size += confirmed;
                debug!(
                    "{}: uncounted bucket '{}' has {} confirmed signups",
                    enriched.event.title, bucket.key, confirmed
                );
            }
        }

        event_sizes.push(size);
        for _ in 0..runs {
            run_sizes.push(size);
            run_sizes_npc.push(size + npc_size);
        }
        debug!(
            "{}: size {} (+{} npc), {} runs, {:.2} hours",
            enriched.event.title, size, npc_size, runs, hours
        );
    }

    SlotStats {
        slots,
        slot_hours,
        slot_npc,
        slot_npc_hours,
        runstats: summarize(&run_sizes),
        event_stats: summarize(&event_sizes),
        run_stats_npc: summarize(&run_sizes_npc),
    }
}

/// Load the reportable events of a convention and aggregate their slots.
pub async fn compute_slot_stats(
    repo: &dyn StatsRepository,
    convention_id: ConventionId,
    filter: &EventFilter,
) -> StatsResult<SlotStats> {
    let events = load_larp_events(repo, convention_id, filter).await?;
    Ok(aggregate_slots(&events))
}
