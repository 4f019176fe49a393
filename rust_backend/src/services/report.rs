//! Per-convention report assembly.

use log::info;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::{StatsError, StatsResult};
use super::signups::{compute_early_signups, EarlySignups};
use super::slots::{compute_slot_stats, SlotStats};
use crate::db::StatsRepository;
use crate::models::EventFilter;

/// Statistics of one convention.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ConventionReport {
    /// Number of reportable events.
    pub events: i64,
    /// Number of runs of reportable events.
    pub runs: i64,
    pub slots: SlotStats,
    #[serde(rename = "npcSignups")]
    pub npc_signups: EarlySignups,
}

/// Reports keyed by convention name, in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    conventions: Vec<(String, ConventionReport)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a convention's report. A name seen before replaces the earlier
    /// entry in place.
    pub fn insert(&mut self, name: impl Into<String>, report: ConventionReport) {
        let name = name.into();
        match self.conventions.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = report,
            None => self.conventions.push((name, report)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConventionReport> {
        self.conventions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, report)| report)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.conventions.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.conventions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conventions.is_empty()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.conventions.len()))?;
        for (name, report) in &self.conventions {
            map.serialize_entry(name, report)?;
        }
        map.end()
    }
}

/// Compute the four statistics of one convention concurrently.
pub async fn build_convention_report(
    repo: &dyn StatsRepository,
    name: &str,
    filter: &EventFilter,
) -> StatsResult<ConventionReport> {
    let convention_id = repo
        .find_convention_id(name)
        .await?
        .ok_or_else(|| StatsError::ConventionNotFound(name.to_string()))?;

    let (events, runs, slots, npc_signups) = tokio::try_join!(
        async { Ok::<_, StatsError>(repo.count_larp_events(convention_id, filter).await?) },
        async { Ok::<_, StatsError>(repo.count_larp_runs(convention_id, filter).await?) },
        compute_slot_stats(repo, convention_id, filter),
        compute_early_signups(repo, convention_id, filter),
    )?;

    Ok(ConventionReport {
        events,
        runs,
        slots,
        npc_signups,
    })
}

/// Build the report for every convention, one convention at a time.
///
/// The first failure aborts the report.
pub async fn build_report(
    repo: &dyn StatsRepository,
    conventions: &[String],
    filter: &EventFilter,
) -> StatsResult<Report> {
    let mut report = Report::new();
    for name in conventions {
        info!("working on {}", name);
        let convention = build_convention_report(repo, name, filter).await?;
        report.insert(name.clone(), convention);
    }
    Ok(report)
}
