//! Service layer for the statistics.
//!
//! Services sit between the repository and the report driver. They
//! orchestrate the repository queries and implement the slot and signup
//! arithmetic.

pub mod error;

pub mod events;

pub mod report;

pub mod signups;

pub mod slots;

pub use error::{StatsError, StatsResult};
pub use events::load_larp_events;
pub use report::{build_convention_report, build_report, ConventionReport, Report};
pub use signups::{
    categorize_signup, compute_early_signups, resolve_bucket_name, tally_early_npc_signups,
    EarlySignups,
};
pub use slots::{aggregate_slots, compute_slot_stats, summarize, SlotStats, StatsSummary};
