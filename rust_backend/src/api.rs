//! Public API surface of the crate.
//!
//! Identifiers for database rows and the report DTOs that end up in the JSON
//! output. All report types derive `Serialize` with the field names the report
//! consumers expect.

pub use crate::services::report::{ConventionReport, Report};
pub use crate::services::signups::EarlySignups;
pub use crate::services::slots::{SlotStats, StatsSummary};

crate::define_id_type!(i64, ConventionId);
crate::define_id_type!(i64, EventCategoryId);
crate::define_id_type!(i64, EventId);
crate::define_id_type!(i64, RunId);
crate::define_id_type!(i64, SignupId);
crate::define_id_type!(i64, UserConProfileId);
crate::define_id_type!(i64, UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_and_display() {
        let id = ConventionId::from(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&EventId::new(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: RunId = serde_json::from_str("11").unwrap();
        assert_eq!(parsed, RunId(11));
    }
}
