//! Query semantics of the in-memory repository.

mod support;

use std::sync::Arc;

use serde_json::json;

use larp_stats::api::ConventionId;
use larp_stats::db::{LocalRepository, LocalSnapshot, RepositoryError, StatsRepository};
use larp_stats::models::EventFilter;

use support::{march, players_and_npcs, Fixture};

// ============================================================================
// Event filtering
// ============================================================================

#[tokio::test]
async fn test_category_match_ignores_case() {
    let fx = Fixture::new("Intercon U");
    let upper = fx.repo.add_event_category("LARP");
    fx.larp("Lowercase Category", 3_600, players_and_npcs(4), 1);
    fx.repo.add_event(
        fx.convention,
        Some(upper),
        "Uppercase Category",
        "active",
        3_600,
        players_and_npcs(4),
    );

    let filter = EventFilter::default();
    assert_eq!(fx.repo.count_larp_events(fx.convention, &filter).await.unwrap(), 2);
}

#[tokio::test]
async fn test_uncategorized_and_inactive_events_are_skipped() {
    let fx = Fixture::new("Intercon U");
    fx.larp("Counted", 3_600, players_and_npcs(4), 2);
    fx.repo.add_event(
        fx.convention,
        None,
        "No Category",
        "active",
        3_600,
        players_and_npcs(4),
    );
    let dropped = fx.repo.add_event(
        fx.convention,
        Some(fx.larp_category),
        "Dropped",
        "dropped",
        3_600,
        players_and_npcs(4),
    );
    fx.repo.add_run(dropped, None);

    let filter = EventFilter::default();
    assert_eq!(fx.repo.count_larp_events(fx.convention, &filter).await.unwrap(), 1);
    assert_eq!(fx.repo.count_larp_runs(fx.convention, &filter).await.unwrap(), 2);

    let events = fx.repo.list_larp_events(fx.convention, &filter).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Counted");
}

#[tokio::test]
async fn test_every_listed_exemption_is_excluded() {
    let fx = Fixture::new("Intercon U");
    let filter = EventFilter::default();
    for title in &filter.exempt_titles {
        fx.larp(title, 3_600, players_and_npcs(4), 1);
    }

    assert_eq!(fx.repo.count_larp_events(fx.convention, &filter).await.unwrap(), 0);
    assert_eq!(fx.repo.count_larp_runs(fx.convention, &filter).await.unwrap(), 0);
}

#[tokio::test]
async fn test_events_of_other_conventions_are_ignored() {
    let fx = Fixture::new("Intercon U");
    let other = fx.repo.add_convention("Intercon T", None);
    fx.larp("Ours", 3_600, players_and_npcs(4), 1);
    fx.repo.add_event(
        other,
        Some(fx.larp_category),
        "Theirs",
        "active",
        3_600,
        players_and_npcs(4),
    );

    let filter = EventFilter::default();
    assert_eq!(fx.repo.count_larp_events(fx.convention, &filter).await.unwrap(), 1);
    assert_eq!(fx.repo.count_larp_events(other, &filter).await.unwrap(), 1);
    assert_eq!(
        fx.repo
            .count_larp_events(ConventionId(999), &filter)
            .await
            .unwrap(),
        0
    );
}

// ============================================================================
// Signups
// ============================================================================

#[tokio::test]
async fn test_event_signups_include_every_state_and_run() {
    let fx = Fixture::new("Intercon U");
    let event = fx.larp("Two Runs", 3_600, players_and_npcs(4), 2);
    let second_run = fx.repo.snapshot().runs[1].id;
    fx.signup(event, Some("npc"), "confirmed", march(1, 0));
    fx.signup(event, Some("npc"), "withdrawn", march(1, 1));
    fx.repo
        .add_signup(second_run, None, Some("players"), "waitlisted", march(1, 2));

    assert_eq!(fx.repo.count_runs_for_event(event).await.unwrap(), 2);
    let signups = fx.repo.list_signups_for_event(event).await.unwrap();
    assert_eq!(signups.len(), 3);
    assert_eq!(signups.iter().filter(|s| s.is_confirmed()).count(), 1);
}

#[tokio::test]
async fn test_larp_signups_are_ordered_and_joined() {
    let fx = Fixture::new("Intercon U");
    let event = fx.larp("Ordered", 3_600, players_and_npcs(4), 1);
    fx.signup(event, Some("npc"), "confirmed", march(5, 0));
    fx.signup(event, Some("players"), "confirmed", march(2, 0));
    let run = fx.repo.snapshot().runs[0].id;
    // Profile-less signup still appears, without an email
    fx.repo.add_signup(run, None, None, "confirmed", march(3, 0));

    let signups = fx
        .repo
        .list_larp_signups(fx.convention, &EventFilter::default())
        .await
        .unwrap();

    let times: Vec<_> = signups.iter().map(|s| s.created_at).collect();
    assert_eq!(times, vec![march(2, 0), march(3, 0), march(5, 0)]);
    assert_eq!(signups[0].email.as_deref(), Some("player@example.com"));
    assert_eq!(signups[1].email, None);
    assert!(signups.iter().all(|s| s.title == "Ordered" && s.event_id == event));
    assert_eq!(signups[0].starts_at, Some(march(22, 19)));
    assert_eq!(signups[0].registration_policy, players_and_npcs(4));
}

#[tokio::test]
async fn test_larp_signups_skip_exempt_events() {
    let fx = Fixture::new("Intercon U");
    let ops = fx.larp("Ops", 3_600, players_and_npcs(4), 1);
    fx.signup(ops, Some("npc"), "confirmed", march(1, 0));

    let signups = fx
        .repo
        .list_larp_signups(fx.convention, &EventFilter::default())
        .await
        .unwrap();
    assert!(signups.is_empty());
}

// ============================================================================
// Conventions
// ============================================================================

#[tokio::test]
async fn test_find_convention_and_schedule() {
    let fx = Fixture::new("Intercon U");
    let bare = fx.repo.add_convention("Intercon T", None);

    assert_eq!(
        fx.repo.find_convention_id("Intercon U").await.unwrap(),
        Some(fx.convention)
    );
    assert_eq!(fx.repo.find_convention_id("intercon u").await.unwrap(), None);
    assert_eq!(
        fx.repo.fetch_signup_schedule(fx.convention).await.unwrap(),
        Some(support::intercon_schedule())
    );
    assert_eq!(fx.repo.fetch_signup_schedule(bare).await.unwrap(), None);
    assert_eq!(
        fx.repo.fetch_signup_schedule(ConventionId(42)).await.unwrap(),
        None
    );
}

// ============================================================================
// Health and snapshots
// ============================================================================

#[tokio::test]
async fn test_unhealthy_repository_rejects_queries() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);

    assert!(!repo.health_check().await.unwrap());
    let err = repo.find_convention_id("Intercon U").await.unwrap_err();
    assert!(matches!(err, RepositoryError::ConnectionError { .. }));
    assert_eq!(err.context().operation.as_deref(), Some("find_convention_id"));

    repo.set_healthy(true);
    assert!(repo.find_convention_id("Intercon U").await.is_ok());
}

#[tokio::test]
async fn test_snapshot_file_round_trip() {
    let fx = Fixture::new("Intercon U");
    let event = fx.larp("Persisted", 7_200, players_and_npcs(8), 2);
    fx.signup(event, Some("npc"), "confirmed", march(1, 0));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, serde_json::to_string_pretty(&fx.repo.snapshot()).unwrap()).unwrap();

    let loaded = LocalRepository::from_snapshot_file(&path).unwrap();
    assert_eq!(loaded.snapshot(), fx.repo.snapshot());
    assert_eq!(loaded.count_runs_for_event(event).await.unwrap(), 2);
}

#[tokio::test]
async fn test_clear_empties_repository() {
    let fx = Fixture::new("Intercon U");
    fx.larp("Cleared", 3_600, players_and_npcs(4), 2);
    let shared = fx.repo.clone();

    fx.repo.clear();

    assert_eq!(fx.repo.snapshot(), LocalSnapshot::default());
    assert_eq!(shared.find_convention_id("Intercon U").await.unwrap(), None);
    assert_eq!(
        shared
            .count_larp_runs(fx.convention, &EventFilter::default())
            .await
            .unwrap(),
        0
    );

    // Ids restart once the tables are empty
    let again = fx.repo.add_convention("Intercon U", None);
    assert_eq!(again, fx.convention);
    assert_eq!(shared.find_convention_id("Intercon U").await.unwrap(), Some(again));
}

#[test]
fn test_snapshot_tables_default_to_empty() {
    let snapshot: LocalSnapshot = serde_json::from_value(json!({
        "conventions": [{ "id": 1, "name": "Intercon U" }]
    }))
    .unwrap();

    assert_eq!(snapshot.conventions.len(), 1);
    assert!(snapshot.conventions[0].maximum_event_signups.is_none());
    assert!(snapshot.events.is_empty());
    assert!(snapshot.signups.is_empty());
}

#[test]
fn test_invalid_snapshot_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = LocalRepository::from_snapshot_file(&path).err().unwrap();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));

    let err = LocalRepository::from_snapshot_file(dir.path().join("missing.json"))
        .err()
        .unwrap();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}

#[tokio::test]
async fn test_concurrent_readers_share_repository() {
    let fx = Fixture::new("Intercon U");
    fx.larp("Shared", 3_600, players_and_npcs(4), 3);
    let repo = Arc::new(fx.repo.clone());
    let convention = fx.convention;

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                repo.count_larp_runs(convention, &EventFilter::default())
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 3);
    }
}
