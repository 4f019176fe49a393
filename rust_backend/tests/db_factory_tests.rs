//! Tests for db::factory and db::repo_config - repository creation and configuration.

mod support;

use std::str::FromStr;

use serde_json::json;

use larp_stats::db::{
    LocalRepository, PostgresConfig, RepositoryConfig, RepositoryError, RepositoryFactory,
    RepositoryType, StatsRepository, DEFAULT_CONVENTIONS,
};

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("POSTGRES").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("pg").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("Local").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("sqlite").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/intercode")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_from_env_explicit_wins() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("local")),
            ("DATABASE_URL", Some("postgres://localhost/intercode")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_postgres_config_from_env() {
    support::with_scoped_env(
        &[
            ("DATABASE_URL", Some("postgres://intercode@db/intercode")),
            ("PG_DATABASE_URL", None),
            ("PG_POOL_MAX", Some("4")),
            ("PG_POOL_MIN", None),
            ("PG_CONN_TIMEOUT_SEC", Some("5")),
        ],
        || {
            let config = PostgresConfig::from_env().unwrap();
            assert_eq!(config.database_url, "postgres://intercode@db/intercode");
            assert_eq!(config.max_pool_size, 4);
            assert_eq!(config.min_pool_size, 1);
            assert_eq!(config.connection_timeout_sec, 5);
        },
    );
}

#[test]
fn test_postgres_config_requires_url() {
    support::with_scoped_env(&[("DATABASE_URL", None), ("PG_DATABASE_URL", None)], || {
        assert!(PostgresConfig::from_env().is_err());
    });
}

#[test]
fn test_report_settings_from_toml() {
    let config = RepositoryConfig::from_toml_str(
        r#"
        [repository]
        type = "local"

        [local]
        snapshot = "data/intercon.json"

        [report]
        conventions = ["Intercon S"]
        extra_exempt_titles = ["Tea Dance", "Ops"]
        "#,
    )
    .unwrap();

    assert_eq!(config.report.conventions, vec!["Intercon S"]);
    assert_eq!(
        config.local.snapshot.as_deref(),
        Some(std::path::Path::new("data/intercon.json"))
    );
    let filter = config.event_filter();
    assert!(filter.is_exempt("Tea Dance"));
    assert!(filter.is_exempt("Ops"));
    assert_eq!(filter.exempt_titles.iter().filter(|t| *t == "Ops").count(), 1);
}

#[test]
fn test_default_conventions() {
    let config = RepositoryConfig::default();
    assert_eq!(config.report.conventions, DEFAULT_CONVENTIONS);
}

#[test]
fn test_invalid_toml_is_a_configuration_error() {
    let err = RepositoryConfig::from_toml_str("[report\nconventions = 3").unwrap_err();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));

    let config = RepositoryConfig::from_toml_str("[repository]\ntype = \"mysql\"").unwrap();
    assert!(config.repository_type().is_err());
}

#[test]
fn test_postgres_config_falls_back_to_env() {
    let config = RepositoryConfig::from_toml_str("[repository]\ntype = \"postgres\"").unwrap();
    support::with_scoped_env(
        &[
            ("DATABASE_URL", Some("postgres://env@localhost/intercode")),
            ("PG_DATABASE_URL", None),
        ],
        || {
            let pg = config.to_postgres_config().unwrap().unwrap();
            assert_eq!(pg.database_url, "postgres://env@localhost/intercode");
            assert_eq!(pg.max_pool_size, 10);
        },
    );
}

#[tokio::test]
async fn test_factory_loads_snapshot_from_config_file() {
    let source = LocalRepository::new();
    source.add_convention("Intercon U", Some(json!({ "timespans": [] })));

    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("snapshot.json");
    std::fs::write(&snapshot, serde_json::to_string(&source.snapshot()).unwrap()).unwrap();

    let config_path = dir.path().join("larp_stats.toml");
    std::fs::write(
        &config_path,
        format!(
            "[repository]\ntype = \"local\"\n\n[local]\nsnapshot = {:?}\n",
            snapshot.display().to_string()
        ),
    )
    .unwrap();

    let repo = RepositoryFactory::from_config_file(&config_path).await.unwrap();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.find_convention_id("Intercon U").await.unwrap().is_some());
}

#[tokio::test]
async fn test_factory_reports_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = RepositoryFactory::from_config_file(dir.path().join("absent.toml")).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}
