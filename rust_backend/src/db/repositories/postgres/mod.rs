//! Postgres repository implementation using Diesel.
//!
//! Reads the convention database directly. The repository never writes and
//! never runs migrations; the schema in [`schema`] only declares the columns
//! the statistics need.
//!
//! ## Configuration
//!
//! See [`PostgresConfig::from_env`] for the environment variables.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Text};
use serde_json::Value;
use std::time::Duration;
use tokio::task;

use crate::api::{ConventionId, EventId};
use crate::db::config::PostgresConfig;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, StatsRepository};
use crate::models::{EventFilter, EventRecord, LarpSignupRecord, SignupRecord};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Reportable events: `$1` category, `$2` status, `$3` convention id, `$4`
/// exempt titles.
const LARP_EVENTS_WHERE: &str = "upper(ec.name) = upper($1) \
     AND e.status = $2 \
     AND e.convention_id = $3 \
     AND NOT (e.title = ANY($4))";

/// Diesel-backed read-only repository for the convention database.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository with a connection pool.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if the pool cannot be built
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        Ok(Self { pool, config })
    }

    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    /// Run a blocking Diesel operation on the blocking thread pool.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection").with_details(operation),
                )
            })?;
            f(&mut conn).map_err(|e| RepositoryError::from(e).with_operation(operation))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking").with_details(operation),
            )
        })?
    }

    async fn count_with_filter(
        &self,
        operation: &'static str,
        sql: String,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<i64> {
        let filter = filter.clone();
        self.with_conn(operation, move |conn| {
            sql_query(sql)
                .bind::<Text, _>(filter.category)
                .bind::<Text, _>(filter.status)
                .bind::<BigInt, _>(convention_id.value())
                .bind::<Array<Text>, _>(filter.exempt_titles)
                .get_result::<CountRow>(conn)
                .map(|row| row.cnt)
        })
        .await
    }
}

#[async_trait]
impl StatsRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1").execute(conn).map(|_| true)
        })
        .await
    }

    async fn find_convention_id(&self, name: &str) -> RepositoryResult<Option<ConventionId>> {
        let name = name.to_string();
        self.with_conn("find_convention_id", move |conn| {
            conventions::table
                .filter(conventions::name.eq(name))
                .select(conventions::id)
                .first::<i64>(conn)
                .optional()
                .map(|id| id.map(ConventionId))
        })
        .await
    }

    async fn count_larp_events(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<i64> {
        let sql = format!(
            "SELECT count(*) AS cnt FROM events e \
             JOIN event_categories ec ON e.event_category_id = ec.id \
             WHERE {LARP_EVENTS_WHERE}"
        );
        self.count_with_filter("count_larp_events", sql, convention_id, filter)
            .await
    }

    async fn count_larp_runs(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<i64> {
        let sql = format!(
            "SELECT count(*) AS cnt FROM runs r \
             JOIN events e ON r.event_id = e.id \
             JOIN event_categories ec ON e.event_category_id = ec.id \
             WHERE {LARP_EVENTS_WHERE}"
        );
        self.count_with_filter("count_larp_runs", sql, convention_id, filter)
            .await
    }

    async fn list_larp_events(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<Vec<EventRecord>> {
        let filter = filter.clone();
        let sql = format!(
            "SELECT e.id, e.title, e.length_seconds, e.registration_policy FROM events e \
             JOIN event_categories ec ON e.event_category_id = ec.id \
             WHERE {LARP_EVENTS_WHERE} \
             ORDER BY e.id"
        );
        let rows = self
            .with_conn("list_larp_events", move |conn| {
                sql_query(sql)
                    .bind::<Text, _>(filter.category)
                    .bind::<Text, _>(filter.status)
                    .bind::<BigInt, _>(convention_id.value())
                    .bind::<Array<Text>, _>(filter.exempt_titles)
                    .load::<LarpEventRow>(conn)
            })
            .await?;
        Ok(rows.into_iter().map(EventRecord::from).collect())
    }

    async fn count_runs_for_event(&self, event_id: EventId) -> RepositoryResult<i64> {
        self.with_conn("count_runs_for_event", move |conn| {
            runs::table
                .filter(runs::event_id.eq(event_id.value()))
                .count()
                .get_result::<i64>(conn)
        })
        .await
    }

    async fn list_signups_for_event(&self, event_id: EventId) -> RepositoryResult<Vec<SignupRecord>> {
        let rows = self
            .with_conn("list_signups_for_event", move |conn| {
                signups::table
                    .inner_join(runs::table)
                    .filter(runs::event_id.eq(event_id.value()))
                    .select(EventSignupRow::as_select())
                    .load::<EventSignupRow>(conn)
            })
            .await?;
        Ok(rows.into_iter().map(SignupRecord::from).collect())
    }

    async fn list_larp_signups(
        &self,
        convention_id: ConventionId,
        filter: &EventFilter,
    ) -> RepositoryResult<Vec<LarpSignupRecord>> {
        let filter = filter.clone();
        let sql = format!(
            "SELECT e.id AS event_id, s.created_at, s.updated_at, s.bucket_key, s.state, e.title, r.starts_at, \
                    u.email, e.registration_policy \
             FROM signups s \
             JOIN runs r ON s.run_id = r.id \
             JOIN events e ON r.event_id = e.id \
             JOIN event_categories ec ON e.event_category_id = ec.id \
             LEFT JOIN user_con_profiles ucp ON ucp.id = s.user_con_profile_id \
             LEFT JOIN users u ON ucp.user_id = u.id \
             WHERE {LARP_EVENTS_WHERE} \
             ORDER BY s.created_at ASC"
        );
        let rows = self
            .with_conn("list_larp_signups", move |conn| {
                sql_query(sql)
                    .bind::<Text, _>(filter.category)
                    .bind::<Text, _>(filter.status)
                    .bind::<BigInt, _>(convention_id.value())
                    .bind::<Array<Text>, _>(filter.exempt_titles)
                    .load::<LarpSignupRow>(conn)
            })
            .await?;
        Ok(rows.into_iter().map(LarpSignupRecord::from).collect())
    }

    async fn fetch_signup_schedule(
        &self,
        convention_id: ConventionId,
    ) -> RepositoryResult<Option<Value>> {
        self.with_conn("fetch_signup_schedule", move |conn| {
            conventions::table
                .filter(conventions::id.eq(convention_id.value()))
                .select(conventions::maximum_event_signups)
                .first::<Option<Value>>(conn)
                .optional()
                .map(Option::flatten)
        })
        .await
    }
}
