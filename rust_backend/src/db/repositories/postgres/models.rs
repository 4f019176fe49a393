use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Jsonb, Nullable, Text, Timestamp};
use serde_json::Value;

use super::schema::signups;
use crate::api::EventId;
use crate::models::{EventRecord, LarpSignupRecord, SignupRecord};

#[derive(Debug, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub cnt: i64,
}

#[derive(Debug, Clone, QueryableByName)]
pub struct LarpEventRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Integer)]
    pub length_seconds: i32,
    #[diesel(sql_type = Nullable<Jsonb>)]
    pub registration_policy: Option<Value>,
}

impl From<LarpEventRow> for EventRecord {
    fn from(row: LarpEventRow) -> Self {
        EventRecord {
            id: EventId(row.id),
            title: row.title,
            length_seconds: row.length_seconds,
            registration_policy: row.registration_policy.unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = signups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventSignupRow {
    pub bucket_key: Option<String>,
    pub state: String,
    pub created_at: NaiveDateTime,
}

impl From<EventSignupRow> for SignupRecord {
    fn from(row: EventSignupRow) -> Self {
        SignupRecord {
            bucket_key: row.bucket_key,
            state: row.state,
            created_at: row.created_at.and_utc(),
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct LarpSignupRow {
    #[diesel(sql_type = BigInt)]
    pub event_id: i64,
    #[diesel(sql_type = Timestamp)]
    pub created_at: NaiveDateTime,
    #[diesel(sql_type = Timestamp)]
    pub updated_at: NaiveDateTime,
    #[diesel(sql_type = Nullable<Text>)]
    pub bucket_key: Option<String>,
    #[diesel(sql_type = Text)]
    pub state: String,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Nullable<Timestamp>)]
    pub starts_at: Option<NaiveDateTime>,
    #[diesel(sql_type = Nullable<Text>)]
    pub email: Option<String>,
    #[diesel(sql_type = Nullable<Jsonb>)]
    pub registration_policy: Option<Value>,
}

impl From<LarpSignupRow> for LarpSignupRecord {
    fn from(row: LarpSignupRow) -> Self {
        LarpSignupRecord {
            event_id: EventId(row.event_id),
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
            bucket_key: row.bucket_key,
            state: row.state,
            title: row.title,
            starts_at: row.starts_at.map(|t| t.and_utc()),
            email: row.email,
            registration_policy: row.registration_policy.unwrap_or(Value::Null),
        }
    }
}
