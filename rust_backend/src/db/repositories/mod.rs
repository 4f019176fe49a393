//! Repository implementations module.
//!
//! This module contains the implementations of the `StatsRepository` trait:
//! - `postgres`: PostgreSQL implementation with Diesel ORM
//! - `local`: In-memory implementation for unit testing and offline snapshots
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::{LocalRepository, LocalSnapshot};
#[cfg(feature = "postgres-repo")]
pub use postgres::PostgresRepository;
