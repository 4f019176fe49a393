//! Database module for the convention database.
//!
//! This module provides read-only access to conventions, events, runs and
//! signups via the Repository pattern, allowing the storage backend to be
//! swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Report driver (services::report, bin/larp_stats.rs)    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services - event loading, slots, early signups         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  StatsRepository trait (repository/) - read-only queries │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Postgres (Diesel)│     │ Local Repository        │
//! │ (SQL queries)    │     │ (in-memory / snapshot)  │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use larp_stats::db::{RepositoryConfig, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RepositoryConfig::from_file("larp_stats.toml")?;
//!     let repo = RepositoryFactory::from_repository_config(&config).await?;
//!     let id = repo.find_convention_id("Intercon U").await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use config::PostgresConfig;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::{RepositoryConfig, DEFAULT_CONVENTIONS};
pub use repositories::{LocalRepository, LocalSnapshot};
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{ErrorContext, RepositoryError, RepositoryResult, StatsRepository};
