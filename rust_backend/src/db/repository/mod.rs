//! Repository trait definitions for database operations.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`stats`]: Read-only queries backing the convention statistics
//!
//! Implementations live in [`crate::db::repositories`]. Services take a
//! `&dyn StatsRepository` (or a generic `R: StatsRepository`) so the same code
//! runs against Postgres and the in-memory repository.

pub mod error;
pub mod stats;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use stats::StatsRepository;
