//! # LARP Stats
//!
//! Attendance and scheduling statistics for the LARP track of a convention.
//!
//! The crate reads the convention database (conventions, events, runs and
//! signups), derives per-convention metrics in memory and renders them as a
//! single JSON report.
//!
//! ## Features
//!
//! - **Counts**: active, non-exempt LARP events and their runs
//! - **Slots**: counted capacity, NPC headcount and the size distribution of
//!   events and runs
//! - **Early signups**: confirmed NPC signups bucketed by the convention's
//!   signup schedule
//!
//! ## Architecture
//!
//! - [`api`]: identifiers and report DTOs
//! - [`models`]: registration policies, signup schedules and event filters
//! - [`db`]: repository pattern with Postgres and in-memory backends
//! - [`services`]: event loading, slot aggregation, signup categorization and
//!   the report driver

// Allow large error types - RepositoryError carries context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod db;
pub mod models;
pub mod services;
