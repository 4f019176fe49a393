//! Domain models for the convention database.
//!
//! - [`records`]: rows as returned by the repositories
//! - [`policy`]: event registration policies and their buckets
//! - [`schedule`]: the convention's signup schedule (timespans)
//! - [`filter`]: which events count as reportable LARP events

pub mod filter;
pub mod macros;
pub mod policy;
pub mod records;
pub mod schedule;

pub use filter::*;
pub use policy::*;
pub use records::*;
pub use schedule::*;
