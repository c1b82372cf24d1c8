//! Domain layer containing business entities and repository contracts.
//!
//! - [`entities`] - Hit records and aggregate rows
//! - [`stats_query`] - Validated aggregation window
//! - [`repositories`] - Storage trait implemented by the infrastructure layer
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.

pub mod entities;
pub mod repositories;
pub mod stats_query;

pub use stats_query::StatsQuery;
