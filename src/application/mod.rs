//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::stats_service::StatsService`] - Hit recording and aggregation

pub mod services;
