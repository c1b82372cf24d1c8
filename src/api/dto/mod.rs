//! Data Transfer Objects for API requests and responses.
//!
//! These types are shared by the stats server and by
//! [`crate::client::StatsClient`], so both sides agree on the wire format.

pub mod health;
pub mod hit;
pub mod stats;
