//! Client side of the stats service, used by the main application.
//!
//! - [`discovery`] - Service locators and bounded retry for address resolution
//! - [`stats_client`] - [`StatsApi`] and its HTTP implementation
//! - [`hit_forwarder`] - Bounded queue feeding hits to the stats service
//! - [`middleware`] - Axum middleware recording a hit per request
//!
//! Every failure on this side degrades: a hit that cannot be delivered is
//! dropped, a query that cannot be answered reads as "no data".

pub mod discovery;
pub mod error;
pub mod hit_forwarder;
pub mod middleware;
pub mod request;
pub mod stats_client;

pub use discovery::{
    ConsulServiceLocator, DiscoveryError, RetryPolicy, ServiceInstance, ServiceLocator,
    StaticServiceLocator,
};
pub use error::{StatsClientError, StatsOutcome};
pub use hit_forwarder::{HitRecorder, spawn_hit_forwarder};
pub use request::StatsRequest;
pub use stats_client::{StatsApi, StatsClient};

#[cfg(test)]
pub use stats_client::MockStatsApi;
