//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Wire types shared with the stats client
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
