//! API route configuration.
//!
//! The stats API is internal: no authentication and no rate limiting.

use crate::api::handlers::{hit_handler, stats_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Stats API routes.
///
/// # Endpoints
///
/// - `POST /hit`   - Record one hit
/// - `GET  /stats` - Aggregated hit counts for a window
pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/hit", post(hit_handler))
        .route("/stats", get(stats_handler))
}
