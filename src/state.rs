//! Shared state injected into every stats API handler.

use std::sync::Arc;

use crate::application::services::StatsService;
use crate::domain::repositories::HitRepository;

#[derive(Clone)]
pub struct AppState {
    pub stats_service: Arc<StatsService<dyn HitRepository>>,
}

impl AppState {
    /// Builds the state around a hit store.
    pub fn new(repository: Arc<dyn HitRepository>) -> Self {
        Self {
            stats_service: Arc::new(StatsService::new(repository)),
        }
    }
}
