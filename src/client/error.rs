//! Failure taxonomy of the stats client.

use crate::domain::entities::ViewStats;

/// Why a stats call produced no data.
///
/// None of these ever reach the caller of [`crate::client::StatsApi`]; they
/// exist so tests and logs can tell the degradation paths apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsClientError {
    /// Rejected locally before any network call.
    #[error("invalid stats request: {0}")]
    InvalidRequest(&'static str),

    /// Discovery returned no usable instance after every attempt.
    #[error("failed to resolve service '{service_id}' after {attempts} attempts")]
    ResolutionFailure { service_id: String, attempts: usize },

    /// Network or HTTP failure reaching a resolved instance.
    #[error("stats call failed (status {status:?}): {message}")]
    CallFailure {
        status: Option<u16>,
        message: String,
    },
}

impl StatsClientError {
    /// Short label used for the degradation counter.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::ResolutionFailure { .. } => "resolution_failure",
            Self::CallFailure { .. } => "call_failure",
        }
    }
}

/// Result of one stats query before it is collapsed at the public boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsOutcome {
    Data(Vec<ViewStats>),
    Degraded(StatsClientError),
}

impl StatsOutcome {
    /// Collapses the outcome: degraded calls read as "no data".
    pub fn into_rows(self) -> Vec<ViewStats> {
        match self {
            Self::Data(rows) => rows,
            Self::Degraded(_) => Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}
