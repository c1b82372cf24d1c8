//! Aggregation query over the hit store.

use chrono::NaiveDateTime;

use crate::error::AppError;

/// Parameters of one aggregation request.
///
/// The window is inclusive on both ends. An empty `uris` list means
/// "no filter": the store counts every URI inside the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub uris: Vec<String>,
    pub unique: bool,
}

impl StatsQuery {
    /// Creates a query over `[start, end]` for every URI, counting all hits.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRange`] if `start` is after `end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::invalid_range(start, end));
        }

        Ok(Self {
            start,
            end,
            uris: Vec::new(),
            unique: false,
        })
    }

    /// Restricts the query to the given URIs. An empty list keeps it unfiltered.
    pub fn with_uris(mut self, uris: Vec<String>) -> Self {
        self.uris = uris;
        self
    }

    /// Switches between counting every hit and counting distinct IPs.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Returns `true` when the query restricts URIs.
    pub fn has_uri_filter(&self) -> bool {
        !self.uris.is_empty()
    }

    /// Returns `true` when `moment` falls inside the inclusive window.
    pub fn covers(&self, moment: NaiveDateTime) -> bool {
        self.start <= moment && moment <= self.end
    }
}
