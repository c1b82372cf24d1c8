//! Client-side stats query with local pre-validation.

use chrono::NaiveDateTime;

use crate::client::error::StatsClientError;
use crate::utils::timestamp;

/// A stats query as the main application builds it.
///
/// Unlike [`crate::domain::StatsQuery`], every field may be absent, and an
/// explicitly empty `uris` list differs from no list at all: `None` means
/// "every URI", `Some(vec![])` is treated as a caller bug and fails closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsRequest {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub uris: Option<Vec<String>>,
    pub unique: Option<bool>,
}

impl StatsRequest {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn with_uris(mut self, uris: Vec<String>) -> Self {
        self.uris = Some(uris);
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    /// Checks the request without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`StatsClientError::InvalidRequest`] if `start` or `end` is
    /// missing, `start` is after `end`, or `uris` is present but empty.
    pub fn validate(&self) -> Result<(NaiveDateTime, NaiveDateTime), StatsClientError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(StatsClientError::InvalidRequest("start and end are required"));
        };

        if start > end {
            return Err(StatsClientError::InvalidRequest("start is after end"));
        }

        if matches!(self.uris, Some(ref uris) if uris.is_empty()) {
            return Err(StatsClientError::InvalidRequest("uris filter is empty"));
        }

        Ok((start, end))
    }

    /// Validates and renders the `GET /stats` query string pairs.
    ///
    /// # Errors
    ///
    /// See [`StatsRequest::validate`].
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>, StatsClientError> {
        let (start, end) = self.validate()?;

        let mut pairs = vec![
            ("start", timestamp::format(&start)),
            ("end", timestamp::format(&end)),
        ];

        if let Some(ref uris) = self.uris {
            pairs.extend(uris.iter().map(|uri| ("uris", uri.clone())));
        }

        if let Some(unique) = self.unique {
            pairs.push(("unique", unique.to_string()));
        }

        Ok(pairs)
    }
}
