//! DTOs for hit aggregation.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::StatsQuery;
use crate::domain::entities::ViewStats;
use crate::error::AppError;
use crate::utils::timestamp;

/// Query parameters of `GET /stats`.
///
/// `uris` may be repeated (`uris=/a&uris=/b`) or comma-separated
/// (`uris=/a,/b`); both forms are merged.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQueryParams {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub uris: Vec<String>,
    pub unique: Option<bool>,
}

impl StatsQueryParams {
    /// Parses the raw parameters into a validated [`StatsQuery`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `start` or `end` is missing or not in
    /// `yyyy-MM-dd HH:mm:ss` format.
    /// Returns [`AppError::InvalidRange`] if `start` is after `end`.
    pub fn into_query(self) -> Result<StatsQuery, AppError> {
        let start = parse_required("start", self.start.as_deref())?;
        let end = parse_required("end", self.end.as_deref())?;

        let uris = self
            .uris
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
            .collect();

        Ok(StatsQuery::new(start, end)?
            .with_uris(uris)
            .with_unique(self.unique.unwrap_or(false)))
    }
}

fn parse_required(name: &str, value: Option<&str>) -> Result<chrono::NaiveDateTime, AppError> {
    let value = value.ok_or_else(|| {
        AppError::bad_request(
            format!("Missing required parameter '{}'", name),
            json!({ "parameter": name }),
        )
    })?;

    timestamp::parse(value).map_err(|_| {
        AppError::bad_request(
            format!("Invalid timestamp for '{}'", name),
            json!({ "parameter": name, "value": value, "expected": "yyyy-MM-dd HH:mm:ss" }),
        )
    })
}

/// One row of the `GET /stats` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewStatsDto {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

impl From<ViewStats> for ViewStatsDto {
    fn from(stats: ViewStats) -> Self {
        Self {
            app: stats.application,
            uri: stats.uri,
            hits: stats.hits,
        }
    }
}

impl From<ViewStatsDto> for ViewStats {
    fn from(dto: ViewStatsDto) -> Self {
        ViewStats::new(dto.app, dto.uri, dto.hits)
    }
}
