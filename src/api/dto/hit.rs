//! DTOs for hit recording.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Hit, NewHit};

/// Body of `POST /hit`.
///
/// # Example
///
/// ```json
/// {
///   "app": "main-server",
///   "uri": "/events/5",
///   "ip": "192.168.1.1",
///   "timestamp": "2025-06-09 14:09:05"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRequest {
    pub app: String,
    pub uri: String,
    pub ip: String,
    #[serde(with = "crate::utils::timestamp")]
    pub timestamp: NaiveDateTime,
}

impl From<HitRequest> for NewHit {
    fn from(req: HitRequest) -> Self {
        NewHit::new(req.app, req.uri, req.ip, req.timestamp)
    }
}

impl From<NewHit> for HitRequest {
    fn from(hit: NewHit) -> Self {
        Self {
            app: hit.application,
            uri: hit.uri,
            ip: hit.ip,
            timestamp: hit.moment,
        }
    }
}

/// Echo of the stored hit returned by `POST /hit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitResponse {
    pub id: i64,
    pub app: String,
    pub uri: String,
    pub ip: String,
    #[serde(with = "crate::utils::timestamp")]
    pub timestamp: NaiveDateTime,
}

impl From<Hit> for HitResponse {
    fn from(hit: Hit) -> Self {
        Self {
            id: hit.id,
            app: hit.application,
            uri: hit.uri,
            ip: hit.ip,
            timestamp: hit.moment,
        }
    }
}
