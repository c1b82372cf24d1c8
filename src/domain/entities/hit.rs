//! Hit entity representing one observed request.

use chrono::NaiveDateTime;

/// A stored observation of a request reaching `uri` from `ip` at `moment`.
///
/// Immutable once written. The `id` is assigned by the store and is
/// monotonic and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub id: i64,
    pub application: String,
    pub uri: String,
    pub ip: String,
    pub moment: NaiveDateTime,
}

impl Hit {
    /// Creates a new Hit instance.
    pub fn new(
        id: i64,
        application: String,
        uri: String,
        ip: String,
        moment: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            application,
            uri,
            ip,
            moment,
        }
    }
}

/// Input data for recording a hit.
///
/// No content validation happens anywhere on the write path: every
/// `NewHit` handed to the store produces exactly one stored [`Hit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHit {
    pub application: String,
    pub uri: String,
    pub ip: String,
    pub moment: NaiveDateTime,
}

impl NewHit {
    pub fn new(
        application: impl Into<String>,
        uri: impl Into<String>,
        ip: impl Into<String>,
        moment: NaiveDateTime,
    ) -> Self {
        Self {
            application: application.into(),
            uri: uri.into(),
            ip: ip.into(),
            moment,
        }
    }

    /// Attaches the store-assigned id.
    pub fn into_hit(self, id: i64) -> Hit {
        Hit::new(id, self.application, self.uri, self.ip, self.moment)
    }
}
