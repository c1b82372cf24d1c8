//! Aggregated hit counts.

/// Hit count for one `(application, uri)` group inside an aggregate window.
///
/// Derived on every query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewStats {
    pub application: String,
    pub uri: String,
    pub hits: i64,
}

impl ViewStats {
    pub fn new(application: impl Into<String>, uri: impl Into<String>, hits: i64) -> Self {
        Self {
            application: application.into(),
            uri: uri.into(),
            hits,
        }
    }
}
