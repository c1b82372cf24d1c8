//! The system-wide timestamp format: `yyyy-MM-dd HH:mm:ss`.
//!
//! Every boundary that serializes a timestamp (hit payloads, stats query
//! parameters) uses exactly this format: no timezone, no fractional seconds.
//! Anything else is a parse failure.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

/// `chrono` format string for the wire timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a timestamp for the wire.
pub fn format(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a wire timestamp.
///
/// # Errors
///
/// Returns [`chrono::ParseError`] when the input does not match
/// [`TIMESTAMP_FORMAT`] exactly.
pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
}

/// Current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Serde adapter for `#[serde(with = "crate::utils::timestamp")]`.
pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

/// Serde adapter for `#[serde(with = "crate::utils::timestamp")]`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 9)
            .unwrap()
            .and_hms_opt(14, 9, 5)
            .unwrap()
    }

    #[test]
    fn test_format_uses_wire_layout() {
        assert_eq!(format(&sample()), "2025-06-09 14:09:05");
    }

    #[test]
    fn test_parse_accepts_wire_layout() {
        assert_eq!(parse("2025-06-09 14:09:05").unwrap(), sample());
    }

    #[test]
    fn test_parse_rejects_other_layouts() {
        assert!(parse("2025-06-09T14:09:05").is_err());
        assert!(parse("2025-06-09 14:09:05.123").is_err());
        assert!(parse("2025-06-09 14:09:05Z").is_err());
        assert!(parse("2025-06-09").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_now_has_no_fraction() {
        assert_eq!(now().nanosecond(), 0);
    }

    #[test]
    fn test_serde_adapter() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Wrapper {
            #[serde(with = "super")]
            at: NaiveDateTime,
        }

        let json = serde_json::to_string(&Wrapper { at: sample() }).unwrap();
        assert_eq!(json, r#"{"at":"2025-06-09 14:09:05"}"#);

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at, sample());

        assert!(serde_json::from_str::<Wrapper>(r#"{"at":"09.06.2025"}"#).is_err());
    }
}
