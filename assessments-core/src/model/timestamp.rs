//! Persisted timestamp format
//!
//! The Mongo backend compares stored dates as strings, so every persisted
//! timestamp and every range bound uses the same fixed-width form
//! `YYYY-MM-DDTHH:MM:SSZ`. Sub-second precision is truncated.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::Serializer;

/// Earliest year with a four-digit rendering
pub const MIN_YEAR: i32 = 1;
/// Latest year with a four-digit rendering
pub const MAX_YEAR: i32 = 9999;

/// Render `dt` in the persisted form
pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// True when `dt` renders with a four-digit year
pub fn in_range(dt: &DateTime<Utc>) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&dt.year())
}

/// `serialize_with` adapter for persisted fields
pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_truncates_subseconds() {
        let dt: DateTime<Utc> = "2024-06-01T00:00:00.500Z".parse().unwrap();
        assert_eq!(format(&dt), "2024-06-01T00:00:00Z");
    }

    #[test]
    fn test_in_range() {
        assert!(in_range(&Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap()));
        assert!(in_range(&Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()));
        assert!(!in_range(&Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap()));
        assert!(!in_range(&Utc.with_ymd_and_hms(0, 1, 1, 0, 0, 0).unwrap()));
    }
}
