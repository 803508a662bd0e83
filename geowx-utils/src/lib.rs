//! Shared utility functions for geowx crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

    /// Date format used for weather API query parameters: "YYYY-MM-DD"
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Formats accepted for instants without an explicit offset (read as UTC).
    const NAIVE_INSTANT_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    const MILLIS_PER_HOUR: i64 = 3_600_000;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> Result<NaiveDate, DateError> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map_err(|e| DateError(format!("{s:?}: {e}")))
    }

    /// Parse an instant. RFC 3339 strings keep their offset; naive
    /// "YYYY-MM-DD[ T]HH:MM[:SS]" strings and bare dates are taken as UTC.
    pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, DateError> {
        let s = s.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
            return Ok(instant.with_timezone(&Utc));
        }
        for format in NAIVE_INSTANT_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(naive.and_utc());
            }
        }
        parse_date(s)
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .map_err(|_| DateError(format!("{s:?} is not a recognised instant")))
    }

    /// UTC midnight of the day containing `instant`.
    pub fn start_of_day(instant: &DateTime<Utc>) -> DateTime<Utc> {
        instant.date_naive().and_time(NaiveTime::MIN).and_utc()
    }

    /// Whole hours from `from` to `to`, rounded towards negative infinity.
    pub fn whole_hours_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> i64 {
        (*to - *from).num_milliseconds().div_euclid(MILLIS_PER_HOUR)
    }

    /// `instant` shifted by a signed number of hours.
    pub fn add_hours(instant: &DateTime<Utc>, hours: i64) -> DateTime<Utc> {
        *instant + TimeDelta::hours(hours)
    }

}

/// Presentation helpers shared by the CLI and polygon summaries.
pub mod format {
    /// Render a reading with one decimal and its unit, or "N/A" when missing.
    pub fn format_value(value: Option<f64>, unit: &str) -> String {
        match value {
            Some(v) if !v.is_nan() => format!("{v:.1}{unit}"),
            _ => String::from("N/A"),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::format_value;

        #[test]
        fn test_format_value() {
            assert_eq!(format_value(Some(21.456), "°C"), "21.5°C");
            assert_eq!(format_value(None, "°C"), "N/A");
            assert_eq!(format_value(Some(f64::NAN), "%"), "N/A");
        }
    }
}

/// Error types
pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error, Clone, PartialEq)]
    #[error("Date error: {0}")]
    pub struct DateError(pub String);
}
