use chrono::NaiveDate;
use geowx_meteo::{SeriesQuery, TimeMode, TimeRange};
use geowx_utils::dates::{start_of_day, whole_hours_between};
use serde::Serialize;

/// How the representative reading is pulled out of the hourly series.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Extraction {
    /// The reading at this hour offset from the first queried midnight.
    /// Clamped to the series length by the reducer.
    SingleSample(usize),
    /// Arithmetic mean of every valid reading in the series.
    Mean,
}

/// Inclusive calendar-day bounds plus the extraction rule.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct QueryWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub extraction: Extraction,
}

impl QueryWindow {
    /// The weather request for this window at one point.
    pub fn query(&self, latitude: f64, longitude: f64, field: &str) -> SeriesQuery {
        SeriesQuery {
            latitude,
            longitude,
            field: field.to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Resolve a timeline selection into a query window.
///
/// Instants are truncated to UTC calendar days. A single selection samples
/// the hour it falls in; a range averages the whole returned series.
pub fn resolve(range: &TimeRange) -> QueryWindow {
    let first = range.start.min(range.end);
    let last = range.start.max(range.end);
    let extraction = match range.mode {
        TimeMode::Single => {
            let midnight = start_of_day(&range.start);
            let hour = whole_hours_between(&midnight, &range.start);
            Extraction::SingleSample(usize::try_from(hour).unwrap_or(0))
        }
        TimeMode::Range => Extraction::Mean,
    };
    QueryWindow {
        start_date: first.date_naive(),
        end_date: last.date_naive(),
        extraction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_resolve_single() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 4, 7, 30, 0).unwrap();
        let window = resolve(&TimeRange::single(instant, 367));
        assert_eq!(window.start_date, NaiveDate::from_ymd_opt(2025, 8, 4).unwrap());
        assert_eq!(window.end_date, window.start_date);
        assert_eq!(window.extraction, Extraction::SingleSample(7));
    }

    #[test]
    fn test_resolve_single_at_midnight() {
        let instant = Utc.with_ymd_and_hms(2025, 8, 4, 0, 0, 0).unwrap();
        let window = resolve(&TimeRange::single(instant, 0));
        assert_eq!(window.extraction, Extraction::SingleSample(0));
    }

    #[test]
    fn test_resolve_range_spans_whole_days() {
        let start = Utc.with_ymd_and_hms(2025, 8, 3, 7, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 5, 7, 0, 0).unwrap();
        let window = resolve(&TimeRange::range(start, end, 0));
        assert_eq!(window.start_date, NaiveDate::from_ymd_opt(2025, 8, 3).unwrap());
        assert_eq!(window.end_date, NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
        assert_eq!(window.extraction, Extraction::Mean);

        let query = window.query(22.57, 88.36, "temperature_2m");
        assert_eq!(query.start_date, window.start_date);
        assert_eq!(query.end_date, window.end_date);
    }

    #[test]
    fn test_resolve_range_within_one_day() {
        let start = Utc.with_ymd_and_hms(2025, 8, 4, 1, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 4, 2, 0, 0).unwrap();
        let window = resolve(&TimeRange::range(start, end, 0));
        assert_eq!(window.start_date, window.end_date);
    }
}
