//! Hour-position arithmetic for the timeline slider.
//!
//! The slider covers `horizon_days` either side of a reference instant,
//! starting at UTC midnight and counted in whole hours. Handles are moved
//! by position; every mutator returns a well-formed `TimeRange`.

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use geowx_meteo::{TimeMode, TimeRange};
use geowx_utils::dates::{add_hours, start_of_day, whole_hours_between};

/// Default look-back and look-ahead, in days.
pub const DEFAULT_HORIZON_DAYS: i64 = 15;

/// Hours either side of the reference in the initial range selection.
const INITIAL_RANGE_HALF_WIDTH: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineConfig {
    pub reference: DateTime<Utc>,
    pub horizon_days: i64,
}

impl TimelineConfig {
    pub fn around(reference: DateTime<Utc>) -> Self {
        Self {
            reference,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl Default for TimelineConfig {
    /// Centered on the current hour.
    fn default() -> Self {
        let now = Utc::now();
        let hour = now
            .with_nanosecond(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_minute(0))
            .unwrap_or(now);
        Self::around(hour)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    start: DateTime<Utc>,
    reference: DateTime<Utc>,
    total_hours: i64,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> Self {
        let horizon = config.horizon_days.max(1);
        let start = start_of_day(&(config.reference - TimeDelta::days(horizon)));
        Timeline {
            start,
            reference: config.reference,
            total_hours: 2 * horizon * 24,
        }
    }

    /// First instant on the slider.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn total_hours(&self) -> i64 {
        self.total_hours
    }

    pub fn position_to_instant(&self, position: i64) -> DateTime<Utc> {
        add_hours(&self.start, position)
    }

    pub fn instant_to_position(&self, instant: &DateTime<Utc>) -> i64 {
        whole_hours_between(&self.start, instant)
    }

    /// Position of the reference instant ("now" marker).
    pub fn reference_position(&self) -> i64 {
        self.instant_to_position(&self.reference)
    }

    /// Clamp a raw handle position onto the slider track.
    pub fn clamp_position(&self, position: i64) -> i64 {
        position.clamp(0, self.total_hours - 1)
    }

    /// Selection shown before the user touches the slider.
    pub fn initial_range(&self, mode: TimeMode) -> TimeRange {
        let position = self.reference_position();
        match mode {
            TimeMode::Single => self.select_single(position),
            TimeMode::Range => TimeRange::range(
                self.position_to_instant(position - INITIAL_RANGE_HALF_WIDTH),
                self.position_to_instant(position + INITIAL_RANGE_HALF_WIDTH),
                position,
            ),
        }
    }

    /// Place the single handle.
    pub fn select_single(&self, position: i64) -> TimeRange {
        let position = self.clamp_position(position);
        TimeRange::single(self.position_to_instant(position), position)
    }

    /// Drag the start handle; it stays at least one hour before the end.
    /// In single mode this places the single handle.
    pub fn move_start(&self, range: &TimeRange, position: i64) -> TimeRange {
        if range.mode == TimeMode::Single {
            return self.select_single(position);
        }
        let end_position = self.instant_to_position(&range.end);
        let position = self.clamp_position(position).min(end_position - 1);
        TimeRange {
            start: self.position_to_instant(position),
            ..*range
        }
    }

    /// Drag the end handle; it stays at least one hour after the start.
    /// In single mode this places the single handle.
    pub fn move_end(&self, range: &TimeRange, position: i64) -> TimeRange {
        if range.mode == TimeMode::Single {
            return self.select_single(position);
        }
        let start_position = self.instant_to_position(&range.start);
        let position = self.clamp_position(position).max(start_position + 1);
        TimeRange {
            end: self.position_to_instant(position),
            ..*range
        }
    }

    /// Switch modes. Single collapses the end onto the start; range keeps
    /// the current span, widening a collapsed one to one hour.
    pub fn set_mode(&self, range: &TimeRange, mode: TimeMode) -> TimeRange {
        match mode {
            TimeMode::Single => TimeRange::single(
                range.start,
                self.instant_to_position(&range.start),
            ),
            TimeMode::Range => {
                let end = if range.end > range.start {
                    range.end
                } else {
                    add_hours(&range.start, 1)
                };
                TimeRange::range(range.start, end, range.current_hour)
            }
        }
    }

    /// Length of a range selection in days, to one decimal.
    pub fn selected_days(&self, range: &TimeRange) -> f64 {
        let hours = whole_hours_between(&range.start, &range.end);
        (hours as f64 / 24.0 * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timeline() -> Timeline {
        let reference = Utc.with_ymd_and_hms(2025, 8, 4, 7, 0, 0).unwrap();
        Timeline::new(TimelineConfig::around(reference))
    }

    #[test]
    fn test_timeline_bounds() {
        let timeline = timeline();
        assert_eq!(timeline.total_hours(), 720);
        assert_eq!(
            timeline.start(),
            Utc.with_ymd_and_hms(2025, 7, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(timeline.reference_position(), 15 * 24 + 7);
    }

    #[test]
    fn test_position_round_trip() {
        let timeline = timeline();
        let instant = timeline.position_to_instant(100);
        assert_eq!(timeline.instant_to_position(&instant), 100);
    }

    #[test]
    fn test_initial_ranges() {
        let timeline = timeline();
        let single = timeline.initial_range(TimeMode::Single);
        assert!(single.is_well_formed());
        assert_eq!(single.start, Utc.with_ymd_and_hms(2025, 8, 4, 7, 0, 0).unwrap());
        assert_eq!(single.current_hour, 367);

        let range = timeline.initial_range(TimeMode::Range);
        assert!(range.is_well_formed());
        assert_eq!(timeline.selected_days(&range), 2.0);
    }

    #[test]
    fn test_select_single_clamps() {
        let timeline = timeline();
        assert_eq!(timeline.select_single(-5).current_hour, 0);
        assert_eq!(timeline.select_single(10_000).current_hour, 719);
    }

    #[test]
    fn test_move_start_stays_before_end() {
        let timeline = timeline();
        let range = timeline.initial_range(TimeMode::Range);
        let end_position = timeline.instant_to_position(&range.end);
        let moved = timeline.move_start(&range, end_position + 10);
        assert!(moved.is_well_formed());
        assert_eq!(timeline.instant_to_position(&moved.start), end_position - 1);
        assert_eq!(moved.end, range.end);
    }

    #[test]
    fn test_move_end_stays_after_start() {
        let timeline = timeline();
        let range = timeline.initial_range(TimeMode::Range);
        let start_position = timeline.instant_to_position(&range.start);
        let moved = timeline.move_end(&range, 0);
        assert!(moved.is_well_formed());
        assert_eq!(timeline.instant_to_position(&moved.end), start_position + 1);
    }

    #[test]
    fn test_move_in_single_mode_places_handle() {
        let timeline = timeline();
        let single = timeline.initial_range(TimeMode::Single);
        let moved = timeline.move_end(&single, 42);
        assert_eq!(moved.mode, TimeMode::Single);
        assert_eq!(moved.current_hour, 42);
        assert!(moved.is_well_formed());
    }

    #[test]
    fn test_set_mode() {
        let timeline = timeline();
        let single = timeline.initial_range(TimeMode::Single);
        let widened = timeline.set_mode(&single, TimeMode::Range);
        assert!(widened.is_well_formed());
        assert_eq!(timeline.selected_days(&widened), 0.0);
        assert_eq!(whole_hours_between(&widened.start, &widened.end), 1);

        let range = timeline.initial_range(TimeMode::Range);
        let collapsed = timeline.set_mode(&range, TimeMode::Single);
        assert!(collapsed.is_well_formed());
        assert_eq!(collapsed.start, range.start);
    }
}
