use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the selection is a single hour or a span of hours.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    Single,
    Range,
}

/// The user's time selection on the timeline.
///
/// In `Single` mode `start == end`. In `Range` mode `start < end`.
/// `current_hour` caches the slider position of the single handle; query
/// resolution always works from `start`/`end`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub mode: TimeMode,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub current_hour: i64,
}

impl TimeRange {
    /// A single-instant selection.
    pub fn single(instant: DateTime<Utc>, current_hour: i64) -> Self {
        TimeRange {
            mode: TimeMode::Single,
            start: instant,
            end: instant,
            current_hour,
        }
    }

    /// A span selection. Callers are expected to pass `start < end`.
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>, current_hour: i64) -> Self {
        TimeRange {
            mode: TimeMode::Range,
            start,
            end,
            current_hour,
        }
    }

    /// Returns true if the selection satisfies its mode's ordering rule.
    pub fn is_well_formed(&self) -> bool {
        match self.mode {
            TimeMode::Single => self.start == self.end,
            TimeMode::Range => self.start < self.end,
        }
    }
}
