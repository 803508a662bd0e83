use crate::time_window::Extraction;
use serde::Serialize;

/// Noteworthy outcomes of a reduction, surfaced for user messaging.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum SeriesCondition {
    /// The series had no entries at all
    Empty,
    /// No usable reading at the sampled hour, or none anywhere in the series
    NoValidData,
    /// The sampled hour lay past the end of the series and was clamped
    IndexOutOfRange,
}

/// The representative reading and any condition met while deriving it.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub struct Reduction {
    pub value: Option<f64>,
    pub condition: Option<SeriesCondition>,
}

impl Reduction {
    fn found(value: f64) -> Self {
        Reduction {
            value: Some(value),
            condition: None,
        }
    }

    fn missing(condition: SeriesCondition) -> Self {
        Reduction {
            value: None,
            condition: Some(condition),
        }
    }
}

/// A reading is usable if present and not NaN.
pub fn valid(entry: &Option<f64>) -> Option<f64> {
    entry.filter(|v| !v.is_nan())
}

/// Reduce an hourly series to a single reading. Never fails; missing data
/// yields `value: None` with the matching condition.
pub fn reduce(series: &[Option<f64>], extraction: Extraction) -> Reduction {
    if series.is_empty() {
        return Reduction::missing(SeriesCondition::Empty);
    }
    match extraction {
        Extraction::SingleSample(hour) => {
            let last = series.len() - 1;
            let index = hour.min(last);
            match valid(&series[index]) {
                Some(v) if index < hour => Reduction {
                    value: Some(v),
                    condition: Some(SeriesCondition::IndexOutOfRange),
                },
                Some(v) => Reduction::found(v),
                None => Reduction::missing(SeriesCondition::NoValidData),
            }
        }
        Extraction::Mean => {
            let (sum, count) = series
                .iter()
                .filter_map(valid)
                .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count == 0 {
                Reduction::missing(SeriesCondition::NoValidData)
            } else {
                Reduction::found(sum / count as f64)
            }
        }
    }
}
