use geowx_data::SeriesCondition;
use geowx_meteo::FetchError;
use serde::Serialize;
use std::fmt;

/// Recoverable conditions the UI turns into a notification.
///
/// None of these are fatal; each leaves the affected polygon with no
/// reading and the fallback color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Condition {
    FetchFailed,
    MalformedResponse,
    NoValidData,
    InvalidSelection,
}

impl Condition {
    /// Notification text for this condition.
    pub fn message(&self) -> &'static str {
        match self {
            Condition::FetchFailed => {
                "Weather API is currently unavailable. Please try again later."
            }
            Condition::MalformedResponse => {
                "Weather data error: invalid API response structure."
            }
            Condition::NoValidData => "No weather data available for this location and time.",
            Condition::InvalidSelection => "No active data source selected.",
        }
    }

    /// The user-facing condition for a reducer outcome. A clamped sample
    /// still has a reading and is not reported.
    pub fn from_series(condition: SeriesCondition) -> Option<Condition> {
        match condition {
            SeriesCondition::Empty | SeriesCondition::NoValidData => Some(Condition::NoValidData),
            SeriesCondition::IndexOutOfRange => None,
        }
    }
}

impl From<&FetchError> for Condition {
    fn from(value: &FetchError) -> Self {
        match value {
            FetchError::FetchFailed(_) => Condition::FetchFailed,
            FetchError::MalformedResponse(_) => Condition::MalformedResponse,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fetch_error() {
        let failed = FetchError::FetchFailed("status 503".to_string());
        assert_eq!(Condition::from(&failed), Condition::FetchFailed);
        let malformed = FetchError::MalformedResponse("missing hourly".to_string());
        assert_eq!(Condition::from(&malformed), Condition::MalformedResponse);
    }

    #[test]
    fn test_from_series() {
        assert_eq!(
            Condition::from_series(SeriesCondition::Empty),
            Some(Condition::NoValidData)
        );
        assert_eq!(Condition::from_series(SeriesCondition::IndexOutOfRange), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Condition::NoValidData.to_string(),
            "No weather data available for this location and time."
        );
    }
}
