//! The weather data collaborator seam.
//!
//! Everything above this module sees weather data as an hourly array of
//! optional readings for one field at one point over whole UTC days.

use chrono::NaiveDate;
use geowx_utils::dates::format_date;
use serde_json::Value;
use thiserror::Error;

/// Hourly readings for one field; `None` where the source reported null.
pub type HourlySeries = Vec<Option<f64>>;

/// Failures of the weather data collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Network failure, non-2xx status, or an error marker in the payload
    #[error("Weather request failed: {0}")]
    FetchFailed(String),

    /// The payload lacked the expected `hourly.<field>` array
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),
}

/// A day-granular request for one hourly field at one point.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub field: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl SeriesQuery {
    /// Query string parameters in the order the archive API documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("start_date", format_date(&self.start_date)),
            ("end_date", format_date(&self.end_date)),
            ("hourly", self.field.clone()),
        ]
    }
}

/// Source of hourly weather series.
///
/// Implementations are awaited from a single logical thread, so futures
/// are not required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait WeatherFetcher {
    async fn fetch_hourly(&self, query: &SeriesQuery) -> Result<HourlySeries, FetchError>;
}

/// Extract `hourly.<field>` from an Open-Meteo style JSON body.
///
/// `{"error": true, "reason": ...}` maps to `FetchFailed`; any other shape
/// problem maps to `MalformedResponse`.
pub fn parse_hourly(body: &str, field: &str) -> Result<HourlySeries, FetchError> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("invalid JSON: {e}")))?;

    if payload.get("error").and_then(Value::as_bool).unwrap_or(false) {
        let reason = payload
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("API returned an error");
        return Err(FetchError::FetchFailed(reason.to_string()));
    }

    let values = payload
        .get("hourly")
        .and_then(|hourly| hourly.get(field))
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::MalformedResponse(format!("missing hourly.{field} array")))?;

    values
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(FetchError::MalformedResponse(format!(
                "hourly.{field}[{index}] is not a number: {other}"
            ))),
        })
        .collect()
}
