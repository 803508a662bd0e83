//! Core types and weather data collaborator for polygon weather classification.
//!
//! This crate holds the plain data model shared by every other geowx crate
//! (time selections, threshold rules, data sources), the embedded default
//! data source catalogue, and the `WeatherFetcher` seam through which
//! hourly series are obtained. The reqwest-backed Open-Meteo archive client
//! is only compiled with the `api` feature.

pub mod data_source;
pub mod fetch;
pub mod threshold;
pub mod time_range;

#[cfg(feature = "api")]
pub mod client;

pub use data_source::{CatalogueError, DataSource};
pub use fetch::{FetchError, HourlySeries, SeriesQuery, WeatherFetcher};
pub use threshold::{Color, Operator, Threshold};
pub use time_range::{TimeMode, TimeRange};
