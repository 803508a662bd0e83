//! Pure classification engine for polygon weather readings.
//!
//! This crate turns a timeline selection into a day-granular query window,
//! reduces the hourly series the weather collaborator returns into one
//! representative reading, and maps that reading to a color through an
//! ordered rule set. Nothing in here performs I/O.

pub mod classifier;
pub mod reducer;
pub mod time_window;
pub mod timeline;

pub use classifier::{classify, evaluation_order, matching_rule};
pub use reducer::{reduce, Reduction, SeriesCondition};
pub use time_window::{resolve, Extraction, QueryWindow};
pub use timeline::{Timeline, TimelineConfig};
