//! In-memory state for the polygon weather dashboard.
//!
//! This crate provides:
//! - `sources`: the data source registry and its single-active invariant
//! - `polygons`: the polygon registry, the source of truth for which
//!   polygons exist and how they were last classified
//! - `map`: the drawing layer seam and an in-memory layer
//! - `sync`: reconciliation between the registry and the drawing layer
//! - `dashboard`: the store tying them together, with generation-tagged
//!   recolor batches and message dispatch

pub mod condition;
pub mod dashboard;
pub mod geometry;
pub mod map;
pub mod polygons;
pub mod sources;
pub mod sync;

pub use condition::Condition;
pub use dashboard::{Dashboard, Effect, Message};
pub use map::{GeometryRef, InMemoryMap, MapLayer};
pub use polygons::{PolygonData, PolygonId, PolygonRegistry};
pub use sources::{DataSourceRegistry, LastRuleError, ThresholdEdit};
