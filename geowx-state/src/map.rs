//! The drawing layer seam.
//!
//! The layer owns raw geometry and paints features; the polygon registry
//! owns polygon existence. `InMemoryMap` is a headless layer used by the
//! CLI and tests.

use crate::geometry::{LatLon, PolygonGeometry};
use geowx_meteo::Color;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Handle of a feature in the drawing layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GeometryRef(pub String);

impl fmt::Display for GeometryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Operations the dashboard needs from the map.
pub trait MapLayer {
    /// Query point for a feature, if it still exists and has a boundary.
    fn centroid(&self, geometry: &GeometryRef) -> Option<LatLon>;
    /// Remove a feature and everything painted for it. Unknown handles
    /// are ignored.
    fn remove_geometry(&mut self, geometry: &GeometryRef);
    fn repaint(&mut self, geometry: &GeometryRef, color: &Color);
    /// Handles of every feature currently on the layer.
    fn live_geometries(&self) -> Vec<GeometryRef>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub geometry: PolygonGeometry,
    /// Fill painted by the dashboard; `None` until first classified
    pub fill: Option<Color>,
}

#[derive(Debug, Default)]
pub struct InMemoryMap {
    features: BTreeMap<GeometryRef, MapFeature>,
    next_feature: u64,
}

impl InMemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish drawing a polygon; returns the new feature's handle.
    pub fn draw(&mut self, geometry: PolygonGeometry) -> GeometryRef {
        self.next_feature += 1;
        let handle = GeometryRef(format!("feature-{}", self.next_feature));
        self.features.insert(
            handle.clone(),
            MapFeature {
                geometry,
                fill: None,
            },
        );
        debug!("Drew {}", handle);
        handle
    }

    /// The layer's own delete gesture. Returns false for unknown handles.
    pub fn trash(&mut self, geometry: &GeometryRef) -> bool {
        self.features.remove(geometry).is_some()
    }

    pub fn feature(&self, geometry: &GeometryRef) -> Option<&MapFeature> {
        self.features.get(geometry)
    }

    pub fn fill(&self, geometry: &GeometryRef) -> Option<&Color> {
        self.features.get(geometry).and_then(|f| f.fill.as_ref())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl MapLayer for InMemoryMap {
    fn centroid(&self, geometry: &GeometryRef) -> Option<LatLon> {
        self.features.get(geometry)?.geometry.centroid()
    }

    fn remove_geometry(&mut self, geometry: &GeometryRef) {
        if self.features.remove(geometry).is_some() {
            debug!("Removed {} from the layer", geometry);
        }
    }

    fn repaint(&mut self, geometry: &GeometryRef, color: &Color) {
        if let Some(feature) = self.features.get_mut(geometry) {
            feature.fill = Some(color.clone());
        }
    }

    fn live_geometries(&self) -> Vec<GeometryRef> {
        self.features.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> PolygonGeometry {
        PolygonGeometry::new(vec![[0.0, 0.0], [3.0, 0.0], [0.0, 3.0]])
    }

    #[test]
    fn test_draw_assigns_fresh_handles() {
        let mut map = InMemoryMap::new();
        let a = map.draw(triangle());
        let b = map.draw(triangle());
        assert_ne!(a, b);
        assert_eq!(map.live_geometries(), vec![a, b]);
    }

    #[test]
    fn test_repaint_and_remove() {
        let mut map = InMemoryMap::new();
        let a = map.draw(triangle());
        assert_eq!(map.fill(&a), None);
        map.repaint(&a, &Color::from("#EF4444"));
        assert_eq!(map.fill(&a), Some(&Color::from("#EF4444")));
        map.remove_geometry(&a);
        assert!(map.is_empty());
        map.remove_geometry(&a);
        map.repaint(&a, &Color::fallback());
        assert!(map.is_empty());
    }

    #[test]
    fn test_centroid_of_drawn_feature() {
        let mut map = InMemoryMap::new();
        let a = map.draw(triangle());
        let centroid = map.centroid(&a).unwrap();
        assert_eq!(centroid.latitude, 1.0);
        assert_eq!(centroid.longitude, 1.0);
        assert!(map.trash(&a));
        assert_eq!(map.centroid(&a), None);
        assert!(!map.trash(&a));
    }
}
