use crate::map::GeometryRef;
use geowx_data::classify;
use geowx_meteo::{Color, DataSource};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PolygonId(pub String);

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A drawn region and its most recent classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonData {
    pub id: PolygonId,
    pub geometry: GeometryRef,
    /// Source the reading was fetched for
    pub data_source_id: String,
    /// Single entry keyed by the source's API field
    pub data: BTreeMap<String, Option<f64>>,
    pub name: String,
    pub color: Color,
}

impl PolygonData {
    /// The stored reading for `field`, if one was obtained.
    pub fn value(&self, field: &str) -> Option<f64> {
        self.data.get(field).copied().flatten()
    }

    fn assign(&mut self, source: &DataSource, value: Option<f64>) {
        self.data_source_id = source.id.clone();
        self.data = BTreeMap::from([(source.field.clone(), value)]);
        self.color = classify(value, &source.thresholds);
    }
}

/// The source of truth for which polygons exist.
///
/// Ids and default names come from one counter that is never rewound, so a
/// deleted polygon's id or name is never handed out again.
#[derive(Debug, Default)]
pub struct PolygonRegistry {
    polygons: Vec<PolygonData>,
    next_sequence: u64,
    selected: Option<PolygonId>,
}

impl PolygonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        geometry: GeometryRef,
        source: &DataSource,
        value: Option<f64>,
    ) -> &PolygonData {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        let mut polygon = PolygonData {
            id: PolygonId(format!("polygon-{}", sequence)),
            geometry,
            data_source_id: String::new(),
            data: BTreeMap::new(),
            name: format!("Region {}", sequence),
            color: Color::fallback(),
        };
        polygon.assign(source, value);
        info!(
            "Created {} on {} with {} {:?}",
            polygon.id, polygon.geometry, source.field, value
        );
        let index = self.polygons.len();
        self.polygons.push(polygon);
        &self.polygons[index]
    }

    /// Replace a polygon's reading in place and reclassify it. Returns the
    /// new color, or `None` if the polygon no longer exists.
    pub fn update(&mut self, id: &PolygonId, source: &DataSource, value: Option<f64>) -> Option<Color> {
        let polygon = self.get_mut(id)?;
        polygon.assign(source, value);
        Some(polygon.color.clone())
    }

    /// Rename a polygon. Blank names are ignored.
    pub fn rename(&mut self, id: &PolygonId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring blank name for {}", id);
            return false;
        }
        match self.get_mut(id) {
            Some(polygon) => {
                polygon.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a polygon, clearing the selection if it was selected.
    pub fn remove(&mut self, id: &PolygonId) -> Option<PolygonData> {
        let index = self.polygons.iter().position(|p| &p.id == id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.polygons.remove(index))
    }

    pub fn remove_by_geometry(&mut self, geometry: &GeometryRef) -> Option<PolygonData> {
        let id = self.find_by_geometry(geometry)?.id.clone();
        self.remove(&id)
    }

    pub fn find_by_geometry(&self, geometry: &GeometryRef) -> Option<&PolygonData> {
        self.polygons.iter().find(|p| &p.geometry == geometry)
    }

    /// Select an existing polygon. Unknown ids leave the selection as is.
    pub fn select(&mut self, id: &PolygonId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn selected(&self) -> Option<&PolygonData> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn get(&self, id: &PolygonId) -> Option<&PolygonData> {
        self.polygons.iter().find(|p| &p.id == id)
    }

    fn get_mut(&mut self, id: &PolygonId) -> Option<&mut PolygonData> {
        self.polygons.iter_mut().find(|p| &p.id == id)
    }

    /// Polygons in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &PolygonData> {
        self.polygons.iter()
    }

    pub fn geometries(&self) -> Vec<GeometryRef> {
        self.polygons.iter().map(|p| p.geometry.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}
