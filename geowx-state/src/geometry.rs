//! Polygon geometry as drawn on the map, and the centroid used as the
//! weather query point.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Failed to parse GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Position {0:?} needs at least longitude and latitude")]
    ShortPosition(Vec<f64>),
}

/// A query point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

/// A polygon as GeoJSON rings of `[longitude, latitude]` positions; the
/// first ring is the outer boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonGeometry {
    pub rings: Vec<Vec<[f64; 2]>>,
}

impl PolygonGeometry {
    pub fn new(outer: Vec<[f64; 2]>) -> Self {
        PolygonGeometry { rings: vec![outer] }
    }

    /// Mean of the outer ring's vertices, closing vertex included.
    pub fn centroid(&self) -> Option<LatLon> {
        let outer = self.rings.first().filter(|ring| !ring.is_empty())?;
        let (lon, lat) = outer
            .iter()
            .fold((0.0_f64, 0.0_f64), |(x, y), p| (x + p[0], y + p[1]));
        let n = outer.len() as f64;
        Some(LatLon {
            latitude: lat / n,
            longitude: lon / n,
        })
    }

    fn from_coordinates(coordinates: Vec<Vec<Vec<f64>>>) -> Result<Self, GeometryError> {
        let rings = coordinates
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .map(|position| {
                        if position.len() >= 2 {
                            Ok([position[0], position[1]])
                        } else {
                            Err(GeometryError::ShortPosition(position))
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PolygonGeometry { rings })
    }
}

/// A polygon read from GeoJSON, with its `name` property if it had one.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnShape {
    pub name: Option<String>,
    pub geometry: PolygonGeometry,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Other,
}

impl Feature {
    fn into_shape(self) -> Result<Option<DrawnShape>, GeometryError> {
        match self.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                let name = self
                    .properties
                    .as_ref()
                    .and_then(|p| p.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Ok(Some(DrawnShape {
                    name,
                    geometry: PolygonGeometry::from_coordinates(coordinates)?,
                }))
            }
            _ => {
                debug!("Skipping non-polygon feature");
                Ok(None)
            }
        }
    }
}

/// Read every polygon from a GeoJSON document: a feature collection, a
/// single feature, or a bare polygon geometry. Other geometry types are
/// skipped.
pub fn parse_polygons(geojson: &str) -> Result<Vec<DrawnShape>, GeometryError> {
    let document: GeoJson = serde_json::from_str(geojson)?;
    let features = match document {
        GeoJson::FeatureCollection { features } => features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Polygon { coordinates } => {
            return Ok(vec![DrawnShape {
                name: None,
                geometry: PolygonGeometry::from_coordinates(coordinates)?,
            }])
        }
        GeoJson::Other => Vec::new(),
    };
    let mut shapes = Vec::new();
    for feature in features {
        if let Some(shape) = feature.into_shape()? {
            shapes.push(shape);
        }
    }
    Ok(shapes)
}
