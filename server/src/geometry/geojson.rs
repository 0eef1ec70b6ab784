//! Minimal GeoJSON model for drawn features and overlay sources

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ring::Ring;
use super::types::{Coordinate, GeometryError};

/// GeoJSON geometry objects produced by map drawing tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Coordinate,
    },
    MultiPoint {
        coordinates: Vec<Coordinate>,
    },
    LineString {
        coordinates: Vec<Coordinate>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Coordinate>>,
    },
    Polygon {
        coordinates: Vec<Vec<Coordinate>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Coordinate>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
    /// Any `type` this model does not know
    #[serde(other)]
    Unknown,
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
            Geometry::Unknown => "unknown",
        }
    }
}

impl From<&Ring> for Geometry {
    fn from(ring: &Ring) -> Self {
        Geometry::Polygon {
            coordinates: vec![ring.coordinates().to_vec()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// `null` for features without a location
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    /// Polygon feature with a single outer ring
    pub fn polygon(ring: &Ring, properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            geometry: Some(ring.into()),
            properties: Some(properties),
        }
    }

    /// The outer ring of a polygon feature, as drawn (orientation untouched).
    ///
    /// Interior rings are ignored: a geofence is bounded by exactly one ring.
    pub fn outer_ring(&self) -> Result<Ring, GeometryError> {
        match &self.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                let outer = coordinates.first().ok_or(GeometryError::MissingOuterRing)?;
                Ring::from_drawn(outer.clone())
            }
            Some(other) => Err(GeometryError::UnsupportedGeometry(
                other.type_name().to_string(),
            )),
            None => Err(GeometryError::UnsupportedGeometry("null".to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
