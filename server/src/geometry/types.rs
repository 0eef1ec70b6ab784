//! Geometry value types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or normalizing geofence geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Ring needs at least 4 coordinates, got {count}")]
    TooFewCoordinates { count: usize },

    #[error("Ring is not closed: first and last coordinates differ")]
    NotClosed,

    #[error("Ring repeats coordinate at position {index}")]
    RepeatedCoordinate { index: usize },

    #[error("Ring has a non-finite coordinate at position {index}")]
    NonFiniteCoordinate { index: usize },

    #[error("Coordinate at position {index} is out of range: ({lon}, {lat})")]
    OutOfRange { index: usize, lon: f64, lat: f64 },

    #[error("Ring is degenerate (signed area {area})")]
    Degenerate { area: f64 },

    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    #[error("Polygon has no outer ring")]
    MissingOuterRing,
}

/// A (longitude, latitude) pair in degrees.
///
/// Serialized as a GeoJSON position `[lon, lat]`. Deserializes from any
/// position of two or more numbers; altitude and further elements are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    pub fn in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = String;

    fn try_from(position: Vec<f64>) -> Result<Self, Self::Error> {
        match position.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!(
                "position needs at least 2 numbers, got {}",
                position.len()
            )),
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

/// Winding direction of a closed ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
}

/// Axis-aligned lon/lat bounds of a ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}
