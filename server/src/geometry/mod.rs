//! Geofence geometry
//!
//! Coordinate rings, winding-order normalization and the GeoJSON shapes
//! exchanged with drawing tools and map surfaces.

pub mod geojson;
pub mod ring;
pub mod types;

pub use geojson::{Feature, FeatureCollection, Geometry};
pub use ring::{AREA_EPSILON, Ring, normalize_orientation};
pub use types::{BoundingBox, Coordinate, GeometryError, Orientation};
