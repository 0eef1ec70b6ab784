//! Map-side collaborators: the rendering surface and the drawing tool

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::config::OverlayConfig;
use crate::geometry::FeatureCollection;

/// Errors raised by a map surface when a source or layer operation is invalid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("Source already exists: {0}")]
    SourceExists(String),

    #[error("Layer already exists: {0}")]
    LayerExists(String),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Layer '{layer}' references missing source '{source_id}'")]
    MissingSource { layer: String, source_id: String },

    #[error("Source '{source_id}' is still used by layer '{layer}'")]
    SourceInUse { source_id: String, layer: String },
}

/// Rendering surface of an interactive map.
///
/// Sources hold GeoJSON data; layers draw a source. A layer must be removed
/// before the source it references.
pub trait MapSurface {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError>;

    fn add_layer(&mut self, layer: FillLayer) -> Result<(), SurfaceError>;

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError>;

    fn has_layer(&self, id: &str) -> bool;

    fn has_source(&self, id: &str) -> bool;
}

/// Polygon drawing tool attached to a map
pub trait DrawingTool {
    /// Every feature currently drawn, orientation as the user drew it
    fn drawn_features(&self) -> FeatureCollection;
}

/// A submitted feature collection stands in for the tool that drew it
impl DrawingTool for FeatureCollection {
    fn drawn_features(&self) -> FeatureCollection {
        self.clone()
    }
}

/// Fill opacity keyed by the per-feature `hover` state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverOpacity {
    pub hovered: f64,
    pub idle: f64,
}

impl HoverOpacity {
    pub fn resolve(&self, hovered: bool) -> f64 {
        if hovered { self.hovered } else { self.idle }
    }
}

impl Serialize for HoverOpacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        json!([
            "case",
            ["boolean", ["feature-state", "hover"], false],
            self.hovered,
            self.idle
        ])
        .serialize(serializer)
    }
}

/// Visual style shared by all geofence overlays
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub fill_color: String,
    pub opacity: HoverOpacity,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

impl From<&OverlayConfig> for LayerStyle {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            fill_color: config.fill_color.clone(),
            opacity: HoverOpacity {
                hovered: config.hover_opacity,
                idle: config.opacity,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillPaint {
    #[serde(rename = "fill-color")]
    pub fill_color: String,
    #[serde(rename = "fill-opacity")]
    pub fill_opacity: HoverOpacity,
}

/// A `fill` layer drawing one GeoJSON source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "fill")]
pub struct FillLayer {
    pub id: String,
    pub source: String,
    pub layout: Map<String, Value>,
    pub paint: FillPaint,
}

impl FillLayer {
    pub fn new(id: &str, source: &str, style: &LayerStyle) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            layout: Map::new(),
            paint: FillPaint {
                fill_color: style.fill_color.clone(),
                fill_opacity: style.opacity,
            },
        }
    }
}
