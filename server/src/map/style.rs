//! In-memory style document implementing the map surface
//!
//! Holds the `sources` and `layers` sections of a MapLibre style, enforcing
//! the same referential rules a browser map engine does. Served to clients
//! as JSON and used as the map surface in tests.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

use crate::geometry::FeatureCollection;

use super::surface::{FillLayer, MapSurface, SurfaceError};

/// A `geojson` style source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "geojson")]
pub struct GeoJsonSource {
    pub data: FeatureCollection,
}

fn layers_in_order<S: Serializer>(
    layers: &IndexMap<String, FillLayer>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(layers.values())
}

#[derive(Debug, Default, Serialize)]
pub struct StyleSurface {
    sources: IndexMap<String, GeoJsonSource>,
    #[serde(serialize_with = "layers_in_order")]
    layers: IndexMap<String, FillLayer>,
    /// Sources whose feature has `hover` feature-state set
    #[serde(skip)]
    hovered: HashSet<String>,
}

impl StyleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self, id: &str) -> Option<&GeoJsonSource> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&FillLayer> {
        self.layers.get(id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer ids in drawing order
    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Set or clear the `hover` feature-state of a source's feature
    pub fn set_hover(&mut self, source: &str, hovered: bool) -> Result<(), SurfaceError> {
        if !self.sources.contains_key(source) {
            return Err(SurfaceError::SourceNotFound(source.to_string()));
        }
        if hovered {
            self.hovered.insert(source.to_string());
        } else {
            self.hovered.remove(source);
        }
        Ok(())
    }

    /// Fill opacity a layer currently renders with
    pub fn rendered_opacity(&self, layer: &str) -> Option<f64> {
        self.layers.get(layer).map(|l| {
            l.paint
                .fill_opacity
                .resolve(self.hovered.contains(&l.source))
        })
    }
}

impl MapSurface for StyleSurface {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        if self.sources.contains_key(id) {
            return Err(SurfaceError::SourceExists(id.to_string()));
        }
        self.sources.insert(id.to_string(), GeoJsonSource { data });
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        if let Some(layer) = self.layers.values().find(|l| l.source == id) {
            return Err(SurfaceError::SourceInUse {
                source_id: id.to_string(),
                layer: layer.id.clone(),
            });
        }
        self.sources
            .shift_remove(id)
            .ok_or_else(|| SurfaceError::SourceNotFound(id.to_string()))?;
        self.hovered.remove(id);
        Ok(())
    }

    fn add_layer(&mut self, layer: FillLayer) -> Result<(), SurfaceError> {
        if self.layers.contains_key(&layer.id) {
            return Err(SurfaceError::LayerExists(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(SurfaceError::MissingSource {
                layer: layer.id,
                source_id: layer.source,
            });
        }
        self.layers.insert(layer.id.clone(), layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        self.layers
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| SurfaceError::LayerNotFound(id.to_string()))
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }
}
