//! Map overlay module
//!
//! Draws stored geofences onto a map surface as filled overlays.

pub mod reconciler;
pub mod style;
pub mod surface;

pub use reconciler::{LayerReconciler, ReconcileOutcome};
pub use style::{GeoJsonSource, StyleSurface};
pub use surface::{DrawingTool, FillLayer, HoverOpacity, LayerStyle, MapSurface, SurfaceError};
