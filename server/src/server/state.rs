//! Shared application state for HTTP handlers

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::Config;
use crate::editor::GeofenceEditor;
use crate::map::{LayerReconciler, LayerStyle, StyleSurface};
use crate::store::{GeofenceStore, GeofenceTransport, InMemoryTransport};

/// Overlay state served to map clients
pub type SharedReconciler = Arc<Mutex<LayerReconciler<StyleSurface>>>;

#[derive(Clone)]
pub struct AppState {
    pub editor: GeofenceEditor,
    /// Handlers lock this for the whole list-then-draw sequence
    pub reconciler: SharedReconciler,
}

impl AppState {
    pub fn new(editor: GeofenceEditor, style: LayerStyle) -> Self {
        Self {
            editor,
            reconciler: Arc::new(Mutex::new(LayerReconciler::ready(
                StyleSurface::new(),
                style,
            ))),
        }
    }

    /// State over an explicit backend
    pub fn with_transport(transport: Arc<dyn GeofenceTransport>, config: &Config) -> Self {
        let editor = GeofenceEditor::new(GeofenceStore::new(transport), config.collection.clone());
        Self::new(editor, LayerStyle::from(&config.overlay))
    }

    /// State over an in-process backend holding the configured collection
    pub fn from_config(config: &Config) -> Self {
        let transport = InMemoryTransport::new(&config.store);
        transport.create_collection(&config.collection);
        info!(
            "Using in-memory geofence backend (collection '{}', page size {})",
            config.collection, config.store.page_size
        );
        Self::with_transport(Arc::new(transport), config)
    }
}
