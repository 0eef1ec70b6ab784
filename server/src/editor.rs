//! Geofence editing pipeline
//!
//! Ties the pieces together the way the map page uses them:
//! validate name -> normalize drawn ring -> create, and
//! list -> reconcile overlays.

use thiserror::Error;
use tracing::info;

use crate::geofence::{GeofenceId, ValidationError, validate};
use crate::geometry::{GeometryError, normalize_orientation};
use crate::map::{DrawingTool, LayerReconciler, MapSurface, ReconcileOutcome, SurfaceError};
use crate::store::{GeofenceStore, StoreError};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Geofence operations bound to one collection
#[derive(Clone)]
pub struct GeofenceEditor {
    store: GeofenceStore,
    collection: String,
}

impl GeofenceEditor {
    pub fn new(store: GeofenceStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn store(&self) -> &GeofenceStore {
        &self.store
    }

    /// Store the single shape currently drawn under the name `raw_name`.
    ///
    /// Nothing is sent to the backend unless the name and the drawing are
    /// both valid.
    pub async fn submit<D>(&self, raw_name: &str, drawing: &D) -> Result<GeofenceId, EditorError>
    where
        D: DrawingTool + ?Sized,
    {
        let drawn = drawing.drawn_features();
        let id = validate(raw_name, drawn.len())?;

        let feature = drawn
            .features
            .first()
            .ok_or(ValidationError::NoGeometryDrawn)?;
        let ring = normalize_orientation(&feature.outer_ring()?)?;

        self.store.create(&self.collection, &id, &ring).await?;
        info!("Submitted geofence '{}' to '{}'", id, self.collection);

        Ok(id)
    }

    /// Redraw every stored geofence on the map.
    ///
    /// The map is only touched once the full listing has arrived.
    pub async fn refresh<S: MapSurface>(
        &self,
        reconciler: &mut LayerReconciler<S>,
    ) -> Result<ReconcileOutcome, EditorError> {
        let records = self.store.list_all(&self.collection).await?;
        Ok(reconciler.reconcile(&records)?)
    }

    /// Delete a geofence from the backend, then drop its overlay
    pub async fn remove<S: MapSurface>(
        &self,
        id: &GeofenceId,
        reconciler: &mut LayerReconciler<S>,
    ) -> Result<(), EditorError> {
        self.store.delete(&self.collection, id).await?;
        reconciler.remove(id.as_str())?;
        Ok(())
    }
}
