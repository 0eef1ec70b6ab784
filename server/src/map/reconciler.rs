//! Map layer reconciliation
//!
//! Keeps one overlay (a GeoJSON source plus a fill layer, both named by the
//! geofence id) on the map for every geofence it is given. Reconciling is
//! additive: ids missing from a call are left alone.

use indexmap::{IndexMap, IndexSet};
use metrics::{counter, gauge};
use serde::Serialize;
use tracing::{debug, info};

use crate::geofence::{GeofenceId, GeofenceRecord};
use crate::geometry::FeatureCollection;

use super::surface::{FillLayer, LayerStyle, MapSurface, SurfaceError};

/// What a reconcile call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The surface is not ready yet; records wait for `surface_ready`
    Deferred { queued: usize },
    /// Overlays were drawn; `replaced` of them already existed
    Applied { added: usize, replaced: usize },
}

/// Sole owner of the overlay namespace of one map surface.
///
/// Methods take `&mut self`, so callers sharing a reconciler must serialize
/// access to it.
pub struct LayerReconciler<S> {
    surface: S,
    style: LayerStyle,
    ready: bool,
    /// Records received before the surface was ready, last one per id wins
    pending: IndexMap<GeofenceId, GeofenceRecord>,
    /// Ids this reconciler has drawn
    rendered: IndexSet<GeofenceId>,
}

impl<S: MapSurface> LayerReconciler<S> {
    /// Reconciler for a surface that has not signalled readiness yet
    pub fn new(surface: S, style: LayerStyle) -> Self {
        Self {
            surface,
            style,
            ready: false,
            pending: IndexMap::new(),
            rendered: IndexSet::new(),
        }
    }

    /// Reconciler for a surface that already accepts sources and layers
    pub fn ready(surface: S, style: LayerStyle) -> Self {
        Self {
            ready: true,
            ..Self::new(surface, style)
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn style(&self) -> &LayerStyle {
        &self.style
    }

    pub fn rendered_ids(&self) -> impl Iterator<Item = &GeofenceId> {
        self.rendered.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Draw one overlay per record, replacing any overlay with the same id.
    ///
    /// Before the surface is ready the records are queued instead.
    pub fn reconcile(
        &mut self,
        records: &[GeofenceRecord],
    ) -> Result<ReconcileOutcome, SurfaceError> {
        if !self.ready {
            for record in records {
                self.pending.insert(record.id().clone(), record.clone());
            }
            debug!(
                "Map surface not ready, {} overlays queued",
                self.pending.len()
            );
            return Ok(ReconcileOutcome::Deferred {
                queued: self.pending.len(),
            });
        }

        let mut added = 0;
        let mut replaced = 0;
        for record in records {
            if self.render(record)? {
                replaced += 1;
            }
            added += 1;
        }

        counter!("geofence_overlays_reconciled_total").increment(added as u64);
        counter!("geofence_overlays_replaced_total").increment(replaced as u64);
        gauge!("geofence_overlays_rendered").set(self.rendered.len() as f64);
        debug!("Reconciled {} overlays ({} replaced)", added, replaced);

        Ok(ReconcileOutcome::Applied { added, replaced })
    }

    /// Handle the surface's one-time ready signal by drawing queued records.
    ///
    /// Records leave the queue only once drawn. If drawing one fails, it and
    /// every record after it stay queued, the reconciler stays not ready and
    /// the error is returned; signalling again retries them.
    pub fn surface_ready(&mut self) -> Result<ReconcileOutcome, SurfaceError> {
        if !self.ready {
            info!(
                "Map surface ready, drawing {} queued overlays",
                self.pending.len()
            );
        }

        let mut added = 0;
        let mut replaced = 0;
        while let Some(record) = self.pending.first().map(|(_, record)| record.clone()) {
            if self.render(&record)? {
                replaced += 1;
            }
            added += 1;
            self.pending.shift_remove_index(0);
        }
        self.ready = true;

        counter!("geofence_overlays_reconciled_total").increment(added as u64);
        counter!("geofence_overlays_replaced_total").increment(replaced as u64);
        gauge!("geofence_overlays_rendered").set(self.rendered.len() as f64);

        Ok(ReconcileOutcome::Applied { added, replaced })
    }

    /// Remove the overlay of one geofence; returns whether anything was removed
    pub fn remove(&mut self, id: &str) -> Result<bool, SurfaceError> {
        if !self.ready {
            return Ok(self.pending.shift_remove(id).is_some());
        }

        let mut removed = false;
        if self.surface.has_layer(id) {
            self.surface.remove_layer(id)?;
            removed = true;
        }
        if self.surface.has_source(id) {
            self.surface.remove_source(id)?;
            removed = true;
        }
        self.rendered.shift_remove(id);
        gauge!("geofence_overlays_rendered").set(self.rendered.len() as f64);

        Ok(removed)
    }

    /// Remove every overlay this reconciler has drawn (or queued)
    pub fn clear(&mut self) -> Result<usize, SurfaceError> {
        let queued = self.pending.len();
        self.pending.clear();

        let ids: Vec<GeofenceId> = self.rendered.iter().cloned().collect();
        let mut removed = 0;
        for id in &ids {
            if self.remove(id.as_str())? {
                removed += 1;
            }
        }

        Ok(removed + queued)
    }

    /// Replace-or-add the overlay for one record; true when it replaced one.
    ///
    /// On failure the id stays in `rendered` only if its layer is still drawn.
    fn render(&mut self, record: &GeofenceRecord) -> Result<bool, SurfaceError> {
        match self.draw(record) {
            Ok(replaced) => {
                self.rendered.insert(record.id().clone());
                Ok(replaced)
            }
            Err(e) => {
                if !self.surface.has_layer(record.id().as_str()) {
                    self.rendered.shift_remove(record.id());
                }
                Err(e)
            }
        }
    }

    fn draw(&mut self, record: &GeofenceRecord) -> Result<bool, SurfaceError> {
        let id = record.id().as_str();
        let mut replaced = false;

        // Layer first: a layer must never outlive its source
        if self.surface.has_layer(id) {
            self.surface.remove_layer(id)?;
            replaced = true;
        }
        if self.surface.has_source(id) {
            self.surface.remove_source(id)?;
            replaced = true;
        }

        self.surface
            .add_source(id, FeatureCollection::new(vec![record.to_feature()]))?;
        self.surface.add_layer(FillLayer::new(id, id, &self.style))?;

        Ok(replaced)
    }
}
