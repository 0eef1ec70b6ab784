//! Geofence Server Library
//!
//! This module exports the geofence engine and its HTTP surface for use in
//! integration tests and external tooling.

pub mod config;
pub mod editor;
pub mod geofence;
pub mod geometry;
pub mod map;
pub mod server;
pub mod store;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use editor::{EditorError, GeofenceEditor};
pub use geofence::{GeofenceId, GeofenceRecord, validate};
pub use geometry::{Ring, normalize_orientation};
pub use map::{LayerReconciler, MapSurface, ReconcileOutcome};
pub use server::{AppState, build_router};
pub use store::{GeofenceStore, GeofenceTransport, InMemoryTransport, StoreError};
