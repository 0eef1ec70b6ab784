//! Geofence store module
//!
//! Persists and lists geofences through a backend transport.

pub mod memory;
pub mod service;
pub mod transport;
pub mod types;

pub use memory::InMemoryTransport;
pub use service::GeofenceStore;
pub use transport::GeofenceTransport;
pub use types::{ListPage, PutGeofence, PutOutcome, StoreError, WireGeofence, WireGeometry};
