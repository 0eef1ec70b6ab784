//! Geofence identity and records

pub mod identifier;
pub mod record;

pub use identifier::{GeofenceId, ValidationError, validate};
pub use record::{GeofenceRecord, GeofenceStatus};
