//! Store error definitions and backend wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geofence::{GeofenceId, GeofenceRecord, GeofenceStatus};
use crate::geometry::{Coordinate, GeometryError, Ring};

/// Errors that can occur when talking to the geofencing backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Geofence already exists: {0}")]
    Conflict(String),

    #[error("Geofence rejected by backend: {0}")]
    Rejected(String),

    #[error("Geofencing backend unreachable: {0}")]
    Unreachable(String),

    #[error("Listing stopped after {received} geofences: {reason}")]
    Partial {
        received: usize,
        next_token: Option<String>,
        reason: String,
    },

    #[error("Geofence collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Geofence not found: {0}")]
    NotFound(String),

    #[error("Malformed geofence '{geofence_id}' from backend: {reason}")]
    Malformed { geofence_id: String, reason: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),
}

impl StoreError {
    /// Only transport failures are worth retrying; every other error repeats
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unreachable(_))
    }
}

/// Backend geometry: a list of rings, the first being the outer boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireGeometry {
    pub polygon: Vec<Vec<[f64; 2]>>,
}

impl WireGeometry {
    pub fn from_ring(ring: &Ring) -> Self {
        Self {
            polygon: vec![ring.coordinates().iter().map(|&c| c.into()).collect()],
        }
    }

    /// Outer ring taken as-is, without re-orienting it
    pub fn outer_ring(&self) -> Result<Ring, GeometryError> {
        let outer = self.polygon.first().ok_or(GeometryError::MissingOuterRing)?;
        Ring::new(outer.iter().copied().map(Coordinate::from).collect())
    }
}

/// Request body for creating (or replacing) a geofence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutGeofence {
    pub geofence_id: String,
    pub geometry: WireGeometry,
}

/// Backend acknowledgement of a put
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutOutcome {
    pub geofence_id: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// A geofence entry as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireGeofence {
    pub geofence_id: String,
    pub geometry: WireGeometry,
    pub status: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// One page of a listing; `next_token` is set when more entries remain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPage {
    pub entries: Vec<WireGeofence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl TryFrom<WireGeofence> for GeofenceRecord {
    type Error = StoreError;

    fn try_from(entry: WireGeofence) -> Result<Self, Self::Error> {
        let malformed = |reason: String| StoreError::Malformed {
            geofence_id: entry.geofence_id.clone(),
            reason,
        };

        let id = GeofenceId::parse(entry.geofence_id.as_str())
            .map_err(|e| malformed(e.to_string()))?;
        let ring = entry
            .geometry
            .outer_ring()
            .map_err(|e| malformed(e.to_string()))?;

        Ok(GeofenceRecord::new(
            id,
            ring,
            GeofenceStatus::from(entry.status),
            entry.create_time,
        ))
    }
}
