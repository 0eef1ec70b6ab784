//! Stored geofence records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::identifier::GeofenceId;
use crate::geometry::{Feature, Ring};

/// Lifecycle status reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeofenceStatus {
    Active,
    Pending,
    Deleted,
    /// Any status this engine does not interpret, kept verbatim
    Other(String),
}

impl GeofenceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GeofenceStatus::Active => "ACTIVE",
            GeofenceStatus::Pending => "PENDING",
            GeofenceStatus::Deleted => "DELETED",
            GeofenceStatus::Other(raw) => raw,
        }
    }
}

impl From<&str> for GeofenceStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "ACTIVE" => GeofenceStatus::Active,
            "PENDING" => GeofenceStatus::Pending,
            "DELETED" => GeofenceStatus::Deleted,
            other => GeofenceStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for GeofenceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ACTIVE" | "PENDING" | "DELETED" => Self::from(raw.as_str()),
            _ => GeofenceStatus::Other(raw),
        }
    }
}

impl From<GeofenceStatus> for String {
    fn from(status: GeofenceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for GeofenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One geofence as known to the backend.
///
/// Records are values: a changed geofence is a new record with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceRecord {
    id: GeofenceId,
    ring: Ring,
    status: GeofenceStatus,
    created_at: DateTime<Utc>,
}

impl GeofenceRecord {
    pub fn new(
        id: GeofenceId,
        ring: Ring,
        status: GeofenceStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            ring,
            status,
            created_at,
        }
    }

    pub fn id(&self) -> &GeofenceId {
        &self.id
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    pub fn status(&self) -> &GeofenceStatus {
        &self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// GeoJSON feature carrying the ring and identifying properties
    pub fn to_feature(&self) -> Feature {
        let mut properties = Map::new();
        properties.insert("geofence_id".into(), Value::from(self.id.as_str()));
        properties.insert("status".into(), Value::from(self.status.as_str()));

        let mut feature = Feature::polygon(&self.ring, properties);
        // Feature state (hover) is keyed by a numeric feature id
        feature.id = Some(Value::from(0));
        feature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Geometry};

    #[test]
    fn test_status_round_trip() {
        assert_eq!(GeofenceStatus::from("ACTIVE"), GeofenceStatus::Active);
        assert_eq!(GeofenceStatus::from("PENDING"), GeofenceStatus::Pending);
        assert_eq!(GeofenceStatus::from("DELETED"), GeofenceStatus::Deleted);
        assert_eq!(
            GeofenceStatus::from("DELETING"),
            GeofenceStatus::Other("DELETING".to_string())
        );
        assert_eq!(GeofenceStatus::Other("FAILED".into()).as_str(), "FAILED");

        let status: GeofenceStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(status, GeofenceStatus::Pending);
        assert_eq!(serde_json::to_string(&GeofenceStatus::Active).unwrap(), "\"ACTIVE\"");
    }

    #[test]
    fn test_record_feature() {
        let ring = Ring::new(
            [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]
                .into_iter()
                .map(Coordinate::from)
                .collect(),
        )
        .unwrap();
        let record = GeofenceRecord::new(
            GeofenceId::parse("depot").unwrap(),
            ring.clone(),
            GeofenceStatus::Active,
            Utc::now(),
        );

        let feature = record.to_feature();
        let props = feature.properties.as_ref().unwrap();
        assert_eq!(props["geofence_id"], "depot");
        assert_eq!(props["status"], "ACTIVE");
        assert_eq!(
            feature.geometry,
            Some(Geometry::Polygon {
                coordinates: vec![ring.into_coordinates()]
            })
        );
    }
}
