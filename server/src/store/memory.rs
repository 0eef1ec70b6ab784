//! In-memory geofencing backend
//!
//! Behaves like the remote service as far as this engine can observe it:
//! puts upsert by id, outer rings must be counter-clockwise, listings are
//! paginated with opaque continuation tokens.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::{ConflictPolicy, StoreConfig};
use crate::geometry::Orientation;

use super::transport::GeofenceTransport;
use super::types::{ListPage, PutGeofence, PutOutcome, StoreError, WireGeofence, WireGeometry};

/// A stored geofence and its insertion sequence number
#[derive(Debug, Clone)]
struct StoredGeofence {
    seq: u64,
    geofence: WireGeofence,
}

/// One collection: geofences by id, ascending by `seq`
#[derive(Debug, Default)]
struct Collection {
    next_seq: u64,
    geofences: IndexMap<String, StoredGeofence>,
}

/// Geofence backend held in process memory.
///
/// Continuation tokens carry the sequence number of the next geofence to
/// return. Sequence numbers are never reused and removals keep the order, so
/// deleting or adding geofences between page fetches never skips an entry
/// that was present for the whole listing.
pub struct InMemoryTransport {
    collections: DashMap<String, Collection>,
    page_size: usize,
    max_vertices: usize,
    conflict_policy: ConflictPolicy,
}

impl InMemoryTransport {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            collections: DashMap::new(),
            page_size: config.page_size.max(1),
            max_vertices: config.max_vertices,
            conflict_policy: config.conflict_policy,
        }
    }

    /// Create an empty collection; returns false if it already existed
    pub fn create_collection(&self, name: &str) -> bool {
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Collection::default());
                info!("Created geofence collection '{}'", name);
                true
            }
        }
    }

    /// Number of geofences stored in a collection
    pub fn geofence_count(&self, collection: &str) -> Option<usize> {
        self.collections.get(collection).map(|c| c.geofences.len())
    }

    /// Apply the backend's geometry rules to a submitted polygon
    fn check_geometry(&self, geometry: &WireGeometry) -> Result<(), StoreError> {
        let ring = geometry
            .outer_ring()
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        if ring.vertex_count() > self.max_vertices {
            return Err(StoreError::Rejected(format!(
                "polygon has {} vertices, at most {} allowed",
                ring.vertex_count(),
                self.max_vertices
            )));
        }

        match ring.orientation() {
            Ok(Orientation::CounterClockwise) => Ok(()),
            Ok(Orientation::Clockwise) => Err(StoreError::Rejected(
                "outer ring must be wound counter-clockwise".to_string(),
            )),
            Err(e) => Err(StoreError::Rejected(e.to_string())),
        }
    }
}

#[async_trait]
impl GeofenceTransport for InMemoryTransport {
    async fn put_geofence(
        &self,
        collection: &str,
        request: PutGeofence,
    ) -> Result<PutOutcome, StoreError> {
        self.check_geometry(&request.geometry)?;

        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;
        let Collection {
            next_seq,
            geofences,
        } = &mut *entry;

        let now = Utc::now();

        if let Some(existing) = geofences.get_mut(&request.geofence_id) {
            if self.conflict_policy == ConflictPolicy::Reject {
                return Err(StoreError::Conflict(request.geofence_id));
            }

            // Replacing keeps the position (and sequence number) in listings
            let stored = &mut existing.geofence;
            stored.geometry = request.geometry;
            stored.status = "ACTIVE".to_string();
            stored.update_time = now;
            debug!("Replaced geofence '{}' in '{}'", request.geofence_id, collection);

            return Ok(PutOutcome {
                geofence_id: request.geofence_id,
                create_time: stored.create_time,
                update_time: now,
            });
        }

        debug!("Stored geofence '{}' in '{}'", request.geofence_id, collection);
        let seq = *next_seq;
        *next_seq += 1;
        geofences.insert(
            request.geofence_id.clone(),
            StoredGeofence {
                seq,
                geofence: WireGeofence {
                    geofence_id: request.geofence_id.clone(),
                    geometry: request.geometry,
                    status: "ACTIVE".to_string(),
                    create_time: now,
                    update_time: now,
                },
            },
        );

        Ok(PutOutcome {
            geofence_id: request.geofence_id,
            create_time: now,
            update_time: now,
        })
    }

    async fn list_geofences(
        &self,
        collection: &str,
        next_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        let start_seq = match next_token {
            None => 0,
            Some(token) => token
                .parse::<u64>()
                .ok()
                .filter(|&seq| seq < entry.next_seq)
                .ok_or_else(|| StoreError::Rejected(format!("invalid next token '{}'", token)))?,
        };

        let mut remaining = entry
            .geofences
            .values()
            .skip_while(|stored| stored.seq < start_seq);
        let entries: Vec<WireGeofence> = remaining
            .by_ref()
            .take(self.page_size)
            .map(|stored| stored.geofence.clone())
            .collect();
        let next_token = remaining.next().map(|stored| stored.seq.to_string());

        Ok(ListPage {
            entries,
            next_token,
        })
    }

    async fn delete_geofence(&self, collection: &str, geofence_id: &str) -> Result<(), StoreError> {
        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;

        if entry.geofences.shift_remove(geofence_id).is_none() {
            return Err(StoreError::NotFound(geofence_id.to_string()));
        }

        debug!("Deleted geofence '{}' from '{}'", geofence_id, collection);
        Ok(())
    }
}
