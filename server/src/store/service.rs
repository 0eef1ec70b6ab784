//! Geofence store: create, list and delete geofences in a remote collection

use futures_util::stream::{self, Stream, TryStreamExt};
use indexmap::IndexMap;
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::geofence::{GeofenceId, GeofenceRecord};
use crate::geometry::{Ring, normalize_orientation};

use super::transport::GeofenceTransport;
use super::types::{PutGeofence, StoreError, WireGeometry};

/// Listing position between pages
enum Cursor {
    First,
    Next(String),
    Done,
}

/// Stream state: where to read next and how many entries were yielded so far
struct ListState {
    cursor: Cursor,
    received: usize,
}

/// Backends signal the last page with a missing or empty token
fn continuation(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Store facade over a geofencing backend.
///
/// Every call maps to exactly one backend operation (or one pass over the
/// pages of a listing). Nothing is retried here.
#[derive(Clone)]
pub struct GeofenceStore {
    transport: Arc<dyn GeofenceTransport>,
}

impl GeofenceStore {
    pub fn new(transport: Arc<dyn GeofenceTransport>) -> Self {
        Self { transport }
    }

    /// Submit `ring` as the sole outer boundary of geofence `id`.
    ///
    /// The ring is normalized to counter-clockwise first; a degenerate ring
    /// fails with `InvalidGeometry` before anything is sent.
    pub async fn create(
        &self,
        collection: &str,
        id: &GeofenceId,
        ring: &Ring,
    ) -> Result<(), StoreError> {
        let start = Instant::now();
        counter!("geofence_store_creates_total").increment(1);

        let ring = normalize_orientation(ring)?;
        let request = PutGeofence {
            geofence_id: id.to_string(),
            geometry: WireGeometry::from_ring(&ring),
        };

        match self.transport.put_geofence(collection, request).await {
            Ok(outcome) => {
                info!(
                    "Created geofence '{}' in '{}' ({} vertices, created {})",
                    outcome.geofence_id,
                    collection,
                    ring.vertex_count(),
                    outcome.create_time
                );
                histogram!("geofence_store_create_duration_seconds").record(start.elapsed());
                Ok(())
            }
            Err(e) => {
                counter!("geofence_store_create_failures_total").increment(1);
                warn!("Failed to create geofence '{}' in '{}': {}", id, collection, e);
                Err(e)
            }
        }
    }

    /// Lazily stream every geofence of a collection, page by page.
    ///
    /// Each call starts again from the first page. An unreadable entry ends
    /// the stream with `Malformed`. A failed page fetch ends it with the
    /// transport error on the first page and with `Partial` (entries yielded
    /// so far, token to resume from) on any later page.
    pub fn list(
        &self,
        collection: &str,
    ) -> impl Stream<Item = Result<GeofenceRecord, StoreError>> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let collection = collection.to_string();
        let start = ListState {
            cursor: Cursor::First,
            received: 0,
        };

        stream::try_unfold(start, move |state| {
            let transport = Arc::clone(&transport);
            let collection = collection.clone();
            async move {
                let token = match state.cursor {
                    Cursor::Done => return Ok::<_, StoreError>(None),
                    Cursor::First => None,
                    Cursor::Next(token) => Some(token),
                };

                let page = match transport
                    .list_geofences(&collection, token.as_deref())
                    .await
                {
                    Ok(page) => page,
                    Err(e) if token.is_some() => {
                        warn!(
                            "Listing '{}' stopped after {} geofences: {}",
                            collection, state.received, e
                        );
                        return Err(StoreError::Partial {
                            received: state.received,
                            next_token: token,
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                };
                counter!("geofence_store_list_pages_total").increment(1);

                let next = ListState {
                    cursor: match continuation(page.next_token) {
                        Some(token) => Cursor::Next(token),
                        None => Cursor::Done,
                    },
                    received: state.received + page.entries.len(),
                };
                Ok(Some((page.entries, next)))
            }
        })
        .map_ok(|entries| stream::iter(entries.into_iter().map(GeofenceRecord::try_from)))
        .try_flatten()
    }

    /// Fetch every geofence of a collection.
    ///
    /// A page failure after at least one page arrived is reported as
    /// `Partial` so truncated results are never mistaken for complete ones.
    /// Identifiers listed twice keep their last occurrence.
    pub async fn list_all(&self, collection: &str) -> Result<Vec<GeofenceRecord>, StoreError> {
        let start = Instant::now();
        let mut records: IndexMap<GeofenceId, GeofenceRecord> = IndexMap::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = match self
                .transport
                .list_geofences(collection, token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) if pages > 0 => {
                    warn!(
                        "Listing '{}' stopped after {} pages ({} geofences): {}",
                        collection,
                        pages,
                        records.len(),
                        e
                    );
                    return Err(StoreError::Partial {
                        received: records.len(),
                        next_token: token,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to list geofences in '{}': {}", collection, e);
                    return Err(e);
                }
            };
            pages += 1;
            counter!("geofence_store_list_pages_total").increment(1);

            for entry in page.entries {
                let record = GeofenceRecord::try_from(entry)?;
                if let Some(previous) = records.insert(record.id().clone(), record) {
                    warn!(
                        "Geofence '{}' listed more than once in '{}', keeping the latest",
                        previous.id(),
                        collection
                    );
                }
            }

            match continuation(page.next_token) {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        debug!(
            "Listed {} geofences from '{}' in {} pages",
            records.len(),
            collection,
            pages
        );
        histogram!("geofence_store_list_duration_seconds").record(start.elapsed());

        Ok(records.into_values().collect())
    }

    /// Remove a geofence from a collection
    pub async fn delete(&self, collection: &str, id: &GeofenceId) -> Result<(), StoreError> {
        counter!("geofence_store_deletes_total").increment(1);
        self.transport
            .delete_geofence(collection, id.as_str())
            .await
            .inspect(|_| info!("Deleted geofence '{}' from '{}'", id, collection))
            .inspect_err(|e| warn!("Failed to delete geofence '{}' from '{}': {}", id, collection, e))
    }
}
