//! Test Utilities Module
//!
//! Provides fixtures, scripted backends and a recording map surface for
//! testing the geofence engine. This module is only compiled when running tests.

#![cfg(test)]

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Map;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::StoreConfig;
use crate::geofence::{GeofenceId, GeofenceRecord, GeofenceStatus};
use crate::geometry::{Coordinate, Feature, FeatureCollection, Ring};
use crate::map::{FillLayer, MapSurface, StyleSurface, SurfaceError};
use crate::store::{
    GeofenceTransport, InMemoryTransport, ListPage, PutGeofence, PutOutcome, StoreError,
    WireGeofence, WireGeometry,
};

// ============================================================================
// Geometry Factories
// ============================================================================

/// Counter-clockwise axis-aligned square with its lower-left corner at (x, y)
pub fn square_ring(x: f64, y: f64, size: f64) -> Ring {
    Ring::new(vec![
        Coordinate::new(x, y),
        Coordinate::new(x + size, y),
        Coordinate::new(x + size, y + size),
        Coordinate::new(x, y + size),
        Coordinate::new(x, y),
    ])
    .expect("square ring is valid")
}

/// Feature collection as a drawing tool would hold it, one polygon per ring
pub fn drawn(rings: &[Ring]) -> FeatureCollection {
    FeatureCollection::new(
        rings
            .iter()
            .map(|ring| Feature::polygon(ring, Map::new()))
            .collect(),
    )
}

/// Active geofence record with a unit square at x
pub fn record(id: &str, x: f64) -> GeofenceRecord {
    GeofenceRecord::new(
        GeofenceId::parse(id).expect("valid test id"),
        square_ring(x, 0.0, 1.0),
        GeofenceStatus::Active,
        Utc::now(),
    )
}

/// Backend listing entry with a unit square at x
pub fn wire_entry(id: &str, x: f64) -> WireGeofence {
    let now = Utc::now();
    WireGeofence {
        geofence_id: id.to_string(),
        geometry: WireGeometry::from_ring(&square_ring(x, 0.0, 1.0)),
        status: "ACTIVE".to_string(),
        create_time: now,
        update_time: now,
    }
}

// ============================================================================
// Scripted Backends
// ============================================================================

/// In-memory backend with injectable failures and call counting
pub struct ScriptedTransport {
    inner: InMemoryTransport,
    /// Every put attempt, failed ones included
    pub puts: AtomicUsize,
    list_calls: AtomicUsize,
    fail_puts: AtomicBool,
    fail_list_call: Mutex<Option<usize>>,
}

impl ScriptedTransport {
    pub fn new(collection: &str) -> Self {
        Self::with_page_size(collection, StoreConfig::default().page_size)
    }

    pub fn with_page_size(collection: &str, page_size: usize) -> Self {
        let inner = InMemoryTransport::new(&StoreConfig {
            page_size,
            ..StoreConfig::default()
        });
        inner.create_collection(collection);
        Self {
            inner,
            puts: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            fail_puts: AtomicBool::new(false),
            fail_list_call: Mutex::new(None),
        }
    }

    /// Make every following put fail as unreachable
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make the list call with this zero-based index fail as unreachable
    pub fn fail_list_call(&self, index: usize) {
        *self.fail_list_call.lock().unwrap() = Some(index);
    }
}

#[async_trait]
impl GeofenceTransport for ScriptedTransport {
    async fn put_geofence(
        &self,
        collection: &str,
        request: PutGeofence,
    ) -> Result<PutOutcome, StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable("connection refused".into()));
        }
        self.inner.put_geofence(collection, request).await
    }

    async fn list_geofences(
        &self,
        collection: &str,
        next_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list_call.lock().unwrap() == Some(call) {
            return Err(StoreError::Unreachable("connection reset".into()));
        }
        self.inner.list_geofences(collection, next_token).await
    }

    async fn delete_geofence(&self, collection: &str, geofence_id: &str) -> Result<(), StoreError> {
        self.inner.delete_geofence(collection, geofence_id).await
    }
}

/// Backend serving a fixed sequence of pages; token "n" selects page n
pub struct FixedPagesTransport {
    pages: Vec<ListPage>,
}

impl FixedPagesTransport {
    pub fn new(pages: Vec<ListPage>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl GeofenceTransport for FixedPagesTransport {
    async fn put_geofence(
        &self,
        _collection: &str,
        request: PutGeofence,
    ) -> Result<PutOutcome, StoreError> {
        Err(StoreError::Rejected(format!(
            "read-only backend, cannot store '{}'",
            request.geofence_id
        )))
    }

    async fn list_geofences(
        &self,
        _collection: &str,
        next_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let index = match next_token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::Rejected(format!("invalid next token '{}'", token)))?,
        };
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| StoreError::Rejected(format!("no page {}", index)))
    }

    async fn delete_geofence(&self, _collection: &str, geofence_id: &str) -> Result<(), StoreError> {
        Err(StoreError::NotFound(geofence_id.to_string()))
    }
}

// ============================================================================
// Map Surface
// ============================================================================

/// Style surface that logs every mutating call in order
#[derive(Default)]
pub struct RecordingSurface {
    pub inner: StyleSurface,
    pub ops: Vec<String>,
}

impl MapSurface for RecordingSurface {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        self.ops.push(format!("add_source {}", id));
        self.inner.add_source(id, data)
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        self.ops.push(format!("remove_source {}", id));
        self.inner.remove_source(id)
    }

    fn add_layer(&mut self, layer: FillLayer) -> Result<(), SurfaceError> {
        self.ops.push(format!("add_layer {}", layer.id));
        self.inner.add_layer(layer)
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        self.ops.push(format!("remove_layer {}", id));
        self.inner.remove_layer(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.inner.has_layer(id)
    }

    fn has_source(&self, id: &str) -> bool {
        self.inner.has_source(id)
    }
}
