//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use geofence_server::config::{Config, ConflictPolicy};
use geofence_server::server::{AppState, build_router};
use geofence_server::store::{GeofenceTransport, ListPage, PutGeofence, PutOutcome, StoreError};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Create a test application router with state
pub fn create_test_app_with_state() -> (Router, AppState) {
    create_test_app_with_config(Config::default())
}

/// Create a test application router from an explicit configuration
pub fn create_test_app_with_config(config: Config) -> (Router, AppState) {
    let app_state = AppState::from_config(&config);
    (build_router(app_state.clone()), app_state)
}

/// Create a test application router with all routes configured
pub fn create_test_app() -> Router {
    create_test_app_with_state().0
}

/// Create a test application whose backend rejects duplicate ids
pub fn create_strict_test_app() -> Router {
    let mut config = Config::default();
    config.store.conflict_policy = ConflictPolicy::Reject;
    create_test_app_with_config(config).0
}

/// Create a test application whose backend cannot be reached
pub fn create_unreachable_test_app() -> Router {
    let state = AppState::with_transport(Arc::new(DownTransport), &Config::default());
    build_router(state)
}

/// Backend that fails every call as unreachable
pub struct DownTransport;

#[async_trait]
impl GeofenceTransport for DownTransport {
    async fn put_geofence(
        &self,
        _collection: &str,
        _request: PutGeofence,
    ) -> Result<PutOutcome, StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }

    async fn list_geofences(
        &self,
        _collection: &str,
        _next_token: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }

    async fn delete_geofence(&self, _collection: &str, _geofence_id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unreachable("connection refused".into()))
    }
}

/// Send a request and return the status with the JSON body (Null when empty)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Feature collection holding one feature with the given geometry
pub fn drawn_geometry(geometry: Value) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{ "type": "Feature", "properties": {}, "geometry": geometry }]
    })
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Unit square polygon ring at x, as a drawing tool would emit it
pub fn square_ring(x: f64, clockwise: bool) -> Value {
    let mut ring = vec![
        json!([x, 0.0]),
        json!([x + 1.0, 0.0]),
        json!([x + 1.0, 1.0]),
        json!([x, 1.0]),
        json!([x, 0.0]),
    ];
    if clockwise {
        ring.reverse();
    }
    Value::Array(ring)
}

/// Feature collection holding one polygon feature per ring
pub fn drawn(rings: Vec<Value>) -> Value {
    let features: Vec<Value> = rings
        .into_iter()
        .map(|ring| {
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": [ring] }
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

/// Body of a create request for a single drawn square
pub fn create_body(name: &str, x: f64, clockwise: bool) -> Value {
    json!({ "name": name, "drawn": drawn(vec![square_ring(x, clockwise)]) })
}
