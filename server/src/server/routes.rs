//! HTTP route handlers for the geofence API

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::editor::EditorError;
use crate::geofence::{GeofenceId, GeofenceRecord, ValidationError};
use crate::geometry::{FeatureCollection, Geometry};
use crate::map::{ReconcileOutcome, StyleSurface};
use crate::store::StoreError;

use super::state::AppState;

/// Error response for the geofence API
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<StoreError> for ApiErrorResponse {
    fn from(e: StoreError) -> Self {
        let code = match &e {
            StoreError::Conflict(_) => "conflict",
            StoreError::Rejected(_) => "rejected",
            StoreError::Unreachable(_) => "unreachable",
            StoreError::Partial { .. } => "partial_listing",
            StoreError::CollectionNotFound(_) | StoreError::NotFound(_) => "not_found",
            StoreError::Malformed { .. } => "malformed",
            StoreError::InvalidGeometry(_) => "invalid_geometry",
        };
        Self {
            error: e.to_string(),
            code: code.to_string(),
        }
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(e: ValidationError) -> Self {
        Self {
            error: e.to_string(),
            code: "validation".to_string(),
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(e: JsonRejection) -> Self {
        Self {
            error: e.body_text(),
            code: "invalid_body".to_string(),
        }
    }
}

impl From<EditorError> for ApiErrorResponse {
    fn from(e: EditorError) -> Self {
        match e {
            EditorError::Validation(e) => e.into(),
            EditorError::Store(e) => e.into(),
            EditorError::Geometry(e) => Self {
                error: e.to_string(),
                code: "invalid_geometry".to_string(),
            },
            EditorError::Surface(e) => Self {
                error: e.to_string(),
                code: "surface".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "validation" | "invalid_body" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "conflict" => StatusCode::CONFLICT,
            "invalid_geometry" | "rejected" => StatusCode::UNPROCESSABLE_ENTITY,
            "unreachable" => StatusCode::SERVICE_UNAVAILABLE,
            "partial_listing" | "malformed" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Body of POST /api/geofences
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGeofenceRequest {
    /// Name as typed by the user
    pub name: String,
    /// Everything currently drawn on the map
    pub drawn: FeatureCollection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGeofenceResponse {
    pub id: GeofenceId,
}

/// One entry of GET /api/geofences
#[derive(Debug, Serialize, Deserialize)]
pub struct GeofenceSummary {
    pub id: GeofenceId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub geometry: Geometry,
}

impl From<GeofenceRecord> for GeofenceSummary {
    fn from(record: GeofenceRecord) -> Self {
        Self {
            status: record.status().to_string(),
            created_at: record.created_at(),
            geometry: record.ring().into(),
            id: record.id().clone(),
        }
    }
}

/// Response of the overlay endpoints
#[derive(Debug, Serialize)]
pub struct OverlaysResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ReconcileOutcome>,
    pub rendered: usize,
    pub style: &'a StyleSurface,
}

/// GET /api/geofences - List every geofence of the collection
pub async fn list_geofences(
    State(state): State<AppState>,
) -> Result<Json<Vec<GeofenceSummary>>, ApiErrorResponse> {
    let records = state
        .editor
        .store()
        .list_all(state.editor.collection())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list geofences: {}", e);
            ApiErrorResponse::from(e)
        })?;

    Ok(Json(records.into_iter().map(GeofenceSummary::from).collect()))
}

/// POST /api/geofences - Store the single drawn shape under a name
pub async fn create_geofence(
    State(state): State<AppState>,
    payload: Result<Json<CreateGeofenceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateGeofenceResponse>), ApiErrorResponse> {
    let Json(request) = payload?;
    let id = state
        .editor
        .submit(&request.name, &request.drawn)
        .await
        .map_err(|e| {
            tracing::warn!("Rejected geofence '{}': {}", request.name, e);
            ApiErrorResponse::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(CreateGeofenceResponse { id })))
}

/// DELETE /api/geofences/:id - Delete a geofence and its overlay
pub async fn delete_geofence(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    let id = GeofenceId::parse(id)?;

    let mut reconciler = state.reconciler.lock().await;
    state
        .editor
        .remove(&id, &mut *reconciler)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to delete geofence '{}': {}", id, e);
            ApiErrorResponse::from(e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/overlays - Current overlay sources and layers
pub async fn get_overlays(State(state): State<AppState>) -> Response {
    let reconciler = state.reconciler.lock().await;
    Json(OverlaysResponse {
        outcome: None,
        rendered: reconciler.rendered_ids().count(),
        style: reconciler.surface(),
    })
    .into_response()
}

/// POST /api/overlays/sync - List the collection and redraw its overlays
pub async fn sync_overlays(State(state): State<AppState>) -> Result<Response, ApiErrorResponse> {
    let mut reconciler = state.reconciler.lock().await;
    let outcome = state.editor.refresh(&mut *reconciler).await.map_err(|e| {
        tracing::error!("Failed to sync overlays: {}", e);
        ApiErrorResponse::from(e)
    })?;

    Ok(Json(OverlaysResponse {
        outcome: Some(outcome),
        rendered: reconciler.rendered_ids().count(),
        style: reconciler.surface(),
    })
    .into_response())
}

/// Build geofence API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/geofences", get(list_geofences).post(create_geofence))
        .route("/geofences/:id", delete(delete_geofence))
        .route("/overlays", get(get_overlays))
        .route("/overlays/sync", post(sync_overlays))
}
