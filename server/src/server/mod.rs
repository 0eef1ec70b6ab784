//! HTTP surface of the geofence server

pub mod routes;
pub mod state;

pub use routes::{ApiErrorResponse, api_routes};
pub use state::{AppState, SharedReconciler};

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    collection: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        collection: state.editor.collection().to_string(),
    })
}

/// Router with the health check and the geofence API under `/api`
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(cors)
        .with_state(state)
}
