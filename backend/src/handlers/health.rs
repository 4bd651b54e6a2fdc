//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::store::with_deadline;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check store connectivity
    let store_status = match with_deadline(state.store_timeout(), state.store.ping()).await {
        Ok(()) => "connected".to_string(),
        Err(err) => {
            tracing::warn!("store health check failed: {}", err);
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status,
    })
}
