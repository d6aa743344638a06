use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::models::DatabaseDiagnostics;
use crate::services::DiagnosticsService;

/// Create router with the liveness and diagnostics endpoints
pub fn create_health_router(diagnostics: Arc<DiagnosticsService>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/hello", get(hello))
        .route("/test", get(test_database))
        .route("/health/status", get(health_check))
        .with_state(diagnostics)
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Beachside Cafe backend is running" }))
}

pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Beachside Cafe API!" }))
}

/// Health check endpoint handler
#[instrument(name = "health_check")]
pub async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

/// Store availability report; always answers 200
#[instrument(name = "test_database", skip(diagnostics))]
pub async fn test_database(
    State(diagnostics): State<Arc<DiagnosticsService>>,
) -> Json<DatabaseDiagnostics> {
    Json(diagnostics.report().await)
}
