use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, instrument};

use super::api::error_response;
use crate::observability::Metrics;

/// Create router exposing the Prometheus scrape endpoint
pub fn create_metrics_router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(scrape_metrics))
        .with_state(metrics)
}

/// Prometheus text exposition of HTTP, store and cafe counters.
///
/// Scrapes are never cached; an encoding failure answers with the standard
/// JSON error body.
#[instrument(name = "scrape_metrics", skip(metrics))]
pub async fn scrape_metrics(
    State(metrics): State<Arc<Metrics>>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let body = metrics.encode().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Metrics unavailable",
            e.to_string(),
        )
    })?;

    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(prometheus::TEXT_FORMAT),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}
