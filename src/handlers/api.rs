use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::models::{
    InquiryAck, InquiryRequest, MenuFilter, MenuItemOut, ServiceError, ServiceResult, Validate,
    ValidationError,
};
use crate::services::{InquiryService, MenuService};

/// Shared state for the menu and inquiry endpoints
#[derive(Clone)]
pub struct ApiState {
    pub menu_service: Arc<MenuService>,
    pub inquiry_service: Arc<InquiryService>,
}

/// Query parameters for listing the menu
#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    /// Kept as text so unrecognised values get the standard error body
    pub featured: Option<String>,
}

type ApiError = (StatusCode, Json<Value>);

/// Create API router with the menu and inquiry endpoints
pub fn create_api_router(
    menu_service: Arc<MenuService>,
    inquiry_service: Arc<InquiryService>,
) -> Router {
    let state = ApiState {
        menu_service,
        inquiry_service,
    };

    Router::new()
        .route("/api/menu", get(get_menu))
        .route("/api/inquiry", post(submit_inquiry))
        .with_state(state)
}

/// List menu items, optionally filtered by category and featured flag
#[instrument(name = "get_menu", skip(state), fields(
    category = query.category.as_deref(),
    featured = query.featured.as_deref(),
))]
pub async fn get_menu(
    State(state): State<ApiState>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<Vec<MenuItemOut>>, ApiError> {
    let filter = query_to_filter(query).map_err(|err| {
        warn!("Invalid menu query: {}", err);
        service_error_to_response(err)
    })?;

    Ok(Json(state.menu_service.get_menu(filter).await))
}

/// Accept a contact-form inquiry
#[instrument(name = "submit_inquiry", skip_all)]
pub async fn submit_inquiry(
    State(state): State<ApiState>,
    payload: Result<Json<InquiryRequest>, JsonRejection>,
) -> Result<Json<InquiryAck>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected inquiry body: {}", rejection.body_text());
        error_response(
            rejection.status(),
            "Invalid request body",
            rejection.body_text(),
        )
    })?;

    if let Err(err) = request.validate() {
        warn!("Inquiry validation failed: {}", err);
        return Err(service_error_to_response(err.into()));
    }

    Ok(Json(state.inquiry_service.submit_inquiry(request).await))
}

fn query_to_filter(query: MenuQuery) -> ServiceResult<MenuFilter> {
    let featured = query
        .featured
        .as_deref()
        .map(parse_featured)
        .transpose()?;

    Ok(MenuFilter::new(query.category, featured))
}

/// Parse the `featured` query flag (`true/false/1/0/yes/no/on/off`, any case)
fn parse_featured(value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::InvalidValue {
            field: "featured".to_string(),
            value: value.to_string(),
            reason: "Expected a boolean".to_string(),
        }),
    }
}

/// Standard JSON error body
pub fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(json!({
            "error": error,
            "message": message.into(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Convert ServiceError to HTTP response
fn service_error_to_response(err: ServiceError) -> ApiError {
    match err {
        ServiceError::ValidationError { message } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed", message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Metrics;
    use crate::repositories::{DocumentStore, InMemoryDocumentStore};
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    fn app() -> Router {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new("cafe"));
        let metrics = Arc::new(Metrics::new().unwrap());
        create_api_router(
            Arc::new(MenuService::new(Some(store.clone()), metrics.clone())),
            Arc::new(InquiryService::new(Some(store), metrics)),
        )
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_inquiry(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/inquiry")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_parse_featured() {
        for value in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(parse_featured(value).unwrap(), true, "{}", value);
        }
        for value in ["false", "0", "No", "off"] {
            assert_eq!(parse_featured(value).unwrap(), false, "{}", value);
        }
        assert!(parse_featured("maybe").is_err());
    }

    #[test]
    fn test_query_to_filter() {
        let filter = query_to_filter(MenuQuery {
            category: Some(String::new()),
            featured: Some("yes".to_string()),
        })
        .unwrap();
        assert_eq!(filter, MenuFilter::new(None, Some(true)));

        let err = query_to_filter(MenuQuery {
            category: None,
            featured: Some("sometimes".to_string()),
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError { .. }));
    }

    #[test]
    fn test_validation_error_response() {
        let (status, Json(body)) = service_error_to_response(ServiceError::ValidationError {
            message: "Required field missing: email".to_string(),
        });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["message"], "Required field missing: email");
    }

    #[tokio::test]
    async fn test_get_menu_featured() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/menu?featured=true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|item| item["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Iced Latte", "Tropical Smoothie", "Cold Brew"]);
    }

    #[tokio::test]
    async fn test_get_menu_rejects_unknown_featured_value() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/menu?featured=sometimes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert!(body["message"].as_str().unwrap().contains("featured"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_submit_inquiry() {
        let response = app()
            .oneshot(post_inquiry(json!({
                "name": "Kai",
                "email": "kai@example.com",
                "message": "Are dogs allowed on the patio?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert!(!body["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_inquiry_blank_field() {
        let response = app()
            .oneshot(post_inquiry(json!({
                "name": "Kai",
                "email": "kai@example.com",
                "message": "   "
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert!(body["message"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn test_submit_inquiry_missing_field() {
        let response = app()
            .oneshot(post_inquiry(json!({
                "name": "Kai",
                "message": "No email given"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid request body");
    }
}
