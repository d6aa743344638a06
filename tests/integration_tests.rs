use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use beachside_cafe::models::{DocumentFilter, RepositoryError, MENU_COLLECTION};
use beachside_cafe::repositories::DocumentStore;
use serde_json::{json, Value};

mod common;
use common::*;

const ALL_ITEMS: [&str; 5] = [
    "Iced Latte",
    "Tropical Smoothie",
    "Avocado Toast",
    "Blueberry Muffin",
    "Cold Brew",
];

#[tokio::test]
async fn test_menu_on_empty_store_seeds_canonical_items() {
    let env = TestEnvironment::in_memory();

    let (status, body) = env.get("/api/menu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_names(&body), ALL_ITEMS);

    let store = env.memory_store.as_ref().unwrap();
    let documents = store
        .get_documents(MENU_COLLECTION, &DocumentFilter::new(), None)
        .await
        .unwrap();
    assert_eq!(documents.len(), 5);

    let latte = &body[0];
    assert_eq!(latte["price"], json!(5.5));
    assert_eq!(latte["category"], "Coffee");
    assert_eq!(latte["is_featured"], true);
    assert_eq!(
        latte["description"],
        "Double shot espresso with cold milk over ice"
    );
}

#[tokio::test]
async fn test_repeated_menu_requests_do_not_reseed() {
    let env = TestEnvironment::in_memory();

    env.get("/api/menu").await;
    env.get("/api/menu?featured=false").await;
    let (_, body) = env.get("/api/menu").await;

    assert_eq!(item_names(&body).len(), 5);
    assert_eq!(
        env.memory_store
            .as_ref()
            .unwrap()
            .document_count(MENU_COLLECTION)
            .await,
        5
    );
}

#[tokio::test]
async fn test_concurrent_first_requests_seed_once() {
    let env = TestEnvironment::in_memory();

    let (first, second) = tokio::join!(env.get("/api/menu"), env.get("/api/menu"));
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    assert_eq!(
        env.memory_store
            .as_ref()
            .unwrap()
            .document_count(MENU_COLLECTION)
            .await,
        5
    );
}

#[tokio::test]
async fn test_menu_featured_filter() {
    let env = TestEnvironment::in_memory();

    let (status, body) = env.get("/api/menu?featured=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        item_names(&body),
        vec!["Iced Latte", "Tropical Smoothie", "Cold Brew"]
    );
}

#[tokio::test]
async fn test_menu_category_filter() {
    let env = TestEnvironment::in_memory();

    let (status, body) = env.get("/api/menu?category=Pastry").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_names(&body), vec!["Blueberry Muffin"]);
    assert_eq!(body[0]["price"], json!(3.5));
}

#[tokio::test]
async fn test_menu_combined_filters() {
    let env = TestEnvironment::in_memory();

    let (_, body) = env.get("/api/menu?category=Coffee&featured=1").await;
    assert_eq!(item_names(&body), vec!["Iced Latte", "Cold Brew"]);

    let (_, body) = env.get("/api/menu?category=Brunch&featured=on").await;
    assert!(item_names(&body).is_empty());
}

#[tokio::test]
async fn test_menu_falls_back_when_store_fails() {
    let env = TestEnvironment::failing(FailingStore::unreachable());

    let (status, body) = env.get("/api/menu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_names(&body), ALL_ITEMS);

    let (_, body) = env.get("/api/menu?category=Coffee").await;
    assert_eq!(item_names(&body), vec!["Iced Latte", "Cold Brew"]);

    assert_eq!(
        env.metrics
            .menu_fallbacks_total
            .with_label_values(&["connection_failed"])
            .get(),
        2.0
    );
}

#[tokio::test]
async fn test_menu_falls_back_on_any_store_error() {
    let env = TestEnvironment::failing(FailingStore::new(|| RepositoryError::InvalidDocument {
        message: "corrupt".to_string(),
    }));

    let (status, body) = env.get("/api/menu?featured=no").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_names(&body), vec!["Avocado Toast", "Blueberry Muffin"]);
}

#[tokio::test]
async fn test_menu_without_store_serves_sample_data() {
    let env = TestEnvironment::without_store();

    let (status, body) = env.get("/api/menu?category=Smoothie").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(item_names(&body), vec!["Tropical Smoothie"]);
}

#[tokio::test]
async fn test_menu_rejects_invalid_featured_value() {
    let env = TestEnvironment::in_memory();

    let (status, body) = env.get("/api/menu?featured=maybe").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn test_inquiry_is_stored() {
    let env = TestEnvironment::in_memory();

    let (status, body) = env
        .post_json(
            "/api/inquiry",
            &json!({
                "name": "Noa",
                "email": "noa@example.com",
                "message": "Do you have oat milk?",
                "topic": "menu"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let id = body["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let store = env.memory_store.as_ref().unwrap();
    let stored = store
        .get_documents("inquiry", &DocumentFilter::new().with("id", id), None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["email"], "noa@example.com");
    assert!(stored[0].contains_key("created_at"));
}

#[tokio::test]
async fn test_inquiry_with_unusual_characters_is_stored() {
    let env = TestEnvironment::in_memory();
    let message = "hi\u{0007}there \u{200B}café 🌊";

    let (status, body) = env
        .post_json(
            "/api/inquiry",
            &json!({
                "name": "Kai",
                "email": "k@x.io",
                "message": message
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let id = body["id"].as_str().unwrap();

    let stored = env
        .memory_store
        .as_ref()
        .unwrap()
        .get_documents("inquiry", &DocumentFilter::new().with("id", id), None)
        .await
        .unwrap();
    assert_eq!(stored[0]["message"], message);
}

#[tokio::test]
async fn test_inquiry_acknowledged_when_store_unreachable() {
    let env = TestEnvironment::failing(FailingStore::unreachable());

    let (status, body) = env
        .post_json(
            "/api/inquiry",
            &json!({
                "name": "Noa",
                "email": "noa@example.com",
                "message": "Hello"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(
        env.metrics
            .inquiries_total
            .with_label_values(&["dropped"])
            .get(),
        1.0
    );
}

#[tokio::test]
async fn test_inquiry_validation_errors() {
    let env = TestEnvironment::in_memory();

    let (status, body) = env
        .post_json(
            "/api/inquiry",
            &json!({
                "name": "",
                "email": "noa@example.com",
                "message": "Hello"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed");
    assert!(body["timestamp"].is_string());

    let (status, _) = env
        .post_json(
            "/api/inquiry",
            &json!({
                "name": "Noa",
                "email": "noa@example.com",
                "message": "x".repeat(5001)
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(
        env.memory_store
            .as_ref()
            .unwrap()
            .document_count("inquiry")
            .await,
        0
    );
}

#[tokio::test]
async fn test_oversized_inquiry_rejected() {
    let env = TestEnvironment::in_memory();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/inquiry")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, (2 * 1024 * 1024).to_string())
        .body(Body::empty())
        .unwrap();
    let (status, body) = env.send(request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request too large");
}

#[tokio::test]
async fn test_landing_endpoints() {
    let env = TestEnvironment::without_store();

    let (status, body) = env.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Beachside Cafe backend is running"}));

    let (status, body) = env.get("/api/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Welcome to the Beachside Cafe API!"}));

    let (status, body) = env.get("/health/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_diagnostics_reports_store_state() {
    let env = TestEnvironment::without_store();
    let (status, body) = env.get("/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "❌ Not Available");
    assert_eq!(body["connection_status"], "Not Connected");

    let env = TestEnvironment::in_memory();
    env.get("/api/menu").await;
    let (_, body) = env.get("/test").await;
    assert_eq!(body["database"], "✅ Connected & Working");
    assert_eq!(body["collections"], json!(["menuitem"]));
    assert_eq!(body["database_name"], "✅ Set");
    assert_eq!(body["database_url"], "❌ Not Set");

    let env = TestEnvironment::failing(FailingStore::unreachable());
    let (status, body) = env.get("/test").await;
    assert_eq!(status, StatusCode::OK);
    let database = body["database"].as_str().unwrap();
    assert!(database.starts_with("⚠️  Connected but Error: "));
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let env = TestEnvironment::without_store();

    let response = tower::ServiceExt::oneshot(
        env.app.clone(),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_business_counters() {
    let env = TestEnvironment::failing(FailingStore::unreachable());
    env.get("/api/menu").await;

    let (status, body) = env.get("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    let text = match body {
        Value::String(text) => text,
        other => panic!("expected text exposition, got {}", other),
    };
    assert!(text.contains("menu_fallbacks_total{reason=\"connection_failed\"} 1"));
    assert!(text.contains("http_requests_total"));
}
