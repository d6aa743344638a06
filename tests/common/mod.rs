#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use beachside_cafe::{
    create_app,
    models::{Document, DocumentFilter, RepositoryError, RepositoryResult},
    observability::Metrics,
    repositories::{DocumentStore, InMemoryDocumentStore},
    AppServices,
};
use serde_json::Value;
use tower::ServiceExt;

/// Store whose every operation fails the same way
pub struct FailingStore {
    error: fn() -> RepositoryError,
}

impl FailingStore {
    pub fn new(error: fn() -> RepositoryError) -> Self {
        Self { error }
    }

    pub fn unreachable() -> Self {
        Self::new(|| RepositoryError::ConnectionFailed)
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn name(&self) -> String {
        "failing".to_string()
    }

    async fn create_document(&self, _collection: &str, _document: Document) -> RepositoryResult<String> {
        Err((self.error)())
    }

    async fn put_document_if_absent(
        &self,
        _collection: &str,
        _id: &str,
        _document: Document,
    ) -> RepositoryResult<bool> {
        Err((self.error)())
    }

    async fn get_documents(
        &self,
        _collection: &str,
        _filter: &DocumentFilter,
        _limit: Option<usize>,
    ) -> RepositoryResult<Vec<Document>> {
        Err((self.error)())
    }

    async fn list_collection_names(&self) -> RepositoryResult<Vec<String>> {
        Err((self.error)())
    }
}

/// Router plus the handles a test needs to inspect side effects
pub struct TestEnvironment {
    pub app: Router,
    pub metrics: Arc<Metrics>,
    pub memory_store: Option<Arc<InMemoryDocumentStore>>,
}

impl TestEnvironment {
    /// Router over an empty in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new("cafe-test"));
        let mut env = Self::with_store(Some(store.clone()));
        env.memory_store = Some(store);
        env
    }

    /// Router over a store that fails every call
    pub fn failing(store: FailingStore) -> Self {
        Self::with_store(Some(Arc::new(store)))
    }

    /// Router with no store configured
    pub fn without_store() -> Self {
        Self::with_store(None)
    }

    fn with_store(store: Option<Arc<dyn DocumentStore>>) -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics registry"));
        let configured = store.is_some();
        let services = AppServices::new(store, metrics.clone(), false, configured);

        Self {
            app: create_app(services),
            metrics,
            memory_store: None,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };
        (status, value)
    }
}

pub fn item_names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("menu response is an array")
        .iter()
        .filter_map(|item| item["name"].as_str().map(str::to_string))
        .collect()
}
