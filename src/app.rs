use axum::{extract::DefaultBodyLimit, middleware, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::{Config, ConfigError, StoreBackend};
use crate::handlers::{
    create_api_router, create_health_router, create_metrics_router, request_size_middleware,
    security_headers_middleware, MAX_REQUEST_SIZE,
};
use crate::models::{INQUIRY_COLLECTION, MENU_COLLECTION};
use crate::observability::{observability_middleware, Metrics};
use crate::repositories::{
    DocumentStore, DynamoDbDocumentStore, InMemoryDocumentStore, TableManager,
};
use crate::services::{DiagnosticsService, InquiryService, MenuService};

/// Services shared by the HTTP surface
#[derive(Clone)]
pub struct AppServices {
    pub menu_service: Arc<MenuService>,
    pub inquiry_service: Arc<InquiryService>,
    pub diagnostics: Arc<DiagnosticsService>,
    pub metrics: Arc<Metrics>,
}

impl AppServices {
    /// Wire every service to the same store handle
    pub fn new(
        store: Option<Arc<dyn DocumentStore>>,
        metrics: Arc<Metrics>,
        database_url_set: bool,
        database_name_set: bool,
    ) -> Self {
        Self {
            menu_service: Arc::new(MenuService::new(store.clone(), metrics.clone())),
            inquiry_service: Arc::new(InquiryService::new(store.clone(), metrics.clone())),
            diagnostics: Arc::new(DiagnosticsService::new(
                store,
                database_url_set,
                database_name_set,
            )),
            metrics,
        }
    }
}

/// Build the application router
pub fn create_app(services: AppServices) -> Router {
    let metrics_for_middleware = services.metrics.clone();

    create_metrics_router(services.metrics)
        .merge(create_health_router(services.diagnostics))
        .merge(create_api_router(
            services.menu_service,
            services.inquiry_service,
        ))
        // Last added runs first: observability wraps everything below it
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_size_middleware))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE as usize))
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}

/// Build the configured document store.
///
/// Returns `None` for the DynamoDB backend when no database name is set; the
/// service then answers from sample data.
pub async fn build_document_store(
    config: &Config,
) -> Result<Option<Arc<dyn DocumentStore>>, ConfigError> {
    let database_name = config.database.database_name();

    match config.store.backend()? {
        StoreBackend::Memory => {
            let name = database_name.unwrap_or("beachside");
            info!("Using in-memory document store '{}'", name);
            Ok(Some(Arc::new(InMemoryDocumentStore::new(name))))
        }
        StoreBackend::DynamoDb => {
            let Some(database_name) = database_name else {
                warn!("DATABASE_NAME not set, running without a document store");
                return Ok(None);
            };

            let client = Arc::new(config.database.dynamodb_client().await);
            let store = DynamoDbDocumentStore::new(
                client.clone(),
                database_name.to_string(),
                config.database.aws_region.clone(),
            );

            if config.store.create_collections {
                let tables = [MENU_COLLECTION, INQUIRY_COLLECTION]
                    .iter()
                    .map(|collection| store.table_name(collection))
                    .collect::<Vec<_>>();

                match TableManager::new(client).ensure_collection_tables(&tables).await {
                    Ok(created) => info!("Collection tables ready ({} created)", created),
                    Err(e) => warn!("Failed to create collection tables: {}", e),
                }
            }

            info!(
                "Using DynamoDB document store '{}' in {}",
                database_name, config.database.aws_region
            );
            Ok(Some(Arc::new(store)))
        }
    }
}
