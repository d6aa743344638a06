use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::{
    sample_menu, MenuFilter, MenuItem, MenuItemOut, RepositoryError, RepositoryResult,
    MENU_COLLECTION,
};
use crate::observability::{DatabaseTracingMiddleware, Metrics};
use crate::repositories::DocumentStore;
use crate::services::MenuSeeder;

/// Answers menu queries from storage, or from the sample menu when storage fails
pub struct MenuService {
    store: Option<Arc<dyn DocumentStore>>,
    seeder: MenuSeeder,
    metrics: Arc<Metrics>,
    db_tracer: DatabaseTracingMiddleware,
}

impl MenuService {
    pub fn new(store: Option<Arc<dyn DocumentStore>>, metrics: Arc<Metrics>) -> Self {
        Self {
            seeder: MenuSeeder::new(store.clone(), metrics.clone()),
            db_tracer: DatabaseTracingMiddleware::new(metrics.clone()),
            store,
            metrics,
        }
    }

    /// List menu items matching the filter.
    ///
    /// Never fails: any store error is answered with the sample menu,
    /// filtered the same way. An empty result from a healthy store is
    /// returned as is.
    #[instrument(skip(self), fields(category = ?filter.category, featured = ?filter.featured))]
    pub async fn get_menu(&self, filter: MenuFilter) -> Vec<MenuItemOut> {
        let outcome = self.seeder.ensure_menu_seeded().await;
        debug!(?outcome, "Menu seed check complete");

        match self.query_store(&filter).await {
            Ok(items) => {
                self.metrics.record_menu_request("store");
                crate::info_with_trace!("Found {} menu items", items.len());
                items
            }
            Err(e) => self.fallback(&filter, &e),
        }
    }

    async fn query_store(&self, filter: &MenuFilter) -> RepositoryResult<Vec<MenuItemOut>> {
        let store = self.store.as_ref().ok_or(RepositoryError::ConnectionFailed)?;

        let documents = self
            .db_tracer
            .trace_operation(
                "get_documents",
                MENU_COLLECTION,
                store.get_documents(MENU_COLLECTION, &filter.to_document_filter(), None),
            )
            .await?;

        let items = documents
            .iter()
            .filter_map(|document| match MenuItemOut::from_document(document) {
                Ok(item) => Some(item),
                Err(e) => {
                    crate::warn_with_trace!(
                        document_id = ?document.get("id"),
                        error = %e,
                        "Skipping malformed menu record"
                    );
                    None
                }
            })
            .collect();

        Ok(items)
    }

    fn fallback(&self, filter: &MenuFilter, error: &RepositoryError) -> Vec<MenuItemOut> {
        if error.is_unavailable() {
            crate::warn_with_trace!(
                error_kind = error.kind(),
                error = %error,
                "Menu storage unavailable, serving sample menu"
            );
        } else {
            crate::error_with_trace!(
                error_kind = error.kind(),
                error = %error,
                "Menu query failed, serving sample menu"
            );
        }

        self.metrics.record_menu_request("fallback");
        self.metrics.record_menu_fallback(error.kind());

        fallback_menu(filter)
    }
}

/// Sample menu filtered in memory, in declaration order
pub fn fallback_menu(filter: &MenuFilter) -> Vec<MenuItemOut> {
    sample_menu()
        .iter()
        .filter(|item| item.matches_filter(filter))
        .map(MenuItem::to_response)
        .collect()
}
