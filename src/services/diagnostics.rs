use std::sync::Arc;
use tracing::{instrument, warn};

use crate::models::DatabaseDiagnostics;
use crate::repositories::DocumentStore;

/// Builds the availability report served at `/test`
pub struct DiagnosticsService {
    store: Option<Arc<dyn DocumentStore>>,
    database_url_set: bool,
    database_name_set: bool,
}

impl DiagnosticsService {
    pub fn new(
        store: Option<Arc<dyn DocumentStore>>,
        database_url_set: bool,
        database_name_set: bool,
    ) -> Self {
        Self {
            store,
            database_url_set,
            database_name_set,
        }
    }

    #[instrument(skip(self))]
    pub async fn report(&self) -> DatabaseDiagnostics {
        let report = DatabaseDiagnostics::disconnected(self.database_url_set, self.database_name_set);

        let store = match self.store {
            Some(ref store) => store,
            None => return report,
        };

        match store.list_collection_names().await {
            Ok(collections) => report.connected(collections),
            Err(e) => {
                warn!(database = %store.name(), error = %e, "Listing collections failed");
                report.connected_with_error(&e.to_string())
            }
        }
    }
}
