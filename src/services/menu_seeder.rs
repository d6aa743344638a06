use std::sync::Arc;
use tracing::{debug, instrument};

use crate::models::{sample_menu, DocumentFilter, MENU_COLLECTION};
use crate::observability::{DatabaseTracingMiddleware, Metrics};
use crate::repositories::DocumentStore;

/// Result of a seeding attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Storage was absent or its emptiness check failed
    Skipped,
    /// The menu collection already held at least one item
    AlreadySeeded,
    Seeded {
        created: usize,
        existing: usize,
        failed: usize,
    },
}

/// Writes the sample menu into an empty menu collection
pub struct MenuSeeder {
    store: Option<Arc<dyn DocumentStore>>,
    metrics: Arc<Metrics>,
    db_tracer: DatabaseTracingMiddleware,
}

impl MenuSeeder {
    pub fn new(store: Option<Arc<dyn DocumentStore>>, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            db_tracer: DatabaseTracingMiddleware::new(metrics.clone()),
            metrics,
        }
    }

    /// Seed the menu collection if it is empty.
    ///
    /// Each item is written with a conditional put under its deterministic
    /// id, so concurrent seeders never store an item twice. A failed write
    /// does not stop the remaining items from being attempted.
    #[instrument(skip(self))]
    pub async fn ensure_menu_seeded(&self) -> SeedOutcome {
        let store = match self.store {
            Some(ref store) => store,
            None => {
                debug!("No document store configured, skipping menu seeding");
                return SeedOutcome::Skipped;
            }
        };

        let probe = self
            .db_tracer
            .trace_operation(
                "get_documents",
                MENU_COLLECTION,
                store.get_documents(MENU_COLLECTION, &DocumentFilter::new(), Some(1)),
            )
            .await;

        match probe {
            Ok(documents) if !documents.is_empty() => return SeedOutcome::AlreadySeeded,
            Ok(_) => {}
            Err(e) => {
                crate::warn_with_trace!(
                    error_kind = e.kind(),
                    error = %e,
                    "Menu emptiness check failed, skipping seeding"
                );
                return SeedOutcome::Skipped;
            }
        }

        crate::info_with_trace!("Menu collection is empty, seeding sample menu");

        let (mut created, mut existing, mut failed) = (0, 0, 0);

        for item in sample_menu() {
            let id = item.document_id();

            let document = match item.to_document() {
                Ok(document) => document,
                Err(e) => {
                    crate::error_with_trace!(item_id = %id, error = %e, "Failed to build seed document");
                    self.metrics.record_seed_write("failed");
                    failed += 1;
                    continue;
                }
            };

            let written = self
                .db_tracer
                .trace_operation(
                    "put_document_if_absent",
                    MENU_COLLECTION,
                    store.put_document_if_absent(MENU_COLLECTION, &id, document),
                )
                .await;

            match written {
                Ok(true) => {
                    self.metrics.record_seed_write("created");
                    created += 1;
                }
                Ok(false) => {
                    debug!(item_id = %id, "Seed item already present");
                    self.metrics.record_seed_write("existing");
                    existing += 1;
                }
                Err(e) => {
                    crate::error_with_trace!(
                        item_id = %id,
                        error_kind = e.kind(),
                        error = %e,
                        "Failed to write seed item"
                    );
                    self.metrics.record_seed_write("failed");
                    failed += 1;
                }
            }
        }

        crate::info_with_trace!(created, existing, failed, "Menu seeding finished");

        SeedOutcome::Seeded {
            created,
            existing,
            failed,
        }
    }
}
