use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    Inquiry, InquiryAck, InquiryRequest, RepositoryError, RepositoryResult, INQUIRY_COLLECTION,
};
use crate::observability::{DatabaseTracingMiddleware, Metrics};
use crate::repositories::DocumentStore;

/// Persists contact-form submissions
pub struct InquiryService {
    store: Option<Arc<dyn DocumentStore>>,
    metrics: Arc<Metrics>,
    db_tracer: DatabaseTracingMiddleware,
}

impl InquiryService {
    pub fn new(store: Option<Arc<dyn DocumentStore>>, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            db_tracer: DatabaseTracingMiddleware::new(metrics.clone()),
            metrics,
        }
    }

    /// Store an already validated inquiry.
    ///
    /// The submitter always gets an acknowledgement; the id is only present
    /// when the inquiry was persisted. Failed writes are logged and counted
    /// but not retried.
    #[instrument(skip(self, request), fields(topic = ?request.topic))]
    pub async fn submit_inquiry(&self, request: InquiryRequest) -> InquiryAck {
        let inquiry = Inquiry::new(request);

        match self.persist(&inquiry).await {
            Ok(id) => {
                crate::info_with_trace!(inquiry_id = %id, "Inquiry stored");
                self.metrics.record_inquiry("stored");
                InquiryAck::stored(id)
            }
            Err(e) => {
                // No personal data in this log line
                crate::error_with_trace!(
                    error_kind = e.kind(),
                    error = %e,
                    topic = ?inquiry.topic,
                    "Failed to store inquiry"
                );
                self.metrics.record_inquiry("dropped");
                InquiryAck::received()
            }
        }
    }

    async fn persist(&self, inquiry: &Inquiry) -> RepositoryResult<String> {
        let store = self.store.as_ref().ok_or(RepositoryError::ConnectionFailed)?;

        self.db_tracer
            .trace_operation(
                "create_document",
                INQUIRY_COLLECTION,
                store.create_document(INQUIRY_COLLECTION, inquiry.to_document()),
            )
            .await
    }
}
