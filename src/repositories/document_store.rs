use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::models::{Document, DocumentFilter, RepositoryResult};

/// Trait defining the interface for document store access
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the database backing this store
    fn name(&self) -> String;

    /// Insert a new document under a generated id and return that id
    async fn create_document(&self, collection: &str, document: Document) -> RepositoryResult<String>;

    /// Insert a document under a caller-chosen id unless one already exists.
    ///
    /// Returns `true` when the document was written, `false` when the id was
    /// already taken. Concurrent callers racing on the same id converge on a
    /// single stored document.
    async fn put_document_if_absent(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> RepositoryResult<bool>;

    /// Fetch documents matching every condition of `filter`, up to `limit`
    async fn get_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Document>>;

    /// Names of the collections present in the database
    async fn list_collection_names(&self) -> RepositoryResult<Vec<String>>;
}

/// Add the id and bookkeeping timestamps every stored document carries
pub fn stamp_document(mut document: Document, id: &str) -> Document {
    let now = Utc::now().to_rfc3339();
    document.insert("id".to_string(), Value::String(id.to_string()));
    document.insert("created_at".to_string(), Value::String(now.clone()));
    document.insert("updated_at".to_string(), Value::String(now));
    document
}
