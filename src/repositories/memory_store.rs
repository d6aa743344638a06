use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::document_store::{stamp_document, DocumentStore};
use crate::models::{Document, DocumentFilter, RepositoryResult};

/// Process-local document store.
///
/// Documents keep their insertion order within a collection.
pub struct InMemoryDocumentStore {
    name: String,
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents stored in a collection
    pub async fn document_count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map(Vec::len).unwrap_or(0)
    }
}

fn has_id(document: &Document, id: &str) -> bool {
    document.get("id").and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn name(&self) -> String {
        self.name.clone()
    }

    #[instrument(skip(self, document))]
    async fn create_document(&self, collection: &str, document: Document) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();
        let document = stamp_document(document, &id);

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);

        debug!(id = %id, "Document created");
        Ok(id)
    }

    #[instrument(skip(self, document))]
    async fn put_document_if_absent(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> RepositoryResult<bool> {
        // Check and insert under one write lock
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents.iter().any(|existing| has_id(existing, id)) {
            debug!("Document already exists");
            return Ok(false);
        }

        documents.push(stamp_document(document, id));
        debug!("Document written");
        Ok(true)
    }

    #[instrument(skip(self, filter))]
    async fn get_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let documents = match collections.get(collection) {
            Some(documents) => documents,
            None => return Ok(Vec::new()),
        };

        let matching = documents
            .iter()
            .filter(|document| filter.matches(document))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(matching)
    }

    async fn list_collection_names(&self) -> RepositoryResult<Vec<String>> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
