// Repositories module - document store access layer

pub mod document_store;
pub mod dynamodb_store;
pub mod memory_store;
pub mod table_manager;

pub use document_store::{stamp_document, DocumentStore};
pub use dynamodb_store::DynamoDbDocumentStore;
pub use memory_store::InMemoryDocumentStore;
pub use table_manager::TableManager;
