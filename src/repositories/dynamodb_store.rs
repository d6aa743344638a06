use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::RequestId;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use aws_sdk_dynamodb::{Client as DynamoDbClient, Error as DynamoDbError};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn, Instrument};
use uuid::Uuid;

use super::document_store::{stamp_document, DocumentStore};
use crate::models::{Document, DocumentFilter, RepositoryError, RepositoryResult};

/// DynamoDB implementation of the DocumentStore trait.
///
/// Each collection maps to its own table named `{database_name}_{collection}`
/// with a string hash key `id`.
pub struct DynamoDbDocumentStore {
    client: Arc<DynamoDbClient>,
    database_name: String,
    region: String,
}

impl DynamoDbDocumentStore {
    /// Create a new DynamoDB document store
    pub fn new(client: Arc<DynamoDbClient>, database_name: String, region: String) -> Self {
        Self {
            client,
            database_name,
            region,
        }
    }

    /// Table backing a collection
    pub fn table_name(&self, collection: &str) -> String {
        format!("{}_{}", self.database_name, collection)
    }

    /// Collection name for a table of this database, if it belongs to it
    pub fn collection_name<'a>(&self, table_name: &'a str) -> Option<&'a str> {
        table_name
            .strip_prefix(&self.database_name)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|collection| !collection.is_empty())
    }

    /// Create a DynamoDB client span with X-Ray friendly attributes
    fn create_dynamodb_span(&self, operation: &str, table_name: &str) -> tracing::Span {
        tracing::info_span!(
            "DynamoDB",
            "aws.service" = "DynamoDB",
            "aws.operation" = operation,
            "aws.region" = %self.region,
            "aws.dynamodb.table_name" = %table_name,
            "aws.request_id" = tracing::field::Empty,
            "aws.remote.service" = "AWS::DynamoDB",
            "aws.remote.operation" = operation,
            "otel.kind" = "client",
            "otel.name" = format!("DynamoDB.{}", operation),
            "rpc.system" = "aws-api",
            "rpc.method" = operation,
            "db.system" = "dynamodb",
            "db.name" = %self.database_name,
            "db.operation" = operation,
        )
    }

    /// Convert a document to DynamoDB attribute values
    pub fn document_to_item(&self, document: &Document) -> HashMap<String, AttributeValue> {
        document
            .iter()
            .map(|(key, value)| (key.clone(), value_to_attribute(value)))
            .collect()
    }

    /// Convert a DynamoDB item to a document
    pub fn item_to_document(
        &self,
        item: &HashMap<String, AttributeValue>,
    ) -> RepositoryResult<Document> {
        item.iter()
            .map(|(key, attribute)| Ok((key.clone(), attribute_to_value(attribute)?)))
            .collect()
    }

    /// Build the scan filter expression for an equality filter
    fn filter_expression(
        &self,
        filter: &DocumentFilter,
    ) -> (
        String,
        HashMap<String, String>,
        HashMap<String, AttributeValue>,
    ) {
        let mut expressions = Vec::with_capacity(filter.len());
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        for (index, (field, value)) in filter.iter().enumerate() {
            let name_placeholder = format!("#f{}", index);
            let value_placeholder = format!(":v{}", index);
            expressions.push(format!("{} = {}", name_placeholder, value_placeholder));
            names.insert(name_placeholder, field.clone());
            values.insert(value_placeholder, value_to_attribute(value));
        }

        (expressions.join(" AND "), names, values)
    }

    /// Convert an SDK error, keeping transport-level failures distinct
    fn map_sdk_error<E, R>(&self, table_name: &str, error: SdkError<E, R>) -> RepositoryError
    where
        DynamoDbError: From<SdkError<E, R>>,
    {
        match &error {
            SdkError::TimeoutError(_) => {
                warn!("DynamoDB request timed out");
                return RepositoryError::Timeout;
            }
            SdkError::DispatchFailure(_) => {
                warn!("DynamoDB request could not be dispatched");
                return RepositoryError::ConnectionFailed;
            }
            _ => {}
        }
        self.map_dynamodb_error(table_name, error.into())
    }

    /// Convert DynamoDB error to RepositoryError
    fn map_dynamodb_error(&self, table_name: &str, error: DynamoDbError) -> RepositoryError {
        match error {
            DynamoDbError::ConditionalCheckFailedException(_) => {
                RepositoryError::ConditionalCheckFailed
            }
            DynamoDbError::ResourceNotFoundException(e) => {
                error!("DynamoDB table not found: {}", e);
                RepositoryError::TableNotFound {
                    table_name: table_name.to_string(),
                }
            }
            DynamoDbError::ProvisionedThroughputExceededException(_)
            | DynamoDbError::RequestLimitExceeded(_) => RepositoryError::RateLimitExceeded,
            other => {
                error!("DynamoDB error: {:?}", other);
                RepositoryError::AwsSdk {
                    message: other.to_string(),
                }
            }
        }
    }

    async fn put_item(
        &self,
        table_name: &str,
        item: HashMap<String, AttributeValue>,
    ) -> RepositoryResult<()> {
        let put_span = self.create_dynamodb_span("PutItem", table_name);

        async {
            let result = self
                .client
                .put_item()
                .table_name(table_name)
                .set_item(Some(item))
                .condition_expression("attribute_not_exists(id)")
                .send()
                .await;

            match &result {
                Ok(output) => {
                    if let Some(request_id) = output.request_id() {
                        tracing::Span::current().record("aws.request_id", request_id);
                    }
                }
                Err(e) => {
                    warn!("DynamoDB PutItem failed: {}", e);
                }
            }

            result.map(|_| ()).map_err(|e| self.map_sdk_error(table_name, e))
        }
        .instrument(put_span)
        .await
    }
}

#[async_trait]
impl DocumentStore for DynamoDbDocumentStore {
    fn name(&self) -> String {
        self.database_name.clone()
    }

    #[instrument(skip(self, document), fields(database = %self.database_name))]
    async fn create_document(&self, collection: &str, document: Document) -> RepositoryResult<String> {
        info!("Creating document");

        let id = Uuid::new_v4().to_string();
        let document = stamp_document(document, &id);
        let table_name = self.table_name(collection);

        self.put_item(&table_name, self.document_to_item(&document))
            .await?;

        info!(id = %id, "Document created successfully");
        Ok(id)
    }

    #[instrument(skip(self, document), fields(database = %self.database_name))]
    async fn put_document_if_absent(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> RepositoryResult<bool> {
        let document = stamp_document(document, id);
        let table_name = self.table_name(collection);

        match self
            .put_item(&table_name, self.document_to_item(&document))
            .await
        {
            Ok(()) => {
                info!("Document written");
                Ok(true)
            }
            Err(RepositoryError::ConditionalCheckFailed) => {
                info!("Document already exists");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, filter), fields(database = %self.database_name, conditions = filter.len()))]
    async fn get_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Document>> {
        let table_name = self.table_name(collection);
        let scan_span = self.create_dynamodb_span("Scan", &table_name);

        async {
            let mut documents = Vec::new();
            let mut exclusive_start_key = None;

            loop {
                let mut scan_builder = self
                    .client
                    .scan()
                    .table_name(&table_name)
                    .select(Select::AllAttributes)
                    .set_exclusive_start_key(exclusive_start_key.take());

                if !filter.is_empty() {
                    let (expression, names, values) = self.filter_expression(filter);
                    scan_builder = scan_builder
                        .filter_expression(expression)
                        .set_expression_attribute_names(Some(names))
                        .set_expression_attribute_values(Some(values));
                } else if let Some(limit) = limit {
                    // Scan limits count evaluated items, so only apply one when nothing is filtered out
                    scan_builder = scan_builder.limit(i32::try_from(limit).unwrap_or(i32::MAX));
                }

                let response = scan_builder
                    .send()
                    .await
                    .map_err(|e| self.map_sdk_error(&table_name, e))?;

                if let Some(items) = response.items {
                    for item in items {
                        match self.item_to_document(&item) {
                            Ok(document) => documents.push(document),
                            Err(e) => {
                                warn!("Failed to parse document: {}", e);
                                continue;
                            }
                        }
                    }
                }

                if let Some(limit) = limit {
                    if documents.len() >= limit {
                        documents.truncate(limit);
                        break;
                    }
                }

                match response.last_evaluated_key {
                    Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                    _ => break,
                }
            }

            info!("Found {} documents in {}", documents.len(), table_name);
            Ok(documents)
        }
        .instrument(scan_span)
        .await
    }

    #[instrument(skip(self), fields(database = %self.database_name))]
    async fn list_collection_names(&self) -> RepositoryResult<Vec<String>> {
        let mut collections = Vec::new();
        let mut exclusive_start_table_name: Option<String> = None;

        loop {
            let response = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(exclusive_start_table_name.take())
                .send()
                .await
                .map_err(|e| self.map_sdk_error(&self.database_name, e))?;

            for table_name in response.table_names.unwrap_or_default() {
                if let Some(collection) = self.collection_name(&table_name) {
                    collections.push(collection.to_string());
                }
            }

            match response.last_evaluated_table_name {
                Some(name) => exclusive_start_table_name = Some(name),
                None => break,
            }
        }

        info!("Found {} collections", collections.len());
        Ok(collections)
    }
}

/// Convert a JSON value into a DynamoDB attribute
pub fn value_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(value_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(key, value)| (key.clone(), value_to_attribute(value)))
                .collect(),
        ),
    }
}

/// Convert a DynamoDB attribute into a JSON value
pub fn attribute_to_value(attribute: &AttributeValue) -> RepositoryResult<Value> {
    match attribute {
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::L(items) => items
            .iter()
            .map(attribute_to_value)
            .collect::<RepositoryResult<Vec<_>>>()
            .map(Value::Array),
        AttributeValue::M(map) => map
            .iter()
            .map(|(key, attribute)| Ok((key.clone(), attribute_to_value(attribute)?)))
            .collect::<RepositoryResult<Map<String, Value>>>()
            .map(Value::Object),
        AttributeValue::Ss(items) => Ok(Value::Array(
            items.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(items) => items
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<RepositoryResult<Vec<_>>>()
            .map(Value::Array),
        other => Err(RepositoryError::InvalidDocument {
            message: format!("Unsupported attribute type: {:?}", other),
        }),
    }
}

fn parse_number(raw: &str) -> RepositoryResult<Number> {
    raw.parse().map_err(|_| RepositoryError::InvalidDocument {
        message: format!("Invalid number: {}", raw),
    })
}
