use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A schema-less record as held by the document store
pub type Document = Map<String, Value>;

/// Equality filter applied to documents of a collection.
///
/// Every condition must hold for a document to match; an empty filter matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    conditions: BTreeMap<String, Value>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition, replacing any previous one on the same field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.conditions.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.conditions.iter()
    }

    /// Check a document against all conditions
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}
