//! Document store and the record stores built on top of it.
//!
//! The document store is a schemaless collection-of-JSON-objects service with
//! find/insert/delete. [`BookmarkStore`] and [`SubmissionStore`] wrap it and
//! convert every store failure into a plain `false`/`None`/empty value, so
//! callers never have to handle store errors.
//!
//! Backends:
//! - [`MemoryStore`]: process-local, for tests and throwaway sessions
//! - [`SqliteStore`]: one SQLite table of JSON documents

pub mod bookmarks;
pub mod memory;
pub mod sqlite;
pub mod submissions;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use bookmarks::{Bookmark, BookmarkStore};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use submissions::{
    parse_tags, Submission, SubmissionDraft, SubmissionStatus, SubmissionStore, ValidationError,
};

/// Field holding the generated document id
pub const ID_FIELD: &str = "_id";

/// A stored JSON object
pub type Document = Map<String, Value>;

/// Errors raised inside the document store layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document is not a JSON object")]
    NotAnObject,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Equality filter over top-level document fields.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    /// Whether every condition holds for `doc`
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }
}

/// Schemaless collection store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// First matching document in insertion order
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError>;

    /// All matching documents in insertion order
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Insert a document and return its generated id
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String, StoreError>;

    /// Delete the first matching document; returns the number deleted (0 or 1)
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

/// Serialize a record into a document
pub(crate) fn to_document<T: serde::Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Generate a fresh document id
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Shared handle to a store backend
pub type SharedStore = Arc<dyn DocumentStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_filter_matches_all_conditions() {
        let d = doc(json!({"userId": "u1", "contentId": "c1"}));

        assert!(Filter::new().matches(&d));
        assert!(Filter::new().eq("userId", "u1").matches(&d));
        assert!(Filter::new().eq("userId", "u1").eq("contentId", "c1").matches(&d));
        assert!(!Filter::new().eq("userId", "u1").eq("contentId", "c2").matches(&d));
        assert!(!Filter::new().eq("missing", "x").matches(&d));
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(to_document(&json!({"a": 1})).is_ok());
        assert!(matches!(to_document(&json!([1, 2])), Err(StoreError::NotAnObject)));
    }
}
