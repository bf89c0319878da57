//! In-memory document store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{new_document_id, Document, DocumentStore, Filter, StoreError, ID_FIELD};

/// Process-local store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)).cloned()))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let id = new_document_id();
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc);

        Ok(id)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        match docs.iter().position(|d| filter.matches(d)) {
            Some(pos) => {
                docs.remove(pos);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_find_delete() {
        let store = MemoryStore::new();

        let id = store
            .insert_one("things", doc(json!({"kind": "a", "n": 1})))
            .await
            .unwrap();
        store.insert_one("things", doc(json!({"kind": "b", "n": 2}))).await.unwrap();
        store.insert_one("things", doc(json!({"kind": "a", "n": 3}))).await.unwrap();

        let found = store.find_one("things", &Filter::new().eq("kind", "a")).await.unwrap().unwrap();
        assert_eq!(found["n"], 1);
        assert_eq!(found[ID_FIELD], json!(id));

        let all_a = store.find("things", &Filter::new().eq("kind", "a")).await.unwrap();
        assert_eq!(all_a.len(), 2);

        let deleted = store.delete_one("things", &Filter::new().eq("kind", "a")).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.count("things").await, 2);

        let remaining = store.find("things", &Filter::new().eq("kind", "a")).await.unwrap();
        assert_eq!(remaining[0]["n"], 3);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.find("nothing", &Filter::new()).await.unwrap().is_empty());
        assert!(store.find_one("nothing", &Filter::new()).await.unwrap().is_none());
        assert_eq!(store.delete_one("nothing", &Filter::new()).await.unwrap(), 0);
    }
}
