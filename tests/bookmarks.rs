//! Bookmark Store Integration Tests
//!
//! Bookmark semantics over both store backends, and degradation when the
//! backing store fails.

use std::sync::Arc;

use async_trait::async_trait;
use shadowlib::store::{Document, DocumentStore, Filter, SharedStore, StoreError};
use shadowlib::{BookmarkStore, MemoryStore, SqliteStore};
use tempfile::TempDir;

/// Store whose every call fails
struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn find_one(&self, _collection: &str, _filter: &Filter) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find(&self, _collection: &str, _filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn insert_one(&self, _collection: &str, _doc: Document) -> Result<String, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete_one(&self, _collection: &str, _filter: &Filter) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

async fn assert_add_twice(store: SharedStore) {
    let bookmarks = BookmarkStore::new(store);

    assert!(bookmarks.add("u1", "c1").await);
    assert!(!bookmarks.add("u1", "c1").await);

    let ids = bookmarks.user_bookmarks("u1").await;
    assert_eq!(ids.iter().filter(|id| *id == "c1").count(), 1);
    assert!(bookmarks.is_bookmarked("u1", "c1").await);
}

#[tokio::test]
async fn test_add_twice_memory() {
    assert_add_twice(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_add_twice_sqlite() {
    let temp = TempDir::new().unwrap();
    let store = SqliteStore::open(temp.path().join("library.db")).unwrap();
    assert_add_twice(Arc::new(store)).await;
}

#[tokio::test]
async fn test_bookmarks_persist_across_sqlite_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("library.db");

    {
        let bookmarks = BookmarkStore::new(Arc::new(SqliteStore::open(&path).unwrap()));
        assert!(bookmarks.add("u1", "4").await);
        assert!(bookmarks.add("u1", "1").await);
    }

    let bookmarks = BookmarkStore::new(Arc::new(SqliteStore::open(&path).unwrap()));
    assert_eq!(bookmarks.user_bookmarks("u1").await, vec!["4", "1"]);
    assert!(bookmarks.remove("u1", "4").await);
    assert_eq!(bookmarks.user_bookmarks("u1").await, vec!["1"]);
}

#[tokio::test]
async fn test_toggle_round_trip() {
    let bookmarks = BookmarkStore::new(Arc::new(MemoryStore::new()));

    assert_eq!(bookmarks.toggle("u1", "c1").await, Some(true));
    assert!(bookmarks.is_bookmarked("u1", "c1").await);
    assert_eq!(bookmarks.toggle("u1", "c1").await, Some(false));
    assert!(!bookmarks.is_bookmarked("u1", "c1").await);
}

#[tokio::test]
async fn test_failing_store_degrades_to_defaults() {
    let bookmarks = BookmarkStore::new(Arc::new(FailingStore));

    assert!(!bookmarks.add("u1", "c1").await);
    assert!(!bookmarks.remove("u1", "c1").await);
    assert!(!bookmarks.is_bookmarked("u1", "c1").await);
    assert!(bookmarks.user_bookmarks("u1").await.is_empty());
    assert_eq!(bookmarks.toggle("u1", "c1").await, None);
}

#[tokio::test]
async fn test_empty_user_gets_nothing() {
    let bookmarks = BookmarkStore::new(Arc::new(MemoryStore::new()));

    assert!(!bookmarks.add("", "c1").await);
    assert!(bookmarks.user_bookmarks("").await.is_empty());
}
