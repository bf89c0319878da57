//! Submission Store Integration Tests

use std::sync::Arc;

use serde_json::Value;
use shadowlib::store::{parse_tags, DocumentStore, Filter, SubmissionStatus, ValidationError};
use shadowlib::{ContentCategory, MemoryStore, SqliteStore, SubmissionDraft, SubmissionStore};
use tempfile::TempDir;

fn draft(author_id: &str) -> SubmissionDraft {
    SubmissionDraft {
        title: "Token Budget Trick".to_string(),
        description: "Asking the model to reason about its own context window".to_string(),
        content: "# Token budget\n\n## Setup\n\nText\n\n## Result\n\nText".to_string(),
        category: ContentCategory::Technique,
        tags: parse_tags("context, tokens, context"),
        author: "  ".to_string(),
        author_id: author_id.to_string(),
    }
}

#[tokio::test]
async fn test_submit_returns_id_and_stores_pending() {
    let backend = Arc::new(MemoryStore::new());
    let store = SubmissionStore::new(backend.clone());

    let id = store.submit(draft("42")).await.unwrap();
    assert!(!id.is_empty());

    let raw = backend
        .find_one("submissions", &Filter::new().eq("_id", id.as_str()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw.get("status"), Some(&Value::from("pending")));
    assert_eq!(raw.get("authorId"), Some(&Value::from("42")));
    assert_eq!(raw.get("author"), Some(&Value::from("Anonymous")));
    assert!(raw.get("createdAt").and_then(Value::as_str).is_some());

    let mine = store.user_submissions("42").await;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].status, SubmissionStatus::Pending);
    assert_eq!(mine[0].tags, vec!["context", "tokens"]);
}

#[tokio::test]
async fn test_submissions_survive_sqlite_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("library.db");

    let first = SubmissionStore::new(Arc::new(SqliteStore::open(&path).unwrap()));
    let a = first.submit(draft("42")).await.unwrap();
    let b = first.submit(draft("42")).await.unwrap();
    first.submit(draft("7")).await.unwrap();
    assert_ne!(a, b);
    drop(first);

    let second = SubmissionStore::new(Arc::new(SqliteStore::open(&path).unwrap()));
    let ids: Vec<String> = second
        .user_submissions("42")
        .await
        .into_iter()
        .filter_map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![a, b]);
}

#[tokio::test]
async fn test_invalid_draft_is_not_stored() {
    let backend = Arc::new(MemoryStore::new());
    let store = SubmissionStore::new(backend.clone());

    let mut long = draft("42");
    long.description = "d".repeat(250);
    assert_eq!(
        long.validate(),
        Err(ValidationError::DescriptionTooLong { len: 250, max: 200 })
    );
    assert_eq!(store.submit(long).await, None);
    assert_eq!(backend.count("submissions").await, 0);
}
