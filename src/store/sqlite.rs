//! SQLite-backed document store.
//!
//! All collections share one table. Bodies are JSON text and filters are
//! evaluated in Rust after loading a collection, which is fine at library
//! scale. Queries run on tokio's blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::Value;

use super::{new_document_id, Document, DocumentStore, Filter, StoreError, ID_FIELD};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT    NOT NULL UNIQUE,
    collection TEXT    NOT NULL,
    body       TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection, seq);
";

/// Document store persisted in a SQLite file
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Unavailable(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

/// Documents of a collection with their ids, in insertion order
fn load_collection(conn: &Connection, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY seq")?;
    let rows = stmt.query_map(params![collection], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut docs = Vec::new();
    for row in rows {
        let (id, body) = row?;
        let doc: Document = serde_json::from_str(&body)?;
        docs.push((id, doc));
    }
    Ok(docs)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn(move |conn| {
            Ok(load_collection(conn, &collection)?
                .into_iter()
                .map(|(_, doc)| doc)
                .find(|doc| filter.matches(doc)))
        })
        .await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn(move |conn| {
            Ok(load_collection(conn, &collection)?
                .into_iter()
                .map(|(_, doc)| doc)
                .filter(|doc| filter.matches(doc))
                .collect())
        })
        .await
    }

    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<String, StoreError> {
        let collection = collection.to_string();
        let id = new_document_id();
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        let body = serde_json::to_string(&doc)?;

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3)",
                params![id, collection, body],
            )?;
            Ok(id)
        })
        .await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let target = load_collection(conn, &collection)?
                .into_iter()
                .find(|(_, doc)| filter.matches(doc))
                .map(|(id, _)| id);

            match target {
                Some(id) => {
                    let deleted = conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
                    Ok(deleted as u64)
                }
                None => Ok(0),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_one("a", doc(json!({"x": 1}))).await.unwrap();
        store.insert_one("b", doc(json!({"x": 1}))).await.unwrap();

        assert_eq!(store.find("a", &Filter::new()).await.unwrap().len(), 1);
        assert_eq!(store.delete_one("a", &Filter::new().eq("x", 1)).await.unwrap(), 1);
        assert!(store.find("a", &Filter::new()).await.unwrap().is_empty());
        assert_eq!(store.find("b", &Filter::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("library.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_one("bookmarks", doc(json!({"userId": "u1"}))).await.unwrap()
        };

        let store = SqliteStore::open(&path).unwrap();
        let found = store
            .find_one("bookmarks", &Filter::new().eq("userId", "u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found[ID_FIELD], json!(id));
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = SqliteStore::in_memory().unwrap();
        for n in 0..5 {
            store.insert_one("seq", doc(json!({"n": n}))).await.unwrap();
        }

        let ns: Vec<_> = store
            .find("seq", &Filter::new())
            .await
            .unwrap()
            .iter()
            .map(|d| d["n"].as_i64().unwrap())
            .collect();
        assert_eq!(ns, vec![0, 1, 2, 3, 4]);
    }
}
