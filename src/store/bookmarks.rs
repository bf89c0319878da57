//! Per-user bookmarks.
//!
//! One document per (user, content) pair in the `bookmarks` collection.
//! Uniqueness is a check before insert with no transaction around it, so two
//! concurrent `add` calls for the same pair can both succeed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{to_document, Document, Filter, SharedStore, StoreError};

const COLLECTION: &str = "bookmarks";

/// A saved (user, content) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub user_id: String,
    pub content_id: String,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(user_id: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            content_id: content_id.into(),
            created_at: Utc::now(),
        }
    }
}

fn pair_filter(user_id: &str, content_id: &str) -> Filter {
    Filter::new().eq("userId", user_id).eq("contentId", content_id)
}

/// Bookmark operations that never fail loudly
#[derive(Clone)]
pub struct BookmarkStore {
    store: SharedStore,
}

impl BookmarkStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Bookmark `content_id` for `user_id`.
    ///
    /// Returns false when the user id is empty, the bookmark already exists or
    /// the store fails.
    pub async fn add(&self, user_id: &str, content_id: &str) -> bool {
        if user_id.is_empty() {
            return false;
        }

        match self.try_add(user_id, content_id).await {
            Ok(added) => added,
            Err(e) => {
                error!(user_id, content_id, error = %e, "Error adding bookmark");
                false
            }
        }
    }

    async fn try_add(&self, user_id: &str, content_id: &str) -> Result<bool, StoreError> {
        if self
            .store
            .find_one(COLLECTION, &pair_filter(user_id, content_id))
            .await?
            .is_some()
        {
            debug!(user_id, content_id, "Bookmark already exists");
            return Ok(false);
        }

        let doc = to_document(&Bookmark::new(user_id, content_id))?;
        self.store.insert_one(COLLECTION, doc).await?;
        Ok(true)
    }

    /// Remove a bookmark; true only if a record was deleted
    pub async fn remove(&self, user_id: &str, content_id: &str) -> bool {
        if user_id.is_empty() {
            return false;
        }

        match self
            .store
            .delete_one(COLLECTION, &pair_filter(user_id, content_id))
            .await
        {
            Ok(deleted) => deleted > 0,
            Err(e) => {
                error!(user_id, content_id, error = %e, "Error removing bookmark");
                false
            }
        }
    }

    /// Content ids bookmarked by `user_id`, oldest first
    pub async fn user_bookmarks(&self, user_id: &str) -> Vec<String> {
        if user_id.is_empty() {
            return Vec::new();
        }

        match self
            .store
            .find(COLLECTION, &Filter::new().eq("userId", user_id))
            .await
        {
            Ok(docs) => docs.iter().filter_map(content_id_of).collect(),
            Err(e) => {
                error!(user_id, error = %e, "Error getting user bookmarks");
                Vec::new()
            }
        }
    }

    pub async fn is_bookmarked(&self, user_id: &str, content_id: &str) -> bool {
        if user_id.is_empty() {
            return false;
        }

        match self
            .store
            .find_one(COLLECTION, &pair_filter(user_id, content_id))
            .await
        {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!(user_id, content_id, error = %e, "Error checking bookmark status");
                false
            }
        }
    }

    /// Flip the bookmark state.
    ///
    /// Returns the new state, or `None` if the store failed or nothing changed.
    pub async fn toggle(&self, user_id: &str, content_id: &str) -> Option<bool> {
        if user_id.is_empty() {
            return None;
        }

        let changed = if self.is_bookmarked(user_id, content_id).await {
            self.remove(user_id, content_id).await.then_some(false)
        } else {
            self.add(user_id, content_id).await.then_some(true)
        };

        if changed.is_none() {
            debug!(user_id, content_id, "Bookmark toggle had no effect");
        }
        changed
    }
}

fn content_id_of(doc: &Document) -> Option<String> {
    doc.get("contentId")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
