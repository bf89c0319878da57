//! User submissions awaiting review.
//!
//! Submissions are created `pending`. Review (approve/reject) happens outside
//! this crate, so there is no update or delete API here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use super::{to_document, Document, Filter, SharedStore, StoreError, ID_FIELD};
use crate::library::{unique_tags, ContentCategory};

const COLLECTION: &str = "submissions";

/// Longest accepted description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Author recorded when none is given
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Problems with a draft, shown to the user as-is
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Description is too long ({len} characters, max {max})")]
    DescriptionTooLong { len: usize, max: usize },
}

/// Review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Approved => write!(f, "approved"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// What a user fills in before submitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: ContentCategory,
    pub tags: Vec<String>,
    pub author: String,
    pub author_id: String,
}

impl SubmissionDraft {
    /// Check required fields and limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::MissingField("content"));
        }

        let len = self.description.chars().count();
        if len > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                len,
                max: MAX_DESCRIPTION_CHARS,
            });
        }

        Ok(())
    }

    /// Author name to store; blank means anonymous
    pub fn display_author(&self) -> &str {
        match self.author.trim() {
            "" => ANONYMOUS_AUTHOR,
            author => author,
        }
    }
}

/// A stored submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Store-generated id
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: ContentCategory,
    pub tags: Vec<String>,
    pub author: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl Submission {
    /// Stamp a draft with the creation time and `pending` status
    pub fn from_draft(draft: SubmissionDraft) -> Self {
        let author = draft.display_author().to_string();
        Self {
            id: None,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            content: draft.content,
            category: draft.category,
            tags: clean_tags(draft.tags.iter().map(String::as_str)),
            author,
            author_id: draft.author_id,
            created_at: Utc::now(),
            status: SubmissionStatus::Pending,
        }
    }
}

/// Split a comma-separated tag string into an ordered, duplicate-free list
pub fn parse_tags(input: &str) -> Vec<String> {
    clean_tags(input.split(','))
}

/// Trimmed, non-empty, first occurrence only
fn clean_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    unique_tags(tags.into_iter().map(str::trim).filter(|t| !t.is_empty()))
}

/// Submission operations that never fail loudly
#[derive(Clone)]
pub struct SubmissionStore {
    store: SharedStore,
}

impl SubmissionStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Store a draft as a pending submission.
    ///
    /// Returns the generated id, or `None` if the draft is invalid or the
    /// store fails.
    pub async fn submit(&self, draft: SubmissionDraft) -> Option<String> {
        if let Err(e) = draft.validate() {
            warn!(error = %e, "Rejected invalid submission");
            return None;
        }

        match self.try_submit(draft).await {
            Ok(id) => {
                info!(%id, "Submission stored for review");
                Some(id)
            }
            Err(e) => {
                error!(error = %e, "Error submitting content");
                None
            }
        }
    }

    async fn try_submit(&self, draft: SubmissionDraft) -> Result<String, StoreError> {
        let doc = to_document(&Submission::from_draft(draft))?;
        self.store.insert_one(COLLECTION, doc).await
    }

    /// All submissions by `author_id`, oldest first
    pub async fn user_submissions(&self, author_id: &str) -> Vec<Submission> {
        match self
            .store
            .find(COLLECTION, &Filter::new().eq("authorId", author_id))
            .await
        {
            Ok(docs) => docs.into_iter().filter_map(decode_submission).collect(),
            Err(e) => {
                error!(author_id, error = %e, "Error getting user submissions");
                Vec::new()
            }
        }
    }
}

/// Records that no longer match the expected shape are skipped
fn decode_submission(doc: Document) -> Option<Submission> {
    let id = doc.get(ID_FIELD).and_then(|v| v.as_str()).map(str::to_string);
    match serde_json::from_value::<Submission>(serde_json::Value::Object(doc)) {
        Ok(submission) => Some(submission),
        Err(e) => {
            warn!(id = ?id, error = %e, "Skipping malformed submission record");
            None
        }
    }
}
