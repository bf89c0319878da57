//! shadowlib - a library of prompt engineering content
//!
//! Browse, filter, search and submit text-based content (jailbreaks, system
//! prompts, leaks, tools, techniques and documents), with GitHub login and
//! per-user bookmarks.
//!
//! # Modules
//!
//! - `library`: Content catalog, search and filtering, slugs and canonical URLs
//! - `store`: Document store backends, bookmarks and submissions
//! - `auth`: GitHub OAuth and the explicit login session
//! - `config`: Configuration file and environment resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Filter the catalog
//! shadowlib browse --category system-prompt --tag agent
//!
//! # Read an item by its canonical URL
//! shadowlib show /content/system-prompt/devin-ai --full
//!
//! # Log in, then bookmark
//! shadowlib login
//! shadowlib bookmark add devin-ai
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod library;
pub mod store;

// Re-export main types at crate root for convenience
pub use auth::{AuthError, AuthSession, GitHubOAuth, IdentityProvider, UserProfile};
pub use library::{content_url, search_content, slugify, Catalog, ContentCategory, ContentItem, Resolution};
pub use store::{BookmarkStore, DocumentStore, MemoryStore, SqliteStore, SubmissionDraft, SubmissionStore};
