//! Content library: catalog, search and addressing.
//!
//! The catalog is an ordered, read-only list of [`ContentItem`]s. Everything
//! that narrows or orders it lives in [`search`] as pure functions so it can
//! be used on any slice of items, not just a loaded catalog.
//!
//! # Addressing
//!
//! ```text
//! /content/<category>/<slug>     e.g. /content/system-prompt/devin-ai
//! ```

pub mod catalog;
pub mod content;
pub mod search;
pub mod slug;
pub mod toc;

pub use catalog::Catalog;
pub use content::{unique_tags, ContentCategory, ContentId, ContentItem};
pub use search::search_content;
pub use slug::{content_url, slugify, Resolution};
pub use toc::{table_of_contents, TocEntry};
