//! Catalog of all published content.
//!
//! Simple JSON-based collection loaded once at startup. The catalog is
//! read-only at runtime; edits happen by replacing the file.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::content::{unique_tags, ContentCategory, ContentItem};
use super::search;
use super::slug::{self, Resolution};

/// Catalog shipped with the binary
const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Ordered collection of content items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog format version
    pub version: u32,

    /// All items, in display order
    pub items: Vec<ContentItem>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            version: 1,
            items: Vec::new(),
        }
    }

    /// Build a catalog from items, rejecting duplicate ids
    pub fn from_items(items: Vec<ContentItem>) -> Result<Self> {
        let mut catalog = Self { version: 1, items };
        catalog.normalize();
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let mut catalog: Self = serde_json::from_str(json).context("Failed to parse catalog JSON")?;
        catalog.normalize();
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG).context("Bundled catalog is invalid")
    }

    /// Load a catalog file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;

        Self::from_json(&content).with_context(|| format!("Invalid catalog: {}", path.display()))
    }

    /// Load `path` if given, otherwise fall back to the bundled catalog
    pub async fn load_or_bundled(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let catalog = Self::load(path).await?;
                tracing::debug!(path = %path.display(), items = catalog.len(), "Loaded catalog");
                Ok(catalog)
            }
            None => Self::bundled(),
        }
    }

    /// Collapse repeated tags on every item
    fn normalize(&mut self) {
        for item in &mut self.items {
            let before = item.tags.len();
            item.tags = unique_tags(std::mem::take(&mut item.tags));
            if item.tags.len() != before {
                tracing::debug!(id = %item.id, "Dropped duplicate tags");
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                anyhow::bail!("Duplicate content id in catalog: {}", item.id);
            }
            if item.slug().is_empty() {
                anyhow::bail!("Content {} has a title with no letters or digits: {:?}", item.id, item.title);
            }
        }
        Ok(())
    }

    /// Items in catalog order
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Filter by free text, categories and tags
    pub fn search<S: AsRef<str>>(
        &self,
        query: &str,
        categories: &[ContentCategory],
        tags: &[S],
    ) -> Vec<&ContentItem> {
        search::search_content(&self.items, query, categories, tags)
    }

    /// Every distinct tag, sorted
    pub fn all_tags(&self) -> Vec<String> {
        search::all_tags(&self.items)
    }

    pub fn featured(&self) -> Vec<&ContentItem> {
        search::featured(&self.items)
    }

    pub fn latest(&self, limit: usize) -> Vec<&ContentItem> {
        search::latest(&self.items, limit)
    }

    pub fn most_viewed(&self, limit: usize) -> Vec<&ContentItem> {
        search::most_viewed(&self.items, limit)
    }

    /// Random selection of other items, drawn from `rng`
    pub fn related<R: Rng + ?Sized>(&self, current_id: &str, limit: usize, rng: &mut R) -> Vec<&ContentItem> {
        search::related(&self.items, current_id, limit, rng)
    }

    /// Get an item by ID
    pub fn get(&self, id: &str) -> Option<&ContentItem> {
        search::by_id(&self.items, id)
    }

    /// Get an item by title slug
    pub fn get_by_slug(&self, slug: &str) -> Option<&ContentItem> {
        search::by_slug(&self.items, slug)
    }

    /// Resolve a content URL path, reporting canonical redirects
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        slug::resolve(&self.items, path)
    }

    /// Number of items per category, in category display order
    pub fn category_counts(&self) -> Vec<(ContentCategory, usize)> {
        ContentCategory::ALL
            .iter()
            .map(|c| (*c, self.items.iter().filter(|i| i.category == *c).count()))
            .collect()
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
