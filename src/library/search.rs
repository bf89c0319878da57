//! Search and filter functions over a slice of content items.
//!
//! Everything here is pure: inputs are borrowed, never mutated, and results
//! keep the relative order of the input unless a function sorts explicitly.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::content::{ContentCategory, ContentItem};
use super::slug::slugify;

/// Default number of items for latest / most viewed listings
pub const DEFAULT_LISTING_LIMIT: usize = 5;

/// Default number of related items shown next to an item
pub const DEFAULT_RELATED_LIMIT: usize = 3;

/// Narrow `items` by category, tag and free-text constraints.
///
/// - An empty `categories` or `tags` slice imposes no constraint.
/// - Tags match if any selected tag is one of the item's tags.
/// - The query is trimmed and lowercased, then matched as a substring of the
///   title, description, body or any tag. A blank query matches everything.
///
/// All constraints apply together. Catalog order is preserved.
pub fn search_content<'a, S: AsRef<str>>(
    items: &'a [ContentItem],
    query: &str,
    categories: &[ContentCategory],
    tags: &[S],
) -> Vec<&'a ContentItem> {
    let needle = query.trim().to_lowercase();

    items
        .iter()
        .filter(|item| categories.is_empty() || categories.contains(&item.category))
        .filter(|item| {
            tags.is_empty()
                || tags
                    .iter()
                    .any(|tag| item.tags.iter().any(|t| t == tag.as_ref()))
        })
        .filter(|item| needle.is_empty() || matches_text(item, &needle))
        .collect()
}

/// `needle` must already be trimmed and lowercased
fn matches_text(item: &ContentItem, needle: &str) -> bool {
    item.title.to_lowercase().contains(needle)
        || item.description.to_lowercase().contains(needle)
        || item.content.to_lowercase().contains(needle)
        || item.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// All distinct tags, sorted ascending
pub fn all_tags(items: &[ContentItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Items flagged as featured, in catalog order
pub fn featured(items: &[ContentItem]) -> Vec<&ContentItem> {
    items.iter().filter(|item| item.is_featured()).collect()
}

/// Newest items first; equal timestamps keep catalog order
pub fn latest(items: &[ContentItem], limit: usize) -> Vec<&ContentItem> {
    let mut sorted: Vec<_> = items.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

/// Most viewed items first.
///
/// Missing view counts count as zero. Ties fall back to newest first, then
/// catalog order, so the ordering is total.
pub fn most_viewed(items: &[ContentItem], limit: usize) -> Vec<&ContentItem> {
    let mut sorted: Vec<_> = items.iter().collect();
    sorted.sort_by(|a, b| compare_views(a, b));
    sorted.truncate(limit);
    sorted
}

fn compare_views(a: &ContentItem, b: &ContentItem) -> Ordering {
    b.views
        .unwrap_or(0)
        .cmp(&a.views.unwrap_or(0))
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// Up to `limit` items other than `current_id`, in random order.
///
/// The shuffle draws from `rng`; pass `rand::thread_rng()` in production and
/// a seeded generator in tests.
pub fn related<'a, R: Rng + ?Sized>(
    items: &'a [ContentItem],
    current_id: &str,
    limit: usize,
    rng: &mut R,
) -> Vec<&'a ContentItem> {
    let mut others: Vec<_> = items
        .iter()
        .filter(|item| item.id.as_str() != current_id)
        .collect();
    others.shuffle(rng);
    others.truncate(limit);
    others
}

/// Exact id lookup
pub fn by_id<'a>(items: &'a [ContentItem], id: &str) -> Option<&'a ContentItem> {
    items.iter().find(|item| item.id.as_str() == id)
}

/// First item whose title slug equals `slug`
pub fn by_slug<'a>(items: &'a [ContentItem], slug: &str) -> Option<&'a ContentItem> {
    items.iter().find(|item| slugify(&item.title) == slug)
}
