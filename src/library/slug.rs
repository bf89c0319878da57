//! Slugs and canonical content URLs.
//!
//! Content is addressed as `/content/<category>/<slug>` where the slug is
//! derived from the title. Two titles that normalize to the same slug collide;
//! lookups return the first match in catalog order.

use super::content::{ContentCategory, ContentItem};
use super::search;

/// URL prefix for content pages
pub const CONTENT_PREFIX: &str = "/content";

/// Derive a slug from a title.
///
/// Lowercases, replaces each run of non-alphanumeric characters with a single
/// hyphen and trims hyphens from both ends. Letters outside ASCII are kept.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Canonical URL path for a title in a category
pub fn content_url(title: &str, category: ContentCategory) -> String {
    format!("{}/{}/{}", CONTENT_PREFIX, category.key(), slugify(title))
}

/// A parsed content request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPath {
    /// Category segment as requested (may be stale or unknown)
    pub category: Option<String>,

    /// Slug segment as requested
    pub slug: String,
}

impl ContentPath {
    /// Parse `/content/<category>/<slug>`, `<category>/<slug>` or a bare slug.
    ///
    /// Returns `None` for an empty slug.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim();
        let trimmed = path.trim_matches('/');
        let prefix = CONTENT_PREFIX.trim_start_matches('/');
        // A bare "content" is a slug; "/content" or "content/" is the prefix
        let rest = if trimmed == prefix && path.contains('/') {
            ""
        } else {
            trimmed
                .strip_prefix(prefix)
                .and_then(|r| r.strip_prefix('/'))
                .unwrap_or(trimmed)
        };

        let mut segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let slug = segments.pop()?.to_string();
        let category = segments.pop().map(str::to_string);

        Some(Self { category, slug })
    }

    /// Path as the caller requested it
    pub fn to_path(&self) -> String {
        match &self.category {
            Some(category) => format!("{}/{}/{}", CONTENT_PREFIX, category, self.slug),
            None => self.slug.clone(),
        }
    }
}

/// Outcome of resolving a content request against the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// The request already used the canonical URL
    Found(&'a ContentItem),

    /// The item exists but lives at a different canonical URL
    Redirect { item: &'a ContentItem, to: String },

    /// No item has this slug
    NotFound,
}

/// Resolve a request path to an item.
///
/// The requested slug is normalized first, so differently-cased or
/// punctuated slugs still find their item and redirect to the canonical form.
pub fn resolve<'a>(items: &'a [ContentItem], path: &str) -> Resolution<'a> {
    let Some(requested) = ContentPath::parse(path) else {
        return Resolution::NotFound;
    };

    let normalized = slugify(&requested.slug);
    let Some(item) = search::by_slug(items, &normalized) else {
        return Resolution::NotFound;
    };

    let canonical = item.url();
    if requested.to_path() == canonical {
        Resolution::Found(item)
    } else {
        Resolution::Redirect { item, to: canonical }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(id: &str, title: &str, category: ContentCategory) -> ContentItem {
        ContentItem::new(
            id,
            title,
            category,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Devin AI"), "devin-ai");
        assert_eq!(slugify("Cursor Prompt(agent)"), "cursor-prompt-agent");
        assert_eq!(slugify("  DAN v8.0 -- Jailbreak!  "), "dan-v8-0-jailbreak");
        assert_eq!(slugify("Lead Researcher System Prompt (Leaked)"), "lead-researcher-system-prompt-leaked");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_keeps_non_ascii_letters() {
        assert_eq!(slugify("Café Crème Prompt"), "café-crème-prompt");
        assert_eq!(slugify("Über Jailbreak"), "über-jailbreak");
        assert_eq!(slugify("日本語"), "日本語");
        assert_eq!(slugify("Промпт: Утечка"), "промпт-утечка");
    }

    #[test]
    fn test_non_latin_title_resolves() {
        let items = vec![item("1", "日本語", ContentCategory::Leak)];
        let url = items[0].url();

        assert_eq!(url, "/content/leak/日本語");
        assert_eq!(resolve(&items, &url), Resolution::Found(&items[0]));
    }

    #[test]
    fn test_slugify_is_idempotent() {
        for title in ["Cursor Prompt(chat)", "GPT-5 Specs", "a  b  c", "Über Café"] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn test_distinct_titles_can_collide() {
        // Accepted behavior: both titles address the same slug.
        assert_eq!(slugify("Devin AI"), slugify("devin-ai!"));
        assert_eq!(slugify("C++ Tips"), slugify("C Tips"));
    }

    #[test]
    fn test_content_url() {
        assert_eq!(
            content_url("Cursor Prompt(chat)", ContentCategory::SystemPrompt),
            "/content/system-prompt/cursor-prompt-chat"
        );
    }

    #[test]
    fn test_content_path_parse() {
        let full = ContentPath::parse("/content/jailbreak/dan-v8").unwrap();
        assert_eq!(full.category.as_deref(), Some("jailbreak"));
        assert_eq!(full.slug, "dan-v8");

        let short = ContentPath::parse("jailbreak/dan-v8/").unwrap();
        assert_eq!(short.category.as_deref(), Some("jailbreak"));

        let bare = ContentPath::parse("dan-v8?ref=home").unwrap();
        assert_eq!(bare.category, None);
        assert_eq!(bare.slug, "dan-v8");

        let lookalike = ContentPath::parse("contents-guide").unwrap();
        assert_eq!(lookalike.slug, "contents-guide");

        assert!(ContentPath::parse("/content/").is_none());
        assert!(ContentPath::parse("/content").is_none());

        let named_content = ContentPath::parse("content").unwrap();
        assert_eq!(named_content.category, None);
        assert_eq!(named_content.slug, "content");
    }

    #[test]
    fn test_item_titled_content_resolves() {
        let items = vec![item("1", "Content", ContentCategory::Document)];

        assert_eq!(
            resolve(&items, "content"),
            Resolution::Redirect {
                item: &items[0],
                to: "/content/document/content".to_string()
            }
        );
        assert_eq!(resolve(&items, "/content/document/content"), Resolution::Found(&items[0]));
    }

    #[test]
    fn test_resolve_canonical_and_redirects() {
        let items = vec![
            item("1", "Devin AI", ContentCategory::SystemPrompt),
            item("2", "DAN v8.0", ContentCategory::Jailbreak),
        ];

        assert_eq!(
            resolve(&items, "/content/system-prompt/devin-ai"),
            Resolution::Found(&items[0])
        );

        // Stale category
        assert_eq!(
            resolve(&items, "/content/leak/devin-ai"),
            Resolution::Redirect {
                item: &items[0],
                to: "/content/system-prompt/devin-ai".to_string()
            }
        );

        // Differently cased slug
        assert_eq!(
            resolve(&items, "/content/jailbreak/DAN-v8-0"),
            Resolution::Redirect {
                item: &items[1],
                to: "/content/jailbreak/dan-v8-0".to_string()
            }
        );

        assert_eq!(resolve(&items, "/content/jailbreak/missing"), Resolution::NotFound);
    }

    #[test]
    fn test_resolve_collision_returns_first_in_catalog_order() {
        let items = vec![
            item("1", "Devin AI", ContentCategory::SystemPrompt),
            item("2", "Devin: AI", ContentCategory::Leak),
        ];

        match resolve(&items, "devin-ai") {
            Resolution::Redirect { item, .. } => assert_eq!(item.id.as_str(), "1"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }
}
