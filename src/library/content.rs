//! Content items and categories.
//!
//! Items are immutable records loaded from the catalog. Categories form a
//! closed set, so an item can never carry a category the library does not
//! know how to label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slug::{content_url, slugify};

/// Content identifier (unique within a catalog)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Create a content ID from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Category of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentCategory {
    /// Methods to bypass model restrictions
    Jailbreak,

    /// Prompts that define a model's behavior
    SystemPrompt,

    /// Leaked information about models and companies
    Leak,

    /// Tools for working with models
    Tool,

    /// Interaction techniques
    Technique,

    /// Internal and technical documents
    Document,
}

impl ContentCategory {
    /// Every category, in display order
    pub const ALL: [ContentCategory; 6] = [
        ContentCategory::Jailbreak,
        ContentCategory::SystemPrompt,
        ContentCategory::Leak,
        ContentCategory::Tool,
        ContentCategory::Technique,
        ContentCategory::Document,
    ];

    /// URL and serialization key
    pub fn key(&self) -> &'static str {
        match self {
            ContentCategory::Jailbreak => "jailbreak",
            ContentCategory::SystemPrompt => "system-prompt",
            ContentCategory::Leak => "leak",
            ContentCategory::Tool => "tool",
            ContentCategory::Technique => "technique",
            ContentCategory::Document => "document",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ContentCategory::Jailbreak => "Jailbreak",
            ContentCategory::SystemPrompt => "System Prompt",
            ContentCategory::Leak => "Leaked Info",
            ContentCategory::Tool => "Tool",
            ContentCategory::Technique => "Technique",
            ContentCategory::Document => "Document",
        }
    }

    /// Icon glyph shown next to the label
    pub fn icon(&self) -> &'static str {
        match self {
            ContentCategory::Jailbreak => "🔓",
            ContentCategory::SystemPrompt => "⚙️",
            ContentCategory::Leak => "📄",
            ContentCategory::Tool => "🔧",
            ContentCategory::Technique => "✨",
            ContentCategory::Document => "📑",
        }
    }

    /// One-line description of the category
    pub fn description(&self) -> &'static str {
        match self {
            ContentCategory::Jailbreak => "Methods to bypass AI safety measures and restrictions",
            ContentCategory::SystemPrompt => "Prompts used to define AI system behavior",
            ContentCategory::Leak => "Leaked information about AI models and companies",
            ContentCategory::Tool => "Tools for working with or analyzing AI models",
            ContentCategory::Technique => "Techniques for improved AI interactions",
            ContentCategory::Document => "Internal and technical documents",
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for ContentCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "jailbreak" => Ok(ContentCategory::Jailbreak),
            "system-prompt" | "system_prompt" | "systemprompt" => Ok(ContentCategory::SystemPrompt),
            "leak" => Ok(ContentCategory::Leak),
            "tool" => Ok(ContentCategory::Tool),
            "technique" => Ok(ContentCategory::Technique),
            "document" | "doc" => Ok(ContentCategory::Document),
            _ => anyhow::bail!("Unknown content category: {}", s),
        }
    }
}

/// A single library entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Unique identifier
    pub id: ContentId,

    /// Display title (also the source of the slug)
    pub title: String,

    /// Short description
    pub description: String,

    /// Markdown body
    pub content: String,

    /// Category
    pub category: ContentCategory,

    /// Tags, in the order the author gave them, without duplicates
    #[serde(default)]
    pub tags: Vec<String>,

    /// Author name
    pub author: String,

    /// Creation time
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// Whether the item is featured on the front page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,

    /// View count, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
}

impl ContentItem {
    /// Create a new item with no tags, not featured, views unknown
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: ContentCategory,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ContentId::new(id),
            title: title.into(),
            description: String::new(),
            content: String::new(),
            category,
            tags: Vec::new(),
            author: "Anonymous".to_string(),
            created_at,
            featured: None,
            views: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Add multiple tags, skipping any already present
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let tags = std::mem::take(&mut self.tags)
            .into_iter()
            .chain(tags.into_iter().map(Into::into));
        self.tags = unique_tags(tags);
        self
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = Some(views);
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = Some(true);
        self
    }

    pub fn is_featured(&self) -> bool {
        self.featured == Some(true)
    }

    /// URL slug derived from the title
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Canonical URL path (`/content/<category>/<slug>`)
    pub fn url(&self) -> String {
        content_url(&self.title, self.category)
    }
}

/// Drop repeated tags, keeping the first occurrence of each
pub fn unique_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.into();
        if !unique.contains(&tag) {
            unique.push(tag);
        }
    }
    unique
}

/// Serde adapter for `createdAt`.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (read as midnight
/// UTC). Always writes RFC 3339.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}
