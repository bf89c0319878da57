//! Table of contents for Markdown bodies.
//!
//! Only ATX headings (`#` through `######`) count. Headings inside fenced code
//! blocks are ignored. Anchor ids are slugs of the heading text, suffixed
//! with `-1`, `-2`, ... when a slug repeats.

use std::collections::HashMap;

use super::slug::slugify;

/// A heading in a Markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Anchor id
    pub id: String,

    /// Heading text without the leading hashes
    pub text: String,

    /// Heading level (1-6)
    pub level: u8,
}

/// Extract the headings of a Markdown document in order
pub fn table_of_contents(markdown: &str) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut fence: Option<&str> = None;

    for line in markdown.lines() {
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            continue;
        }

        let Some((level, text)) = parse_heading(trimmed) else {
            continue;
        };

        let base = match slugify(&text) {
            s if s.is_empty() => "heading".to_string(),
            s => s,
        };
        let count = seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;

        entries.push(TocEntry { id, text, level });
    }

    entries
}

/// A table of contents is only worth showing with more than one heading
pub fn should_display(entries: &[TocEntry]) -> bool {
    entries.len() > 1
}

fn parse_heading(line: &str) -> Option<(u8, String)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }

    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    // Closing hashes are decoration
    let text = rest.trim().trim_end_matches('#').trim_end().to_string();
    if text.is_empty() {
        return None;
    }

    Some((hashes as u8, text))
}
