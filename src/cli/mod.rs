//! Command-line interface for shadowlib.
//!
//! Provides commands for browsing and searching the catalog, reading
//! individual items, managing bookmarks and submissions, and logging in
//! with GitHub.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::{self, ResolvedConfig, StoreBackend};
use crate::library::search::{DEFAULT_LISTING_LIMIT, DEFAULT_RELATED_LIMIT};
use crate::library::toc;
use crate::library::{Catalog, ContentCategory, ContentItem, Resolution};
use crate::store::{MemoryStore, SharedStore, SqliteStore};

pub mod account;
pub mod bookmarks;

/// shadowlib - Browse, search and submit prompt engineering content
#[derive(Parser, Debug)]
#[command(name = "shadowlib")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List library content, optionally filtered
    Browse {
        /// Free-text query (title, description, content, tags)
        #[arg(short, long)]
        query: Option<String>,

        /// Only these categories (repeatable)
        #[arg(short, long = "category", value_name = "CATEGORY")]
        categories: Vec<ContentCategory>,

        /// Only items with any of these tags (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Maximum number of items to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Search the library
    Search {
        /// Search query
        query: String,

        /// Only these categories (repeatable)
        #[arg(short, long = "category", value_name = "CATEGORY")]
        categories: Vec<ContentCategory>,

        /// Only items with any of these tags (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Maximum number of items to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List every tag in use
    Tags,

    /// List categories with item counts
    Categories,

    /// List featured content
    Featured,

    /// List the newest content
    Latest {
        #[arg(short, long, default_value_t = DEFAULT_LISTING_LIMIT)]
        limit: usize,
    },

    /// List the most viewed content
    Popular {
        #[arg(short, long, default_value_t = DEFAULT_LISTING_LIMIT)]
        limit: usize,
    },

    /// Show a content item
    Show {
        /// Content ID, slug or /content/<category>/<slug> path
        target: String,

        /// Print the full Markdown body
        #[arg(short, long)]
        full: bool,

        /// Number of related items to suggest
        #[arg(short, long, default_value_t = DEFAULT_RELATED_LIMIT)]
        related: usize,
    },

    /// Manage your bookmarks
    Bookmark {
        #[command(subcommand)]
        command: bookmarks::BookmarkCommands,
    },

    /// Submit content for review
    Submit(account::SubmitArgs),

    /// List your submissions
    Submissions,

    /// Log in with GitHub
    Login {
        /// Authorization code from the GitHub redirect
        #[arg(long, conflicts_with = "callback")]
        code: Option<String>,

        /// Full redirect URL (or its query string) GitHub sent you to
        #[arg(long)]
        callback: Option<String>,
    },

    /// Log out and forget the stored token
    Logout,

    /// Show the logged-in GitHub user
    Whoami,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Browse {
                query,
                categories,
                tags,
                limit,
            } => {
                browse(query.as_deref().unwrap_or(""), &categories, &tags, limit).await
            }
            Commands::Search {
                query,
                categories,
                tags,
                limit,
            } => {
                browse(&query, &categories, &tags, limit).await
            }
            Commands::Tags => {
                list_tags().await
            }
            Commands::Categories => {
                list_categories().await
            }
            Commands::Featured => {
                list_featured().await
            }
            Commands::Latest { limit } => {
                list_latest(limit).await
            }
            Commands::Popular { limit } => {
                list_popular(limit).await
            }
            Commands::Show {
                target,
                full,
                related,
            } => {
                show_content(&target, full, related).await
            }
            Commands::Bookmark { command } => {
                bookmarks::execute(command).await
            }
            Commands::Submit(args) => {
                account::submit(args).await
            }
            Commands::Submissions => {
                account::list_submissions().await
            }
            Commands::Login { code, callback } => {
                account::login(code, callback).await
            }
            Commands::Logout => {
                account::logout().await
            }
            Commands::Whoami => {
                account::whoami().await
            }
            Commands::Config => {
                show_config().await
            }
        }
    }
}

/// Load the configured catalog, or the bundled one
pub(crate) async fn load_catalog(cfg: &ResolvedConfig) -> Result<Catalog> {
    Catalog::load_or_bundled(cfg.catalog.as_deref()).await
}

/// Open the configured document store
pub(crate) fn open_store(cfg: &ResolvedConfig) -> Result<SharedStore> {
    match cfg.store_backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&cfg.database)
                .with_context(|| format!("Failed to open database: {}", cfg.database.display()))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; nothing is kept after this command exits");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Find an item by ID, slug or content path.
///
/// Returns the canonical URL alongside when the request was not canonical.
pub(crate) fn find_item<'a>(catalog: &'a Catalog, target: &str) -> Result<(&'a ContentItem, Option<String>)> {
    if let Some(item) = catalog.get(target) {
        return Ok((item, None));
    }

    match catalog.resolve(target) {
        Resolution::Found(item) => Ok((item, None)),
        Resolution::Redirect { item, to } => Ok((item, Some(to))),
        Resolution::NotFound => anyhow::bail!("Content not found: {}", target),
    }
}

/// Shorten to `max` characters, marking the cut with "..."
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn print_items(items: &[&ContentItem]) {
    println!("{:<6} {:<14} {:<50} {:>7}", "ID", "CATEGORY", "TITLE", "VIEWS");
    println!("{}", "-".repeat(80));

    for item in items {
        let views = item.views.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<14} {:<50} {:>7}",
            item.id.as_str(),
            item.category.key(),
            truncate(&item.title, 50),
            views
        );
    }
}

/// Browse or search the library
async fn browse(query: &str, categories: &[ContentCategory], tags: &[String], limit: usize) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    let results = catalog.search(query, categories, tags);

    if results.is_empty() {
        if query.trim().is_empty() {
            println!("No content matches the selected filters.");
        } else {
            println!("No results found for: {}", query);
        }
        return Ok(());
    }

    if !query.trim().is_empty() {
        println!("Found {} result(s) for \"{}\":\n", results.len(), query.trim());
    }
    print_items(&results[..results.len().min(limit)]);

    println!("\nShowing {} of {} items", results.len().min(limit), catalog.len());

    Ok(())
}

/// List all tags
async fn list_tags() -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    for tag in catalog.all_tags() {
        println!("{}", tag);
    }

    Ok(())
}

/// List categories with their item counts
async fn list_categories() -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    println!("{:<4} {:<16} {:<14} {:>5}  {}", "", "CATEGORY", "KEY", "ITEMS", "DESCRIPTION");
    println!("{}", "-".repeat(100));

    for (category, count) in catalog.category_counts() {
        println!(
            "{:<4} {:<16} {:<14} {:>5}  {}",
            category.icon(),
            category.label(),
            category.key(),
            count,
            category.description()
        );
    }

    Ok(())
}

async fn list_featured() -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    let featured = catalog.featured();
    if featured.is_empty() {
        println!("No featured content.");
        return Ok(());
    }

    print_items(&featured);
    Ok(())
}

async fn list_latest(limit: usize) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    print_items(&catalog.latest(limit));
    Ok(())
}

async fn list_popular(limit: usize) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    print_items(&catalog.most_viewed(limit));
    Ok(())
}

/// Show details of a content item
async fn show_content(target: &str, full: bool, related: usize) -> Result<()> {
    let cfg = config::config()?;
    let catalog = load_catalog(cfg).await?;

    let (item, redirect) = find_item(&catalog, target)?;
    if let Some(to) = redirect {
        eprintln!("↪ Redirected to canonical URL: {}", to);
    }

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("  {}", item.title);
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("  ID: {}", item.id);
    println!("  Category: {} {}", item.category.icon(), item.category.label());
    println!("  Author: {}", item.author);
    println!("  Created: {}", item.created_at.format("%Y-%m-%d"));
    if let Some(views) = item.views {
        println!("  Views: {}", views);
    }
    if item.is_featured() {
        println!("  Featured: yes");
    }
    if !item.tags.is_empty() {
        println!("  Tags: {}", item.tags.join(", "));
    }
    println!("  URL: {}", item.url());
    if !item.description.is_empty() {
        println!("\n{}", item.description);
    }

    if full {
        let entries = toc::table_of_contents(&item.content);
        if toc::should_display(&entries) {
            println!("\n═══ CONTENTS ═══\n");
            for entry in &entries {
                let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
                println!("{}- {} (#{})", indent, entry.text, entry.id);
            }
        }
        println!("\n═══ CONTENT ═══\n");
        println!("{}", item.content);
    } else {
        println!("\nUse --full to show the content");
    }

    let suggestions = catalog.related(item.id.as_str(), related, &mut rand::thread_rng());
    if !suggestions.is_empty() {
        println!("\nRelated:");
        for other in suggestions {
            println!("  {} {:<50} {}", other.category.icon(), truncate(&other.title, 50), other.url());
        }
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("  shadowlib Configuration");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Config file: {}", cfg.config_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none - using defaults)".to_string()));
    println!();
    println!("Paths:");
    println!("  Home:     {}", cfg.home.display());
    println!("  Catalog:  {}", cfg.catalog.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(bundled)".to_string()));
    println!("  Database: {}", cfg.database.display());
    println!("  Session:  {}", cfg.session_path().display());
    println!();
    println!("Store backend: {:?}", cfg.store_backend);
    println!();
    println!("GitHub:");
    println!("  Client ID:     {}", cfg.github.client_id.as_deref().unwrap_or("(not set)"));
    println!("  Client secret: {}", if cfg.github.client_secret.is_some() { "(set)" } else { "(not set)" });
    println!("  Redirect URI:  {}", cfg.github.redirect_uri);
    println!("  Scope:         {}", cfg.github.scope);
    println!("  API:           {}", cfg.github.api_url);
    println!("  Timeout:       {}s", cfg.github.timeout_seconds);
    match &cfg.github.discussions {
        Some(target) => println!("  Discussions:   {} / {}", target.repository_id, target.category_id),
        None => println!("  Discussions:   (not configured)"),
    }

    Ok(())
}
