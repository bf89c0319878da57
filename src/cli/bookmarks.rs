//! Bookmark subcommands for the logged-in user.

use anyhow::Result;
use clap::Subcommand;

use super::account::signed_in;
use super::{find_item, load_catalog, open_store, truncate};
use crate::config;
use crate::store::BookmarkStore;

/// Bookmark-related subcommands
#[derive(Subcommand, Debug)]
pub enum BookmarkCommands {
    /// Bookmark a content item
    Add {
        /// Content ID, slug or content path
        content: String,
    },

    /// Remove a bookmark
    Remove {
        /// Content ID, slug or content path
        content: String,
    },

    /// Bookmark if not bookmarked, otherwise remove
    Toggle {
        /// Content ID, slug or content path
        content: String,
    },

    /// List your bookmarks
    List,

    /// Check whether an item is bookmarked
    Check {
        /// Content ID, slug or content path
        content: String,
    },
}

/// Execute bookmark subcommands
pub async fn execute(command: BookmarkCommands) -> Result<()> {
    let cfg = config::config()?;
    let auth = signed_in(cfg).await?;
    let user_id = auth.require_user()?.user_key();

    let catalog = load_catalog(cfg).await?;
    let bookmarks = BookmarkStore::new(open_store(cfg)?);

    match command {
        BookmarkCommands::Add { content } => {
            let (item, _) = find_item(&catalog, &content)?;
            if bookmarks.add(&user_id, item.id.as_str()).await {
                eprintln!("🔖 Bookmarked: {}", item.title);
            } else if bookmarks.is_bookmarked(&user_id, item.id.as_str()).await {
                eprintln!("Already bookmarked: {}", item.title);
            } else {
                anyhow::bail!("Failed to bookmark: {}", item.title);
            }
        }
        BookmarkCommands::Remove { content } => {
            let (item, _) = find_item(&catalog, &content)?;
            if bookmarks.remove(&user_id, item.id.as_str()).await {
                eprintln!("Removed bookmark: {}", item.title);
            } else {
                eprintln!("Not bookmarked: {}", item.title);
            }
        }
        BookmarkCommands::Toggle { content } => {
            let (item, _) = find_item(&catalog, &content)?;
            match bookmarks.toggle(&user_id, item.id.as_str()).await {
                Some(true) => eprintln!("🔖 Bookmarked: {}", item.title),
                Some(false) => eprintln!("Removed bookmark: {}", item.title),
                None => anyhow::bail!("Failed to update bookmark: {}", item.title),
            }
        }
        BookmarkCommands::List => {
            let ids = bookmarks.user_bookmarks(&user_id).await;
            if ids.is_empty() {
                println!("No bookmarks yet. Use 'shadowlib bookmark add <content>' to save one.");
                return Ok(());
            }

            println!("{:<6} {:<14} {:<50}", "ID", "CATEGORY", "TITLE");
            println!("{}", "-".repeat(72));

            for id in &ids {
                match catalog.get(id) {
                    Some(item) => println!(
                        "{:<6} {:<14} {:<50}",
                        item.id.as_str(),
                        item.category.key(),
                        truncate(&item.title, 50)
                    ),
                    None => println!("{:<6} {:<14} {:<50}", id, "-", "(no longer in catalog)"),
                }
            }

            println!("\nTotal: {} bookmark(s)", ids.len());
        }
        BookmarkCommands::Check { content } => {
            let (item, _) = find_item(&catalog, &content)?;
            if bookmarks.is_bookmarked(&user_id, item.id.as_str()).await {
                println!("yes");
            } else {
                println!("no");
            }
        }
    }

    Ok(())
}
