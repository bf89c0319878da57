//! Account subcommands: GitHub login, logout, and user submissions.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::{open_store, truncate};
use crate::auth::{AuthSession, CallbackParams, GitHubOAuth, SessionFile};
use crate::config::{self, ResolvedConfig};
use crate::library::ContentCategory;
use crate::store::{parse_tags, SubmissionDraft, SubmissionStore};

/// Arguments for `shadowlib submit`
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Title of the submission
    #[arg(long)]
    pub title: String,

    /// Short description (max 200 characters)
    #[arg(short, long)]
    pub description: String,

    /// Category
    #[arg(short, long)]
    pub category: ContentCategory,

    /// Tags (comma-separated)
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Author name to display (defaults to Anonymous)
    #[arg(short, long)]
    pub author: Option<String>,

    /// Markdown file with the content (reads from stdin if not provided)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Also post the submission as a GitHub discussion
    #[arg(long)]
    pub discussion: bool,
}

/// Session backed by the configured session file
pub(crate) fn auth_session(cfg: &ResolvedConfig) -> Result<AuthSession<GitHubOAuth>> {
    let provider = GitHubOAuth::new(cfg.github.clone()).context("Failed to create GitHub client")?;
    Ok(AuthSession::with_storage(provider, SessionFile::new(cfg.session_path())))
}

/// Restore the stored session, failing unless a user is logged in
pub(crate) async fn signed_in(cfg: &ResolvedConfig) -> Result<AuthSession<GitHubOAuth>> {
    let mut auth = auth_session(cfg)?;
    auth.restore()
        .await
        .context("Stored GitHub session is no longer valid")?;
    auth.require_user()?;
    Ok(auth)
}

/// Log in with GitHub
pub async fn login(code: Option<String>, callback: Option<String>) -> Result<()> {
    let cfg = config::config()?;
    let mut auth = auth_session(cfg)?;

    let params = match (code, callback) {
        (Some(code), _) => CallbackParams::from_code(code),
        (None, Some(callback)) => CallbackParams::parse(&callback)?,
        (None, None) => {
            let url = auth.login()?;
            println!("Open this URL in your browser to log in with GitHub:\n");
            println!("  {}\n", url);
            println!("Then run: shadowlib login --callback '<URL you were redirected to>'");
            return Ok(());
        }
    };

    let user = auth.complete_login(&params).await?;
    eprintln!("✅ Logged in as {} ({})", user.display_name(), user.login);

    Ok(())
}

pub async fn logout() -> Result<()> {
    let cfg = config::config()?;
    let mut auth = auth_session(cfg)?;
    auth.logout().await?;

    eprintln!("Logged out.");
    Ok(())
}

/// Show the logged-in user
pub async fn whoami() -> Result<()> {
    let cfg = config::config()?;
    let mut auth = auth_session(cfg)?;

    match auth.restore().await {
        Ok(Some(user)) => {
            println!("  Login: {}", user.login);
            println!("  Name:  {}", user.display_name());
            if let Some(email) = &user.email {
                println!("  Email: {}", email);
            }
            if let Some(url) = &user.html_url {
                println!("  URL:   {}", url);
            }
        }
        Ok(None) => println!("Not logged in. Run 'shadowlib login'."),
        Err(e) => println!("Session expired ({}). Run 'shadowlib login'.", e),
    }

    Ok(())
}

/// Read submission content from a file or piped stdin
fn read_content(input: Option<PathBuf>) -> Result<String> {
    if let Some(path) = input {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No content provided. Use --input <file> or pipe to stdin");
    }

    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

fn discussion_body(draft: &SubmissionDraft) -> String {
    let mut body = format!(
        "{}\n\n**Category:** {}\n**Author:** {}\n",
        draft.description.trim(),
        draft.category.label(),
        draft.display_author()
    );
    if !draft.tags.is_empty() {
        body.push_str(&format!("**Tags:** {}\n", draft.tags.join(", ")));
    }
    body.push_str("\n---\n\n");
    body.push_str(&draft.content);
    body
}

/// Submit content for review
pub async fn submit(args: SubmitArgs) -> Result<()> {
    let cfg = config::config()?;
    let auth = signed_in(cfg).await?;
    let user = auth.require_user()?;

    let draft = SubmissionDraft {
        title: args.title,
        description: args.description,
        content: read_content(args.input)?,
        category: args.category,
        tags: args.tags.as_deref().map(parse_tags).unwrap_or_default(),
        author: args.author.unwrap_or_default(),
        author_id: user.user_key(),
    };
    draft.validate()?;

    let store = SubmissionStore::new(open_store(cfg)?);
    let id = store
        .submit(draft.clone())
        .await
        .context("Failed to submit content. Please try again.")?;

    eprintln!("✅ Submitted for review");
    eprintln!("   ID: {}", id);
    eprintln!("   Title: {}", draft.title.trim());

    if args.discussion {
        let target = cfg
            .github
            .discussions
            .as_ref()
            .context("github.discussions is not configured")?;
        let discussion = auth
            .provider()
            .create_discussion(auth.require_token()?, target, draft.title.trim(), &discussion_body(&draft))
            .await?;
        eprintln!("   Discussion: {}", discussion.url);
    }

    Ok(())
}

/// List the logged-in user's submissions
pub async fn list_submissions() -> Result<()> {
    let cfg = config::config()?;
    let auth = signed_in(cfg).await?;
    let user = auth.require_user()?;

    let store = SubmissionStore::new(open_store(cfg)?);
    let submissions = store.user_submissions(&user.user_key()).await;

    if submissions.is_empty() {
        println!("No submissions yet. Use 'shadowlib submit' to add one.");
        return Ok(());
    }

    println!("{:<34} {:<10} {:<14} {:<40}", "ID", "STATUS", "CATEGORY", "TITLE");
    println!("{}", "-".repeat(100));

    for submission in &submissions {
        println!(
            "{:<34} {:<10} {:<14} {:<40}",
            submission.id.as_deref().unwrap_or("-"),
            submission.status.to_string(),
            submission.category.key(),
            truncate(&submission.title, 40)
        );
    }

    println!("\nTotal: {} submission(s)", submissions.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discussion_body_lists_metadata() {
        let draft = SubmissionDraft {
            title: "Grandma Exploit".to_string(),
            description: " Persona framing ".to_string(),
            content: "# Body".to_string(),
            category: ContentCategory::Jailbreak,
            tags: vec!["persona".to_string(), "roleplay".to_string()],
            author: String::new(),
            author_id: "42".to_string(),
        };

        let body = discussion_body(&draft);
        assert!(body.starts_with("Persona framing\n"));
        assert!(body.contains("**Category:** Jailbreak"));
        assert!(body.contains("**Author:** Anonymous"));
        assert!(body.contains("**Tags:** persona, roleplay"));
        assert!(body.ends_with("# Body"));
    }

    #[test]
    fn test_read_content_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("prompt.md");
        std::fs::write(&path, "# Prompt").unwrap();

        assert_eq!(read_content(Some(path)).unwrap(), "# Prompt");
        assert!(read_content(Some(temp.path().join("missing.md"))).is_err());
    }
}
