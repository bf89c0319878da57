//! Authentication against an external OAuth identity provider.
//!
//! The provider sits behind [`IdentityProvider`] so the session logic can be
//! exercised without the network. [`GitHubOAuth`] is the real implementation.
//!
//! # Flow
//!
//! ```text
//! login()            -> authorize URL (user opens it in a browser)
//! provider callback  -> ?code=...  or  ?error=...&error_description=...
//! complete_login()   -> exchange code for token, fetch profile, persist
//! logout()           -> forget token and profile
//! ```

pub mod github;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use github::{Discussion, GitHubOAuth};
pub use session::{AuthSession, CallbackParams, Session, SessionFile};

/// Authentication failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("GitHub login is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Please log in with GitHub first (run `shadowlib login`)")]
    NotAuthenticated,

    #[error("GitHub login failed: {description}")]
    Denied { error: String, description: String },

    #[error("Callback did not include an authorization code")]
    MissingCode,

    #[error("Failed to obtain access token: {0}")]
    TokenExchange(String),

    #[error("Failed to fetch user profile (HTTP {0})")]
    Profile(u16),

    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Profile of the logged-in user, as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl UserProfile {
    /// Identifier used as the owner key for bookmarks and submissions
    pub fn user_key(&self) -> String {
        self.id.to_string()
    }

    /// Name to show, falling back to the login
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.login)
    }
}

/// Trait for external OAuth identity providers
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// URL the user must visit to grant access
    fn authorize_url(&self) -> Result<String, AuthError>;

    /// Trade an authorization code for a bearer token
    async fn exchange_code(&self, code: &str) -> Result<String, AuthError>;

    /// Fetch the profile that owns `token`
    async fn fetch_user(&self, token: &str) -> Result<UserProfile, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_github_shape() {
        let json = r#"{
            "login": "octocat",
            "id": 583231,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
            "html_url": "https://github.com/octocat",
            "name": "The Octocat",
            "email": null,
            "public_repos": 8
        }"#;

        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 583231);
        assert_eq!(user.user_key(), "583231");
        assert_eq!(user.display_name(), "The Octocat");
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_not_authenticated_message_prompts_login() {
        assert!(AuthError::NotAuthenticated.to_string().contains("log in"));
    }
}
