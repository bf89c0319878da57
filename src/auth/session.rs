//! Login session: token plus fetched profile.
//!
//! A session exists only between a successful login and logout. It is
//! dropped whenever the profile cannot be fetched with the stored token.

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use super::{AuthError, IdentityProvider, UserProfile};

/// Token and profile of the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Query parameters delivered to the OAuth redirect URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse a full callback URL or just its query string
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let input = input.trim();
        let url = if input.contains("://") {
            Url::parse(input)
        } else {
            Url::parse(&format!("http://localhost/?{}", input.trim_start_matches('?')))
        }
        .map_err(|e| AuthError::InvalidUrl(format!("{}: {}", input, e)))?;

        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let value = Some(value.into_owned()).filter(|v| !v.is_empty());
            match key.as_ref() {
                "code" => params.code = value,
                "error" => params.error = value,
                "error_description" => params.error_description = value,
                _ => {}
            }
        }
        Ok(params)
    }

    /// Callback carrying only a code
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// The authorization code, or why there is none
    pub fn code(&self) -> Result<&str, AuthError> {
        if let Some(error) = &self.error {
            return Err(AuthError::Denied {
                error: error.clone(),
                description: self
                    .error_description
                    .clone()
                    .unwrap_or_else(|| error.clone()),
            });
        }
        self.code.as_deref().ok_or(AuthError::MissingCode)
    }
}

/// Session token storage backed by a file.
///
/// The file lives only as long as the login; logout removes it.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session, if any
    pub async fn load(&self) -> Result<Option<Session>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable session file");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(session)?).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Explicit auth session: created on login, destroyed on logout
pub struct AuthSession<P> {
    provider: P,
    storage: Option<SessionFile>,
    session: Option<Session>,
}

impl<P: IdentityProvider> AuthSession<P> {
    /// Session kept only in memory
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            storage: None,
            session: None,
        }
    }

    /// Session persisted to `storage`
    pub fn with_storage(provider: P, storage: SessionFile) -> Self {
        Self {
            provider,
            storage: Some(storage),
            session: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.session.as_ref().and_then(|s| s.user.as_ref())
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// The logged-in user, or `AuthError::NotAuthenticated`
    pub fn require_user(&self) -> Result<&UserProfile, AuthError> {
        self.current_user().ok_or(AuthError::NotAuthenticated)
    }

    /// Token of the logged-in user, or `AuthError::NotAuthenticated`
    pub fn require_token(&self) -> Result<&str, AuthError> {
        match (&self.session, self.is_authenticated()) {
            (Some(session), true) => Ok(session.token.as_str()),
            _ => Err(AuthError::NotAuthenticated),
        }
    }

    /// Start a login: the URL the user has to open
    pub fn login(&self) -> Result<String, AuthError> {
        self.provider.authorize_url()
    }

    /// Finish a login from the provider's callback
    pub async fn complete_login(&mut self, callback: &CallbackParams) -> Result<&UserProfile, AuthError> {
        let code = callback.code()?;
        let token = self.provider.exchange_code(code).await?;
        self.activate(token).await
    }

    /// Resume the stored session, re-fetching the profile.
    ///
    /// Returns `Ok(None)` when nothing is stored. A stored token whose profile
    /// cannot be fetched is discarded and the error returned.
    pub async fn restore(&mut self) -> Result<Option<&UserProfile>, AuthError> {
        let stored = match &self.storage {
            Some(storage) => storage.load().await?,
            None => None,
        };

        match stored {
            Some(session) => self.activate(session.token).await.map(Some),
            None => Ok(None),
        }
    }

    /// Forget the token and profile
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if let Some(user) = self.current_user() {
            info!(login = %user.login, "Logged out");
        }
        self.clear().await
    }

    async fn activate(&mut self, token: String) -> Result<&UserProfile, AuthError> {
        let user = match self.provider.fetch_user(&token).await {
            Ok(user) => user,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Profile fetch failed, clearing session");
                self.clear().await?;
                return Err(e);
            }
        };

        let session = Session {
            token,
            user: Some(user),
        };
        if let Some(storage) = &self.storage {
            storage.save(&session).await?;
        }
        let session = self.session.insert(session);

        let user = session.user.as_ref().ok_or(AuthError::NotAuthenticated)?;
        info!(login = %user.login, "Logged in");
        Ok(user)
    }

    async fn clear(&mut self) -> Result<(), AuthError> {
        self.session = None;
        if let Some(storage) = &self.storage {
            storage.clear().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Accepts code "good" -> token "tok"; only "tok" has a profile
    struct FakeProvider;

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        fn authorize_url(&self) -> Result<String, AuthError> {
            Ok("https://example.test/authorize?client_id=x".to_string())
        }

        async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
            match code {
                "good" => Ok("tok".to_string()),
                "stale" => Ok("expired".to_string()),
                _ => Err(AuthError::TokenExchange("bad_verification_code".to_string())),
            }
        }

        async fn fetch_user(&self, token: &str) -> Result<UserProfile, AuthError> {
            if token == "tok" {
                Ok(UserProfile {
                    id: 7,
                    login: "octocat".to_string(),
                    avatar_url: String::new(),
                    name: None,
                    email: None,
                    html_url: None,
                })
            } else {
                Err(AuthError::Profile(401))
            }
        }
    }

    #[test]
    fn test_callback_parse() {
        let params = CallbackParams::parse("http://localhost:8080/auth/callback?code=abc123").unwrap();
        assert_eq!(params.code().unwrap(), "abc123");
        assert_eq!(params.error, None);

        let params = CallbackParams::parse("?error=access_denied&error_description=The+user+denied").unwrap();
        match params.code() {
            Err(AuthError::Denied { error, description }) => {
                assert_eq!(error, "access_denied");
                assert_eq!(description, "The user denied");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let params = CallbackParams::parse("state=xyz").unwrap();
        assert!(matches!(params.code(), Err(AuthError::MissingCode)));
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let temp = TempDir::new().unwrap();
        let file = SessionFile::new(temp.path().join("session.json"));
        let mut auth = AuthSession::with_storage(FakeProvider, file.clone());

        assert!(auth.require_user().is_err());
        assert!(auth.login().unwrap().starts_with("https://example.test/"));

        let user = auth.complete_login(&CallbackParams::from_code("good")).await.unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(auth.token(), Some("tok"));
        assert!(file.path().exists());

        auth.logout().await.unwrap();
        assert!(auth.current_user().is_none());
        assert!(!file.path().exists());
    }

    #[tokio::test]
    async fn test_restore_from_storage() {
        let temp = TempDir::new().unwrap();
        let file = SessionFile::new(temp.path().join("session.json"));

        let mut first = AuthSession::with_storage(FakeProvider, file.clone());
        first.complete_login(&CallbackParams::from_code("good")).await.unwrap();

        let mut second = AuthSession::with_storage(FakeProvider, file.clone());
        let user = second.restore().await.unwrap().unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(second.require_token().unwrap(), "tok");
    }

    #[tokio::test]
    async fn test_failed_profile_fetch_clears_session() {
        let temp = TempDir::new().unwrap();
        let file = SessionFile::new(temp.path().join("session.json"));
        file.save(&Session {
            token: "expired".to_string(),
            user: None,
        })
        .await
        .unwrap();

        let mut auth = AuthSession::with_storage(FakeProvider, file.clone());
        assert!(matches!(auth.restore().await, Err(AuthError::Profile(401))));
        assert!(!auth.is_authenticated());
        assert!(!file.path().exists());

        let result = auth.complete_login(&CallbackParams::from_code("stale")).await;
        assert!(result.is_err());
        assert!(auth.token().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_storage_is_empty() {
        let mut auth = AuthSession::new(FakeProvider);
        assert!(auth.restore().await.unwrap().is_none());
        assert!(matches!(auth.require_token(), Err(AuthError::NotAuthenticated)));
    }
}
