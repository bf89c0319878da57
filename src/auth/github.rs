//! GitHub OAuth and API client.
//!
//! Covers the authorize redirect, the code-for-token exchange, the `/user`
//! profile and creating a repository discussion through GraphQL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{AuthError, IdentityProvider, UserProfile};
use crate::config::{DiscussionTarget, GitHubSettings};

const USER_AGENT: &str = concat!("shadowlib/", env!("CARGO_PKG_VERSION"));

const CREATE_DISCUSSION: &str = "
mutation createDiscussion($repositoryId: ID!, $categoryId: ID!, $title: String!, $body: String!) {
  createDiscussion(input: {
    repositoryId: $repositoryId,
    categoryId: $categoryId,
    title: $title,
    body: $body
  }) {
    discussion {
      id
      url
    }
  }
}";

/// GitHub OAuth app client
pub struct GitHubOAuth {
    settings: GitHubSettings,
    client: reqwest::Client,
}

/// Response from the token endpoint (errors arrive with HTTP 200)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateDiscussionData {
    create_discussion: CreateDiscussionPayload,
}

#[derive(Debug, Deserialize)]
struct CreateDiscussionPayload {
    discussion: Discussion,
}

/// A created discussion
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub url: String,
}

impl GitHubOAuth {
    /// Create a client from resolved settings
    pub fn new(settings: GitHubSettings) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &GitHubSettings {
        &self.settings
    }

    fn client_id(&self) -> Result<&str, AuthError> {
        self.settings
            .client_id
            .as_deref()
            .ok_or(AuthError::NotConfigured("github.client_id"))
    }

    fn client_secret(&self) -> Result<&str, AuthError> {
        self.settings
            .client_secret
            .as_deref()
            .ok_or(AuthError::NotConfigured("github.client_secret"))
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.api_url.trim_end_matches('/'), path)
    }

    /// Post a discussion to the configured repository category
    #[instrument(skip(self, token, body))]
    pub async fn create_discussion(
        &self,
        token: &str,
        target: &DiscussionTarget,
        title: &str,
        body: &str,
    ) -> Result<Discussion, AuthError> {
        let response = self
            .client
            .post(self.api_url("graphql"))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "query": CREATE_DISCUSSION,
                "variables": {
                    "repositoryId": target.repository_id,
                    "categoryId": target.category_id,
                    "title": title,
                    "body": body,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::NotAuthenticated);
        }
        if !status.is_success() {
            return Err(AuthError::Api(format!("HTTP {}", status.as_u16())));
        }

        let result: GraphQlResponse<CreateDiscussionData> = response.json().await?;
        if !result.errors.is_empty() {
            let messages: Vec<_> = result.errors.into_iter().map(|e| e.message).collect();
            return Err(AuthError::Api(messages.join("; ")));
        }

        let discussion = result
            .data
            .map(|d| d.create_discussion.discussion)
            .ok_or_else(|| AuthError::Api("empty GraphQL response".to_string()))?;

        info!(url = %discussion.url, "Discussion created");
        Ok(discussion)
    }
}

#[async_trait]
impl IdentityProvider for GitHubOAuth {
    fn name(&self) -> &str {
        "github"
    }

    fn authorize_url(&self) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &self.settings.authorize_url,
            &[
                ("client_id", self.client_id()?),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("scope", self.settings.scope.as_str()),
            ],
        )
        .map_err(|e| AuthError::InvalidUrl(format!("{}: {}", self.settings.authorize_url, e)))?;

        Ok(url.to_string())
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(&self.settings.token_url)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({
                "client_id": self.client_id()?,
                "client_secret": self.client_secret()?,
                "code": code,
                "redirect_uri": self.settings.redirect_uri,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Token endpoint returned an error status");
            return Err(AuthError::TokenExchange(format!("HTTP {}", status.as_u16())));
        }

        let body: TokenResponse = response.json().await?;
        match body.access_token {
            Some(token) if !token.is_empty() => {
                debug!("Obtained access token");
                Ok(token)
            }
            _ => Err(AuthError::TokenExchange(
                body.error_description
                    .or(body.error)
                    .unwrap_or_else(|| "no access token in response".to_string()),
            )),
        }
    }

    #[instrument(skip(self, token))]
    async fn fetch_user(&self, token: &str) -> Result<UserProfile, AuthError> {
        let response = self
            .client
            .get(self.api_url("user"))
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Profile(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}
