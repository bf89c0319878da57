//! Configuration for shadowlib.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SHADOWLIB_HOME, SHADOWLIB_CATALOG, SHADOWLIB_DB,
//!    GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET)
//! 2. Config file (.shadowlib/config.yaml, or the file named by SHADOWLIB_CONFIG)
//! 3. Defaults (~/.shadowlib, bundled catalog, SQLite store)
//!
//! Config file discovery:
//! - Searches current directory and parents for .shadowlib/config.yaml
//! - `paths.home` is relative to the .shadowlib/ directory
//! - `paths.catalog` and `paths.database` are relative to the project root

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/auth/callback";
const DEFAULT_SCOPE: &str = "read:user user:email";
const DEFAULT_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const DEFAULT_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub github: Option<GitHubConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .shadowlib/)
    pub home: Option<String>,
    /// Catalog JSON file (relative to project root)
    pub catalog: Option<String>,
    /// SQLite database file (relative to project root)
    pub database: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    pub backend: Option<StoreBackend>,
}

/// Which document store backs bookmarks and submissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub authorize_url: Option<String>,
    pub token_url: Option<String>,
    pub api_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub discussions: Option<DiscussionTarget>,
}

/// Repository discussion category that receives submissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionTarget {
    /// GraphQL node id of the repository
    pub repository_id: String,
    /// GraphQL node id of the discussion category
    pub category_id: String,
}

/// Resolved GitHub OAuth and API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
    pub timeout_seconds: u64,
    pub discussions: Option<DiscussionTarget>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            discussions: None,
        }
    }
}

impl GitHubSettings {
    fn from_file(config: GitHubConfig) -> Self {
        let defaults = Self::default();
        Self {
            client_id: config.client_id,
            client_secret: config.client_secret,
            redirect_uri: config.redirect_uri.unwrap_or(defaults.redirect_uri),
            scope: config.scope.unwrap_or(defaults.scope),
            authorize_url: config.authorize_url.unwrap_or(defaults.authorize_url),
            token_url: config.token_url.unwrap_or(defaults.token_url),
            api_url: config.api_url.unwrap_or(defaults.api_url),
            timeout_seconds: config.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            discussions: config.discussions,
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory (session, database)
    pub home: PathBuf,
    /// Catalog file; `None` means the bundled catalog
    pub catalog: Option<PathBuf>,
    /// SQLite database file
    pub database: PathBuf,
    /// Store backend
    pub store_backend: StoreBackend,
    /// GitHub settings
    pub github: GitHubSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Where the login session token is kept
    pub fn session_path(&self) -> PathBuf {
        self.home.join("session.json")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".shadowlib").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Resolve configuration from an optional config file and an environment lookup
fn resolve_config<E>(config_file: Option<PathBuf>, default_home: PathBuf, env: E) -> Result<ResolvedConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    // .shadowlib/ and the project root that contains it
    let config_dir = config_file.as_deref().and_then(Path::parent);
    let base_dir = config_dir.and_then(Path::parent).unwrap_or(Path::new("."));

    let (paths, store, github) = match file {
        Some(f) => (f.paths, f.store.unwrap_or_default(), f.github.unwrap_or_default()),
        None => Default::default(),
    };

    let home = if let Some(env_home) = env("SHADOWLIB_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(dir), Some(home_path)) = (config_dir, paths.home.as_deref()) {
        resolve_path(dir, home_path)
    } else {
        default_home
    };

    let catalog = env("SHADOWLIB_CATALOG")
        .map(PathBuf::from)
        .or_else(|| paths.catalog.as_deref().map(|p| resolve_path(base_dir, p)));

    let database = env("SHADOWLIB_DB")
        .map(PathBuf::from)
        .or_else(|| paths.database.as_deref().map(|p| resolve_path(base_dir, p)))
        .unwrap_or_else(|| home.join("library.db"));

    let mut github = GitHubSettings::from_file(github);
    if let Some(id) = env("GITHUB_CLIENT_ID") {
        github.client_id = Some(id);
    }
    if let Some(secret) = env("GITHUB_CLIENT_SECRET") {
        github.client_secret = Some(secret);
    }

    Ok(ResolvedConfig {
        home,
        catalog,
        database,
        store_backend: store.backend.unwrap_or_default(),
        github,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".shadowlib");

    let config_file = std::env::var("SHADOWLIB_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(find_config_file);

    resolve_config(config_file, default_home, |key| {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
