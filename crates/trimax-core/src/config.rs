//! Configuration management.
//!
//! `Endpoints` resolves the backend URLs from the environment, falling back to
//! a local development install. `Config` holds the small amount of user state
//! remembered between runs and is stored at `~/.config/trimax/config.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/data directory paths
const APP_NAME: &str = "trimax";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token storage file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

pub const GRAPHQL_URL_VAR: &str = "WORDPRESS_GRAPHQL_URL";
pub const JWT_URL_VAR: &str = "WORDPRESS_JWT_URL";
pub const API_URL_VAR: &str = "WORDPRESS_API_URL";
pub const TIMEOUT_VAR: &str = "TRIMAX_HTTP_TIMEOUT_SECS";

const DEFAULT_GRAPHQL_URL: &str = "http://localhost/graphql";
const DEFAULT_JWT_URL: &str = "http://localhost/wp-json/jwt-auth/v1/token";
const DEFAULT_API_URL: &str = "http://localhost/wp-json/wp/v2";

/// HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Network locations of the content backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// GraphQL query endpoint
    pub graphql_url: String,
    /// JWT token exchange endpoint
    pub auth_url: String,
    /// Base path of the REST content API, endpoints are appended verbatim
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            auth_url: DEFAULT_JWT_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Endpoints {
    /// Resolve endpoints from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve endpoints from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout = match var(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!(value = %raw, "Ignoring invalid {}", TIMEOUT_VAR);
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            graphql_url: var(GRAPHQL_URL_VAR).unwrap_or(defaults.graphql_url),
            auth_url: var(JWT_URL_VAR).unwrap_or(defaults.auth_url),
            api_url: var(API_URL_VAR).unwrap_or(defaults.api_url),
            timeout,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_username: Option<String>,
}

impl Config {
    /// Read the remembered state, or defaults when nothing was saved yet.
    pub fn load() -> Result<Self> {
        Self::read_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.write_to(&Self::config_path()?)
    }

    /// Location of the persisted token entries, if this platform has a data directory.
    pub fn token_path() -> Option<PathBuf> {
        app_file(dirs::data_dir(), TOKEN_FILE)
    }

    fn config_path() -> Result<PathBuf> {
        app_file(dirs::config_dir(), CONFIG_FILE).context("Could not find config directory")
    }

    fn read_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// `<base>/trimax/<file>` for a platform directory that may not exist.
fn app_file(base: Option<PathBuf>, file: &str) -> Option<PathBuf> {
    base.map(|dir| dir.join(APP_NAME).join(file))
}
