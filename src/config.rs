//! Configuration management for sqlview.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named database connections and query defaults.

use crate::db::DatabaseBackend;
use crate::error::{Result, SqlViewError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Query shown in the input box on startup and restored after a rejected query.
pub const DEFAULT_QUERY: &str = "SELECT *\nFROM employees";

/// Default query timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for sqlview.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Query defaults.
    #[serde(default)]
    pub query: QueryConfig,

    /// Named database connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionSettings>,
}

/// Query execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Query text restored whenever the input is reset.
    #[serde(default = "default_query")]
    pub default: String,

    /// Seconds before a running query is abandoned. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_query() -> String {
    DEFAULT_QUERY.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default: default_query(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl QueryConfig {
    /// Returns the configured timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Everything the gateway needs to open a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Connection URL, e.g. `postgres://host:5432/sales` or `sqlite://sales.db`.
    #[serde(default)]
    pub url: String,

    /// Database user. Overrides any user embedded in the URL.
    pub user: Option<String>,

    /// Database password (not recommended to store in config).
    pub password: Option<String>,

    /// Open the session read-only.
    #[serde(default = "default_read_only")]
    pub read_only: bool,
}

fn default_read_only() -> bool {
    true
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            user: None,
            password: None,
            read_only: default_read_only(),
        }
    }
}

impl ConnectionSettings {
    /// Creates settings for the given URL with no explicit credentials.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the user and password.
    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Sets whether the session is opened read-only.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Determines the backend from the URL scheme.
    ///
    /// A malformed URL or unknown scheme is a connection error, since it is
    /// reported at connect time.
    pub fn backend(&self) -> Result<DatabaseBackend> {
        if self.url.trim().is_empty() {
            return Err(SqlViewError::connection("Connection URL is empty"));
        }

        let url = Url::parse(&self.url)
            .map_err(|e| SqlViewError::connection(format!("Invalid connection URL: {e}")))?;

        DatabaseBackend::from_scheme(url.scheme()).ok_or_else(|| {
            SqlViewError::connection(format!(
                "Unsupported scheme '{}'. Expected 'postgres', 'postgresql' or 'sqlite'",
                url.scheme()
            ))
        })
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ConnectionSettings) {
        if !other.url.is_empty() {
            self.url = other.url.clone();
        }
        if other.user.is_some() {
            self.user = other.user.clone();
        }
        if other.password.is_some() {
            self.password = other.password.clone();
        }
        if !other.read_only {
            self.read_only = false;
        }
    }

    /// Applies environment variables (SQLVIEW_URL, SQLVIEW_USER, SQLVIEW_PASSWORD) as defaults.
    pub fn apply_env_defaults(&mut self) {
        if self.url.is_empty() {
            if let Ok(url) = std::env::var("SQLVIEW_URL") {
                self.url = url;
            }
        }
        if self.user.is_none() {
            self.user = std::env::var("SQLVIEW_USER").ok();
        }
        if self.password.is_none() {
            self.password = std::env::var("SQLVIEW_PASSWORD").ok();
        }
    }

    /// Returns a display-safe string (no password) for UI purposes.
    pub fn display_string(&self) -> String {
        let location = match Url::parse(&self.url) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(None);
                }
                url.to_string()
            }
            Err(_) => self.url.clone(),
        };

        match &self.user {
            Some(user) => format!("{user} @ {location}"),
            None => location,
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlview")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SqlViewError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            SqlViewError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionSettings> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
