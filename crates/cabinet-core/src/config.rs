//! Configuration management for the cabinet client.
//!
//! Loads configuration from ${CABINET_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that replaces the backend origin outright.
pub const API_URL_ENV: &str = "CABINET_API_URL";
/// Environment variable that selects production or development.
pub const ENVIRONMENT_ENV: &str = "CABINET_ENV";

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Which backend deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    /// Parses an environment name, accepting the usual short aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(Environment::Production),
            "development" | "dev" | "local" => Some(Environment::Development),
            _ => None,
        }
    }
}

pub mod paths {
    //! Path resolution for cabinet configuration and data files.
    //!
    //! CABINET_HOME resolution order:
    //! 1. CABINET_HOME environment variable (if set)
    //! 2. ~/.config/cabinet (default)

    use std::path::PathBuf;

    /// Returns the cabinet home directory.
    ///
    /// Falls back to the current directory when no home directory exists.
    pub fn cabinet_home() -> PathBuf {
        if let Ok(home) = std::env::var("CABINET_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".cabinet"),
            |h| h.join(".config").join("cabinet"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        cabinet_home().join("config.toml")
    }

    /// Returns the path to the persisted key-value storage.
    pub fn storage_path() -> PathBuf {
        cabinet_home().join("storage.json")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        cabinet_home().join("logs")
    }
}

/// Backend origins and resource paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub production_origin: String,
    pub development_origin: String,
    /// Path prefix of the auth endpoints, relative to the origin.
    pub auth_path: String,
    /// Path prefix of the user-resource endpoints, relative to the origin.
    pub user_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            production_origin: "https://api.cabinet-learning.ru".to_string(),
            development_origin: "http://localhost:3000".to_string(),
            auth_path: "/auth".to_string(),
            user_path: "/users".to_string(),
        }
    }
}

/// Timing of the Google callback landing view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub success_redirect_delay_ms: u64,
    pub failure_redirect_delay_ms: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            success_redirect_delay_ms: 2000,
            failure_redirect_delay_ms: 3000,
        }
    }
}

impl GoogleConfig {
    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_redirect_delay_ms)
    }

    pub fn failure_delay(&self) -> Duration {
        Duration::from_millis(self.failure_redirect_delay_ms)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend deployment selected from the config file
    pub environment: Environment,

    /// Backend origins and path prefixes
    pub api: ApiConfig,

    /// Google callback landing timing
    pub google: GoogleConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the default config template to `path`.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Resolves the backend origin from the process environment and config.
    ///
    /// # Errors
    /// Returns an error if an overriding origin is not a valid URL.
    pub fn origin(&self) -> Result<String> {
        let env_url = std::env::var(API_URL_ENV).ok();
        let env_name = std::env::var(ENVIRONMENT_ENV).ok();
        self.resolve_origin(env_url.as_deref(), env_name.as_deref())
    }

    /// Resolves the backend origin with precedence: URL override > env name > config.
    ///
    /// # Errors
    /// Returns an error if the URL override is not a valid URL.
    pub fn resolve_origin(&self, env_url: Option<&str>, env_name: Option<&str>) -> Result<String> {
        if let Some(url) = env_url.map(str::trim).filter(|u| !u.is_empty()) {
            url::Url::parse(url).with_context(|| format!("Invalid {API_URL_ENV}: {url}"))?;
            return Ok(url.trim_end_matches('/').to_string());
        }

        let environment = env_name
            .and_then(Environment::parse)
            .unwrap_or(self.environment);
        let origin = match environment {
            Environment::Production => &self.api.production_origin,
            Environment::Development => &self.api.development_origin,
        };
        Ok(origin.trim_end_matches('/').to_string())
    }

    /// Base URL of the auth endpoints.
    ///
    /// # Errors
    /// Returns an error if the origin cannot be resolved.
    pub fn auth_base_url(&self) -> Result<String> {
        Ok(join_path(&self.origin()?, &self.api.auth_path))
    }

    /// Base URL of the user-resource endpoints.
    ///
    /// # Errors
    /// Returns an error if the origin cannot be resolved.
    pub fn user_base_url(&self) -> Result<String> {
        Ok(join_path(&self.origin()?, &self.api.user_path))
    }
}

fn join_path(origin: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        origin.to_string()
    } else {
        format!("{origin}/{path}")
    }
}
