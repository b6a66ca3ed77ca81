//! Configuration management for SAO Chat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! Precedence, lowest to highest: built-in defaults, YAML file,
//! `SAO_CHAT_*` environment variables, command-line flags.

use anyhow::Context;
use crate::error::{Result, SaoChatError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Config file looked up relative to the working directory when `--config`
/// is not given.
pub const LOCAL_CONFIG_PATH: &str = "config/config.yaml";

/// Main configuration structure for SAO Chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chatbot backend connection
    #[serde(default)]
    pub backend: BackendConfig,
    /// Identity used for every request
    #[serde(default)]
    pub user: UserConfig,
    /// Session list behavior
    #[serde(default)]
    pub sessions: SessionsConfig,
}

/// Chatbot backend configuration
///
/// Every endpoint is resolved against the single `base_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API, e.g. `http://127.0.0.1:8000/api/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path segment the session and history endpoints live under.
    /// Empty for backends that expose `/sessions/...` at the base.
    #[serde(default = "default_chatbot_scope")]
    pub chatbot_scope: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api/v1".to_string()
}

fn default_chatbot_scope() -> String {
    "/chatbot".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chatbot_scope: default_chatbot_scope(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// User identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Backend user id. Kept as a string; the query endpoint needs it numeric.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    "1".to_string()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
        }
    }
}

/// Session list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Sort the list after loading instead of keeping the backend's order
    #[serde(default)]
    pub normalize_on_load: bool,

    /// Ask before deleting a session
    #[serde(default = "default_confirm_deletes")]
    pub confirm_deletes: bool,
}

fn default_confirm_deletes() -> bool {
    true
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            normalize_on_load: false,
            confirm_deletes: default_confirm_deletes(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Resolves which config file to read.
    ///
    /// An explicit path wins. Otherwise `config/config.yaml` is used when it
    /// exists, then the platform config directory.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        if let Some(path) = explicit {
            return PathBuf::from(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_PATH);
        if local.exists() {
            return local;
        }

        ProjectDirs::from("com", "sao", "sao-chat")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or(local)
    }

    fn from_file(path: &Path) -> std::result::Result<Self, SaoChatError> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SAO_CHAT_API_URL") {
            self.backend.base_url = base_url;
        }

        if let Ok(user_id) = std::env::var("SAO_CHAT_USER_ID") {
            self.user.user_id = user_id;
        }

        if let Ok(timeout) = std::env::var("SAO_CHAT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.backend.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SAO_CHAT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(normalize) = std::env::var("SAO_CHAT_NORMALIZE_ON_LOAD") {
            match normalize.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.sessions.normalize_on_load = true,
                "0" | "false" | "no" => self.sessions.normalize_on_load = false,
                _ => tracing::warn!("Invalid SAO_CHAT_NORMALIZE_ON_LOAD: {}", normalize),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            self.backend.base_url = api_url.clone();
        }

        if let Some(user_id) = &cli.user_id {
            self.user.user_id = user_id.clone();
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an http(s) URL, the timeout is
    /// zero, or the user id is blank
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.backend.base_url).map_err(|e| {
            SaoChatError::Config(format!(
                "Invalid backend.base_url '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SaoChatError::Config(format!(
                "backend.base_url must use http or https, got '{}'",
                url.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == 0 {
            return Err(SaoChatError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.user.user_id.trim().is_empty() {
            return Err(
                SaoChatError::Config("user.user_id cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}
