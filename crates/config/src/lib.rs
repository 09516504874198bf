//! Configuration loading and validation for the HackMD agent.
//!
//! Loads configuration from `~/.hackmd-agent/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use hackmd_core::AgentConfig;

/// The root configuration structure.
///
/// Maps directly to `~/.hackmd-agent/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HackMD API access
    #[serde(default)]
    pub hackmd: HackMdConfig,

    /// Gemini API access
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Agent session settings
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct HackMdConfig {
    /// Personal access token for the HackMD API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Base URL of the HackMD API
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.hackmd.io/v1".into()
}

impl Default for HackMdConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_url: default_api_url(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key for the Gemini API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for HackMdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HackMdConfig")
            .field("api_token", &redact(&self.api_token))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.hackmd-agent/config.toml).
    ///
    /// `HACKMD_AGENT_CONFIG` selects an alternative file. Environment
    /// variables override file values:
    /// - `HACKMD_API_TOKEN` and `HACKMD_API_URL` for the note API
    /// - `GEMINI_API_KEY` for the model API
    /// - `HACKMD_AGENT_MODEL` for the model name
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration file path, honoring `HACKMD_AGENT_CONFIG`.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("HACKMD_AGENT_CONFIG") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".hackmd-agent")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("HACKMD_API_TOKEN") {
            self.hackmd.api_token = Some(token);
        }
        if let Ok(url) = std::env::var("HACKMD_API_URL") {
            self.hackmd.api_url = url;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("HACKMD_AGENT_MODEL") {
            self.agent.model = model;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hackmd.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "hackmd.api_url must not be empty".into(),
            ));
        }

        if self.agent.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "agent.model must not be empty".into(),
            ));
        }

        if self.agent.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_turns must be at least 1".into(),
            ));
        }

        if let Some(t) = self.agent.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "agent.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        Ok(())
    }

    /// Check if a HackMD API token is available.
    pub fn has_api_token(&self) -> bool {
        self.hackmd.api_token.is_some()
    }

    /// Check if a Gemini API key is available.
    pub fn has_gemini_key(&self) -> bool {
        self.gemini.api_key.is_some()
    }

    /// Generate a default config TOML string (for `doctor` hints).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
