//! Configuration management for Careterm
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CaretermError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main configuration structure for Careterm
///
/// This structure holds everything the client needs: where the portal
/// backend lives, how chat sessions behave, and how the notification
/// poller is paced.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Portal backend connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat session settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Notification poller settings
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Portal backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the portal backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// CSRF token sent as `X-CSRFToken` on mutating requests
    ///
    /// The portal issues this alongside the session. When absent, POSTs
    /// are sent without the header (useful against test servers).
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Session cookie value (`sessionid=...`) proving an authenticated viewer
    ///
    /// The notification poller only starts when this is present, the same
    /// way the page version only started for authenticated visitors.
    #[serde(default)]
    pub session_cookie: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            csrf_token: None,
            session_cookie: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Whether the personal-context toggle starts enabled
    #[serde(default)]
    pub use_personal_context: bool,

    /// Maximum number of history rows to render (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    0
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            use_personal_context: false,
            history_limit: default_history_limit(),
        }
    }
}

/// Notification poller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Seconds between unread-notification polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Milliseconds a toast stays on screen before auto-closing
    #[serde(default = "default_toast_timeout")]
    pub toast_timeout_ms: u64,

    /// Milliseconds a closing toast lingers for its fade transition
    #[serde(default = "default_toast_fade")]
    pub toast_fade_ms: u64,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_toast_timeout() -> u64 {
    5000
}

fn default_toast_fade() -> u64 {
    300
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            toast_timeout_ms: default_toast_timeout(),
            toast_fade_ms: default_toast_fade(),
        }
    }
}

impl Config {
    /// Load configuration from a file with env and CLI overrides applied
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments whose overrides take precedence
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CaretermError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CaretermError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CARETERM_BASE_URL") {
            self.server.base_url = base_url;
        }

        if let Ok(token) = std::env::var("CARETERM_CSRF") {
            self.server.csrf_token = Some(token);
        }

        if let Ok(cookie) = std::env::var("CARETERM_SESSION_COOKIE") {
            self.server.session_cookie = Some(cookie);
        }

        if let Ok(interval) = std::env::var("CARETERM_POLL_INTERVAL") {
            if let Ok(value) = interval.parse() {
                self.notifications.poll_interval_seconds = value;
            } else {
                tracing::warn!("Invalid CARETERM_POLL_INTERVAL: {}", interval);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(server) = &cli.server {
            self.server.base_url = server.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not a valid http(s) URL, or if
    /// any timing value is zero.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.server.base_url)
            .map_err(|e| CaretermError::Config(format!("Invalid base_url: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CaretermError::Config(format!(
                "Invalid base_url scheme: {}. Must be http or https",
                url.scheme()
            ))
            .into());
        }

        if self.server.timeout_seconds == 0 {
            return Err(
                CaretermError::Config("timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.notifications.poll_interval_seconds == 0 {
            return Err(CaretermError::Config(
                "notifications.poll_interval_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.notifications.toast_timeout_ms == 0 {
            return Err(CaretermError::Config(
                "notifications.toast_timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cli_with_defaults() -> crate::cli::Cli {
        use clap::Parser;
        crate::cli::Cli::parse_from(["careterm", "watch"])
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.notifications.poll_interval_seconds, 30);
        assert_eq!(config.notifications.toast_timeout_ms, 5000);
        assert_eq!(config.notifications.toast_fade_ms, 300);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cli = cli_with_defaults();
        let config = Config::load("/nonexistent/careterm.yaml", &cli).unwrap();
        assert_eq!(config.server.timeout_seconds, 30);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  base_url: https://portal.example.com\nnotifications:\n  poll_interval_seconds: 10"
        )
        .unwrap();

        let cli = cli_with_defaults();
        let config = Config::load(file.path().to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.server.base_url, "https://portal.example.com");
        assert_eq!(config.notifications.poll_interval_seconds, 10);
        // Untouched sections fall back to defaults
        assert_eq!(config.notifications.toast_timeout_ms, 5000);
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = Config::default();
        config.server.base_url = "ftp://portal.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unparseable_url() {
        let mut config = Config::default();
        config.server.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let mut config = Config::default();
        config.notifications.poll_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.server.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
