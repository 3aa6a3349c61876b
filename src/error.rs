//! Error types for Careterm
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Careterm operations
///
/// This enum encompasses all possible errors that can occur while
/// loading configuration, talking to the portal backend, validating
/// form input, and rendering views.
#[derive(Error, Debug)]
pub enum CaretermError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend-reported logical failures (`success: false`, error payloads)
    #[error("API error: {0}")]
    Api(String),

    /// Form validation failures
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Careterm operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = CaretermError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_api_error_display() {
        let error = CaretermError::Api("session not found".to_string());
        assert_eq!(error.to_string(), "API error: session not found");
    }

    #[test]
    fn test_validation_error_display() {
        let error = CaretermError::Validation("password too short".to_string());
        assert_eq!(error.to_string(), "Validation error: password too short");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CaretermError = io_error.into();
        assert!(matches!(error, CaretermError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: CaretermError = json_error.into();
        assert!(matches!(error, CaretermError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: CaretermError = yaml_error.into();
        assert!(matches!(error, CaretermError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CaretermError>();
    }
}
