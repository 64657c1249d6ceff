//! Error types for Custos core operations.
//!
//! Only configuration loading can fail in this crate. Everything downstream of
//! a loaded configuration is best-effort and never surfaces errors to callers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ConfigError`] as the error type.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or validating audit configuration.
///
/// These indicate a deployment mistake and are meant to fail fast at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("Failed to read audit configuration from {path}: {source}")]
    Read {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// YAML configuration could not be parsed.
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration could not be parsed.
    #[error("Failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A dotted type path in `audit_models` is malformed.
    #[error("Invalid type path '{path}': {reason}")]
    InvalidTypePath {
        /// The offending dotted path.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// A resource type label in `audit_models` is empty.
    #[error("Empty resource type label for '{path}'")]
    EmptyResourceType {
        /// The dotted path the label belongs to.
        path: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_type_path() {
        let err = ConfigError::InvalidTypePath {
            path: "Layer".to_string(),
            reason: "expected <module>.<Type>".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid type path 'Layer': expected <module>.<Type>"
        );
    }

    #[test]
    fn test_error_display_empty_resource_type() {
        let err = ConfigError::EmptyResourceType {
            path: "maps.models.Map".to_string(),
        };
        assert_eq!(err.to_string(), "Empty resource type label for 'maps.models.Map'");
    }

    #[test]
    fn test_error_display_read() {
        let err = ConfigError::Read {
            path: PathBuf::from("/etc/custos.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().starts_with("Failed to read audit configuration"));
    }
}
