//! Error taxonomy for tree operations and source loading.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Key errors
    EmptyKey,
    InvalidKey,
    KeyMustBeString,

    // Value errors
    InvalidValue,

    // Filesystem errors
    FileNotFound,
    FileNotReadable,
    DirectoryNotFound,
    DirectoryNotReadable,
    PathResolution,

    // Source errors
    InvalidFileFormat,
    LoadError,
}

/// Boxed cause carried by errors that wrap a foreign failure.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure raised by the tree, the normalizer and the loaders.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration key must be a non-empty string.")]
    EmptyKey,

    #[error("Invalid configuration key \"{key}\": {reason}.")]
    InvalidKey { key: String, reason: String },

    #[error("{message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration key must be a string, received {kind} under \"{parent}\".")]
    KeyMustBeString { parent: String, kind: String },

    #[error("Config file \"{}\" not found.", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Config file \"{}\" is not readable.", path.display())]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config directory \"{}\" {reason}.", path.display())]
    DirectoryNotFound { path: PathBuf, reason: &'static str },

    #[error("Config directory \"{}\" is not readable.", path.display())]
    DirectoryNotReadable {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Failed to resolve path \"{}\" in directory \"{}\".", path.display(), directory.display())]
    PathResolution { path: PathBuf, directory: PathBuf },

    #[error("Config file \"{}\" does not return a valid configuration mapping: {reason}.", path.display())]
    InvalidFileFormat { path: PathBuf, reason: String },

    #[error("Failed to load config file: {}", path.display())]
    LoadError {
        path: PathBuf,
        #[source]
        source: Cause,
    },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::EmptyKey => ErrorCode::EmptyKey,
            ConfigError::InvalidKey { .. } => ErrorCode::InvalidKey,
            ConfigError::InvalidValue { .. } => ErrorCode::InvalidValue,
            ConfigError::KeyMustBeString { .. } => ErrorCode::KeyMustBeString,
            ConfigError::FileNotFound { .. } => ErrorCode::FileNotFound,
            ConfigError::FileNotReadable { .. } => ErrorCode::FileNotReadable,
            ConfigError::DirectoryNotFound { .. } => ErrorCode::DirectoryNotFound,
            ConfigError::DirectoryNotReadable { .. } => ErrorCode::DirectoryNotReadable,
            ConfigError::PathResolution { .. } => ErrorCode::PathResolution,
            ConfigError::InvalidFileFormat { .. } => ErrorCode::InvalidFileFormat,
            ConfigError::LoadError { .. } => ErrorCode::LoadError,
        }
    }

    // Convenience constructors

    pub fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// A value of the given kind cannot be stored under `key`.
    pub fn invalid_value(key: &str, kind: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!(
                "Invalid configuration value for key \"{}\". Expected: list, map, null, or scalar (bool, number, string). Received: {}.",
                key, kind
            ),
        }
    }

    pub fn cannot_wrap(key: &str, kind: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!(
                "Cannot wrap configuration key \"{}\". Expected a map value, received {}.",
                key, kind
            ),
        }
    }

    pub fn not_a_list(key: &str, kind: &str) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!(
                "Cannot extend configuration key \"{}\". Existing value is a {}, not a list.",
                key, kind
            ),
        }
    }

    pub fn cannot_read(key: &str, reason: impl std::fmt::Display) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("Cannot read configuration key \"{}\": {}.", key, reason),
        }
    }

    pub fn key_must_be_string(parent: &str, kind: &str) -> Self {
        ConfigError::KeyMustBeString {
            parent: parent.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn file_not_found(path: &Path) -> Self {
        ConfigError::FileNotFound {
            path: path.to_path_buf(),
        }
    }

    pub fn invalid_format(path: &Path, reason: impl Into<String>) -> Self {
        ConfigError::InvalidFileFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn load(path: &Path, source: impl Into<Cause>) -> Self {
        ConfigError::LoadError {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
