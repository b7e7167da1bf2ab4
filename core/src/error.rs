//! Error types and handling for Scene Browser Core

use thiserror::Error;

/// Result type alias for Scene Browser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Scene Browser Core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend listing errors
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid regex filter '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("Invalid configuration format: {message}")]
    InvalidFormat { message: String },

    #[error("Settings cannot be modified in this session")]
    ReadOnly,
}

/// Errors reported by a storage backend while listing a directory.
///
/// These never abort a search; the walker logs them and skips the branch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("Path not found: {path}")]
    NotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Network error for {path}: {message}")]
    Network { path: String, message: String },

    #[error("Backend not configured: {backend}")]
    Unavailable { backend: String },
}

impl ListingError {
    /// Map an IO error raised while listing `path`
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ListingError::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => ListingError::PermissionDenied {
                path: path.to_string(),
            },
            _ => ListingError::Network {
                path: path.to_string(),
                message: err.to_string(),
            },
        }
    }
}
