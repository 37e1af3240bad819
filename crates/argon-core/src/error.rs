//! Core error types for argon-core.
//!
//! This module defines the error hierarchy using thiserror. URL parse
//! failures have no variant: the normalizer fails open.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for argon-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Backend read or write failed
    #[error("Store backend failure: {0}")]
    Backend(String),

    /// A stored value has the wrong shape for its key
    #[error("Stored value for '{key}' could not be decoded: {message}")]
    Decode { key: String, message: String },

    /// A value could not be encoded for storage
    #[error("Value for '{key}' could not be encoded: {message}")]
    Encode { key: String, message: String },

    /// The store is temporarily unavailable
    #[error("Store is unavailable")]
    Unavailable,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Validation errors for user-supplied input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Site entry is empty after normalization
    #[error("Site entry is empty")]
    EmptySite,

    /// Site entry does not look like a domain or domain/path
    #[error("Invalid site '{0}': expected a domain such as example.com or example.com/path")]
    InvalidSite(String),

    /// Reminder interval must be at least 1
    #[error("Invalid interval {0}: must be at least 1")]
    InvalidInterval(u32),

    /// Reminder kind is not known
    #[error("Unknown reminder: {0}")]
    UnknownReminder(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StorageError::Unavailable
            }
            _ => StorageError::Backend(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
