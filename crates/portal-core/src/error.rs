//! Error types for the core crate.

use thiserror::Error;

/// Errors raised by a key/value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is not available in this environment.
    #[error("storage unavailable")]
    Unavailable,

    /// The backend failed to read or write.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The in-memory lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed but unusable values.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
