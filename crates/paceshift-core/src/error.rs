//! Core error types for paceshift-core.
//!
//! The timer engine itself has no error channel -- it operates on a validated
//! [`Formula`](crate::Formula) and otherwise only clamps. Errors come from
//! formula validation, configuration, and the storage layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for paceshift-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Formula validation errors
    #[error("invalid formula: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Migration failed
    #[error("database migration failed: {0}")]
    MigrationFailed(#[source] rusqlite::Error),

    /// Query execution failed
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Data directory could not be resolved or created
    #[error("data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Formula validation errors.
///
/// Validation is a host-side responsibility; the timer engine assumes the
/// formula it is handed has already passed through here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Phase duration outside the accepted range
    #[error("{phase} duration {secs}s is outside 1..=3600")]
    DurationOutOfRange { phase: &'static str, secs: u32 },

    /// A formula needs at least one round
    #[error("formula needs at least one round")]
    ZeroRounds,

    /// Display name must not be empty
    #[error("formula name must not be empty")]
    EmptyName,
}
