//! Core error types for matchclock-core.
//!
//! Operator-level rejections (starting without a valid schedule, adjusting
//! time during play) are reported as [`crate::Event::Rejected`] rather than
//! through these types. The errors here cover configuration I/O and
//! schedule validation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for matchclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
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
}

/// Schedule validation errors.
///
/// The timeline builder assumes a valid schedule; callers run
/// [`crate::ScheduleConfig::validate`] first.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Day start is empty
    #[error("Set schedule parameters first: day start is missing")]
    MissingDayStart,

    /// Fewer than one game configured
    #[error("Set schedule parameters first: at least one game is required")]
    NoGames,

    /// No quarter durations configured
    #[error("At least one quarter is required")]
    NoQuarters,

    /// Built timeline has no segments
    #[error("Timeline is empty")]
    EmptyTimeline,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
