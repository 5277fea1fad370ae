//! Core error types for sleepwise-core.
//!
//! "No data" is never an error in this crate; it is reported in-band through
//! sentinels and availability flags. The variants here are reserved for
//! contract violations by the caller and for configuration problems.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::events::EventType;

/// Core error type for sleepwise-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input contract violations
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    SerializeFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Input contract violations. These indicate a bug in whoever built the
/// event list, so the pipeline rejects the whole call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// End instant not strictly after start instant
    #[error("Invalid time range for event '{event_id}': end_time ({end}) must be greater than start_time ({start})")]
    InvalidTimeRange {
        event_id: String,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },

    /// Sleep delay outside 0..=180 minutes
    #[error("Sleep delay for event '{event_id}' must be within 0-180 minutes, got {value}")]
    SleepDelayOutOfRange { event_id: String, value: i64 },

    /// Sleep delay present on an event that is not a night sleep
    #[error("Sleep delay is only allowed on sleep events, event '{event_id}' is {event_type}")]
    SleepDelayOnNonSleep {
        event_id: String,
        event_type: EventType,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SerializeFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::SleepDelayOutOfRange {
            event_id: "e1".into(),
            value: 200,
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("0-180"));
    }

    #[test]
    fn test_toml_error_becomes_parse_failed() {
        let toml_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: ConfigError = toml_err.into();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }
}
