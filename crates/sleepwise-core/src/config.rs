//! TOML-based analysis configuration.
//!
//! Holds the tunable parts of the pipeline:
//! - Plausibility bounds for night and nap durations
//! - Status thresholds for the schedule rules
//! - The age-band norms table
//!
//! Every field has a default, so a partial file only overrides what it names.
//! The default location is `~/.config/sleepwise/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::stats::PlausibilityBounds;
use crate::validation::{AgeBandTable, ValidationThresholds};

/// Analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub plausibility: PlausibilityBounds,
    #[serde(default)]
    pub thresholds: ValidationThresholds,
    #[serde(default)]
    pub age_bands: AgeBandTable,
}

/// Returns `~/.config/sleepwise[-dev]/` based on SLEEPWISE_ENV.
///
/// Set SLEEPWISE_ENV=dev to use the development directory. Nothing is
/// created on disk.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SLEEPWISE_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("sleepwise-dev")
    } else {
        base_dir.join("sleepwise")
    }
}

impl AnalysisConfig {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Parse from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or the age-band table
    /// does not tile the age axis.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadFailed`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg = Self::from_toml_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded analysis config");
        Ok(cfg)
    }

    /// Load from `path` if given, else from the default location when a file
    /// exists there, else defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load from the default location, returning defaults on any error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load_from(None).unwrap_or_default()
    }

    /// Render as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
