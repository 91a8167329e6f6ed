//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::WorkforceConfig;

/// Upper bound accepted for `attendance.max_shift_hours`.
const MAX_SHIFT_HOURS_LIMIT: u32 = 48;

/// Loads and validates the engine configuration.
///
/// # Example
///
/// ```no_run
/// use workforce_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config.yaml")?;
/// println!("Shifts close after {}h", loader.config().attendance.max_shift_hours);
/// # Ok::<(), workforce_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: WorkforceConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified YAML file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing
    /// - The file contains invalid YAML
    /// - A value is out of range
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            EngineError::ConfigParseError { message, .. } => EngineError::ConfigParseError {
                path: path_str,
                message,
            },
            other => other,
        })
    }

    /// Loads configuration from `path`, falling back to defaults if the file
    /// does not exist. Parse errors are still reported.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        match Self::load(path) {
            Err(EngineError::ConfigNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml(content: &str) -> EngineResult<Self> {
        let config: WorkforceConfig = if content.trim().is_empty() {
            WorkforceConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?
        };

        Self::validate(&config)?;
        Ok(Self { config })
    }

    fn validate(config: &WorkforceConfig) -> EngineResult<()> {
        let hours = config.attendance.max_shift_hours;
        if hours == 0 || hours > MAX_SHIFT_HOURS_LIMIT {
            return Err(EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: format!(
                    "attendance.max_shift_hours must be between 1 and {MAX_SHIFT_HOURS_LIMIT}, got {hours}"
                ),
            });
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &WorkforceConfig {
        &self.config
    }

    /// Consumes the loader and returns the configuration.
    pub fn into_config(self) -> WorkforceConfig {
        self.config
    }
}
