//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine settings
//! and posting pay policies from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineSettings, PayPolicy};

/// Largest UTC offset a wall clock can have, in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// └── engine.yaml     # UTC offset and undecided sentinels
/// config/postings/
/// └── tournament.yaml # A posting pay policy
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("UTC offset: {} minutes", loader.settings().utc_offset_minutes);
///
/// let policy = ConfigLoader::load_policy("./config/postings/tournament.yaml").unwrap();
/// println!("{} role rates", policy.role_rates.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    settings: EngineSettings,
}

impl ConfigLoader {
    /// Loads `engine.yaml` from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` is missing
    /// - the file contains invalid YAML
    /// - the UTC offset is outside ±14 hours
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let engine_path = path.as_ref().join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&engine_path)?;

        if settings.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(EngineError::ConfigParseError {
                path: engine_path.display().to_string(),
                message: format!(
                    "utc_offset_minutes {} is outside ±{}",
                    settings.utc_offset_minutes, MAX_OFFSET_MINUTES
                ),
            });
        }

        Ok(Self { settings })
    }

    /// Wraps settings that were built in code.
    pub fn from_settings(settings: EngineSettings) -> Self {
        Self { settings }
    }

    /// Loads a posting pay policy from a YAML file.
    pub fn load_policy<P: AsRef<Path>>(path: P) -> EngineResult<PayPolicy> {
        Self::load_yaml::<PayPolicy>(path.as_ref())
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}
