// Leto Config Store
// Persists the reading configuration as a JSON file at the platform-specific config path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::config::ReadingConfig;
use crate::types::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = "reading_config.json";

/// Trait defining the config store interface.
pub trait ConfigStoreTrait {
    fn load(&self) -> Result<Option<ReadingConfig>, ConfigError>;
    fn save(&self, config: &ReadingConfig) -> Result<(), ConfigError>;
    fn reset(&self) -> Result<ReadingConfig, ConfigError>;
    fn get_config_path(&self) -> &Path;
}

/// Config store backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Creates a new ConfigStore.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses `reading_config.json` in the platform config directory.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join(CONFIG_FILE_NAME));
        Self { config_path }
    }
}

impl ConfigStoreTrait for ConfigStore {
    /// Loads the stored config.
    ///
    /// Returns `None` when no file exists yet. A file that cannot be parsed, or
    /// that holds out-of-range values, is an error.
    fn load(&self) -> Result<Option<ReadingConfig>, ConfigError> {
        if !self.config_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: ReadingConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;

        debug!(path = %self.config_path.display(), "Loaded reading config");
        Ok(Some(config))
    }

    /// Writes the config, creating parent directories if needed.
    fn save(&self, config: &ReadingConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Overwrites the stored config with defaults and returns them.
    fn reset(&self) -> Result<ReadingConfig, ConfigError> {
        let defaults = ReadingConfig::default();
        self.save(&defaults)?;
        Ok(defaults)
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
