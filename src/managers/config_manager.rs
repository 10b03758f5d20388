//! Config Manager for Leto.
//!
//! Applies reading configs to the running session and keeps the persisted copy
//! in step through an optional [`ConfigStoreTrait`].

use tracing::{debug, info};

use crate::services::config_store::{ConfigStore, ConfigStoreTrait};
use crate::types::config::ReadingConfig;
use crate::types::errors::ConfigError;

/// Trait defining the config contract the orchestrator drives.
pub trait ConfigManagerTrait {
    /// Persists `config`, installs it, and calls `resegment` when the change
    /// affects how text is split. Nothing is installed if persisting fails.
    fn apply(
        &mut self,
        config: &ReadingConfig,
        resegment: &mut dyn FnMut(&ReadingConfig),
    ) -> Result<(), ConfigError>;
    /// The stored config, if one was saved before.
    fn load_persisted(&self) -> Result<Option<ReadingConfig>, ConfigError>;
    fn config(&self) -> &ReadingConfig;
}

/// Config manager with optional file persistence.
pub struct ConfigManager<S: ConfigStoreTrait = ConfigStore> {
    config: ReadingConfig,
    store: Option<S>,
}

impl<S: ConfigStoreTrait> ConfigManager<S> {
    pub fn new(config: &ReadingConfig, store: Option<S>) -> Self {
        Self {
            config: config.clone(),
            store,
        }
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }
}

impl<S: ConfigStoreTrait> ConfigManagerTrait for ConfigManager<S> {
    fn apply(
        &mut self,
        config: &ReadingConfig,
        resegment: &mut dyn FnMut(&ReadingConfig),
    ) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(store) = &self.store {
            store.save(config)?;
            debug!(path = %store.get_config_path().display(), "Persisted reading config");
        }

        let resegment_needed = self.config.words_per_segment != config.words_per_segment;
        self.config = config.clone();

        if resegment_needed {
            debug!(
                words_per_segment = config.words_per_segment,
                "Segment size changed, re-segmenting"
            );
            resegment(config);
        }

        info!(
            words_per_minute = config.words_per_minute,
            words_per_segment = config.words_per_segment,
            "Applied reading config"
        );
        Ok(())
    }

    fn load_persisted(&self) -> Result<Option<ReadingConfig>, ConfigError> {
        match &self.store {
            Some(store) => store.load(),
            None => Ok(None),
        }
    }

    fn config(&self) -> &ReadingConfig {
        &self.config
    }
}
