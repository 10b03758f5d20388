use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

pub const MIN_WORDS_PER_MINUTE: u32 = 50;
pub const MAX_WORDS_PER_MINUTE: u32 = 2000;
pub const MAX_WORDS_PER_SEGMENT: u32 = 5;

/// Playback parameters forwarded to the playback and config managers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
    /// How many words are shown together as one segment.
    pub words_per_segment: u32,
    /// Hold segments ending in sentence punctuation a little longer.
    pub pause_on_punctuation: bool,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 300,
            words_per_segment: 1,
            pause_on_punctuation: true,
        }
    }
}

impl ReadingConfig {
    /// Checks that every value is within its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WORDS_PER_MINUTE..=MAX_WORDS_PER_MINUTE).contains(&self.words_per_minute) {
            return Err(ConfigError::InvalidValue(format!(
                "words_per_minute must be between {} and {}, got {}",
                MIN_WORDS_PER_MINUTE, MAX_WORDS_PER_MINUTE, self.words_per_minute
            )));
        }
        if !(1..=MAX_WORDS_PER_SEGMENT).contains(&self.words_per_segment) {
            return Err(ConfigError::InvalidValue(format!(
                "words_per_segment must be between 1 and {}, got {}",
                MAX_WORDS_PER_SEGMENT, self.words_per_segment
            )));
        }
        Ok(())
    }
}
