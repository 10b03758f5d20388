//! Property-based tests for ReadingConfig persistence.
//!
//! These tests verify that any valid config survives a save/load cycle through
//! the config store, and that out-of-range values are always rejected.

use leto::services::config_store::{ConfigStore, ConfigStoreTrait};
use leto::types::config::{ReadingConfig, MAX_WORDS_PER_MINUTE, MAX_WORDS_PER_SEGMENT, MIN_WORDS_PER_MINUTE};
use leto::types::errors::ConfigError;
use proptest::prelude::*;
use tempfile::TempDir;

fn arb_valid_config() -> impl Strategy<Value = ReadingConfig> {
    (
        MIN_WORDS_PER_MINUTE..=MAX_WORDS_PER_MINUTE,
        1u32..=MAX_WORDS_PER_SEGMENT,
        any::<bool>(),
    )
        .prop_map(|(words_per_minute, words_per_segment, pause_on_punctuation)| ReadingConfig {
            words_per_minute,
            words_per_segment,
            pause_on_punctuation,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Saving then loading yields the same config.
    #[test]
    fn prop_config_store_roundtrip(config in arb_valid_config()) {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(Some(dir.path().join("config.json")));

        store.save(&config).unwrap();
        prop_assert_eq!(store.load().unwrap(), Some(config));
    }

    /// Speeds outside the allowed range never validate.
    #[test]
    fn prop_out_of_range_speed_rejected(
        speed in prop_oneof![0u32..MIN_WORDS_PER_MINUTE, (MAX_WORDS_PER_MINUTE + 1)..u32::MAX],
    ) {
        let config = ReadingConfig { words_per_minute: speed, ..ReadingConfig::default() };
        prop_assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }
}
