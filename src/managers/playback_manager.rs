//! Playback Manager for Leto.
//!
//! Holds a copy of the current reading state, splits its text into segments,
//! tracks the reading position, and persists progress into the saved-state
//! library. The timing source that calls [`PlaybackManager::advance`] lives
//! outside this crate.

use std::time::Duration;

use tracing::debug;

use crate::managers::saved_state_manager::{SavedStateManager, SavedStateManagerTrait};
use crate::types::config::ReadingConfig;
use crate::types::errors::SavedStateError;
use crate::types::reading::ReadingState;

/// Trait defining the playback contract the orchestrator drives.
pub trait PlaybackManagerTrait {
    /// Replaces the manager's copy of the state (including its position).
    fn load_state(&mut self, state: &ReadingState);
    fn set_config(&mut self, config: &ReadingConfig);
    fn setup_segments(&mut self, text: &str);
    fn clamp_position(&mut self);
    fn position(&self) -> usize;
    fn start_playback(&mut self);
    fn stop_playback(&mut self);
    fn is_playing(&self) -> bool;
    /// Allows calls into host storage; persistence is skipped until then.
    fn enable_interop(&mut self);
    fn persist_current_state(&mut self) -> Result<(), SavedStateError>;
    fn rename_persisted_state(&mut self, old_title: &str, new_title: &str)
        -> Result<(), SavedStateError>;
}

/// A group of words shown together.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    /// Word index of the first word in this segment.
    pub first_word: usize,
    pub word_count: usize,
}

impl Segment {
    fn ends_sentence(&self) -> bool {
        self.text
            .trim_end_matches(|c: char| c == '"' || c == '\'' || c == ')')
            .ends_with(['.', '!', '?'])
    }
}

/// Playback manager over an in-memory segmentation.
pub struct PlaybackManager {
    state: ReadingState,
    config: ReadingConfig,
    segments: Vec<Segment>,
    token_count: usize,
    position: usize,
    playing: bool,
    interop_allowed: bool,
    library: Option<SavedStateManager>,
}

impl PlaybackManager {
    /// Creates a manager for `state` and segments its text right away.
    pub fn new(
        state: &ReadingState,
        config: &ReadingConfig,
        library: Option<SavedStateManager>,
    ) -> Self {
        let mut manager = Self {
            state: state.clone(),
            config: config.clone(),
            segments: Vec::new(),
            token_count: 0,
            position: state.position(),
            playing: false,
            interop_allowed: false,
            library,
        };
        manager.setup_segments(state.text());
        manager.clamp_position();
        manager
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn interop_allowed(&self) -> bool {
        self.interop_allowed
    }

    /// The segment containing the current position.
    pub fn current_segment(&self) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| self.position < s.first_word + s.word_count)
    }

    /// Moves to `position`, clamped to the text.
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.token_count);
    }

    /// Shows the next segment and moves the position past it.
    ///
    /// Returns `None` when stopped or at the end; reaching the end stops playback.
    pub fn advance(&mut self) -> Option<Segment> {
        if !self.playing {
            return None;
        }
        let Some(segment) = self.current_segment().cloned() else {
            self.playing = false;
            return None;
        };
        self.position = (segment.first_word + segment.word_count).min(self.token_count);
        if self.position >= self.token_count {
            self.playing = false;
        }
        Some(segment)
    }

    /// How long `segment` stays on screen at the configured speed.
    pub fn segment_duration(&self, segment: &Segment) -> Duration {
        let wpm = u64::from(self.config.words_per_minute.max(1));
        let mut millis = 60_000 * segment.word_count as u64 / wpm;
        if self.config.pause_on_punctuation && segment.ends_sentence() {
            millis += millis / 2;
        }
        Duration::from_millis(millis)
    }

    fn snapshot(&self) -> ReadingState {
        let mut snapshot = self.state.clone();
        snapshot.set_position(self.position);
        snapshot.touch();
        snapshot
    }
}

impl PlaybackManagerTrait for PlaybackManager {
    fn load_state(&mut self, state: &ReadingState) {
        self.state = state.clone();
        self.position = state.position();
    }

    fn set_config(&mut self, config: &ReadingConfig) {
        self.config = config.clone();
    }

    /// Splits `text` into segments of `words_per_segment` words.
    fn setup_segments(&mut self, text: &str) {
        let words: Vec<&str> = text.split_whitespace().collect();
        let per_segment = self.config.words_per_segment.max(1) as usize;

        self.token_count = words.len();
        self.segments = words
            .chunks(per_segment)
            .enumerate()
            .map(|(i, chunk)| Segment {
                text: chunk.join(" "),
                first_word: i * per_segment,
                word_count: chunk.len(),
            })
            .collect();
        debug!(
            segments = self.segments.len(),
            words = self.token_count,
            "Segmented text"
        );
    }

    fn clamp_position(&mut self) {
        self.position = self.position.min(self.token_count);
    }

    fn position(&self) -> usize {
        self.position
    }

    /// Starts playback, rewinding first if the position is at the end.
    fn start_playback(&mut self) {
        if self.position >= self.token_count {
            self.position = 0;
        }
        self.playing = self.token_count > 0;
    }

    fn stop_playback(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn enable_interop(&mut self) {
        self.interop_allowed = true;
    }

    fn persist_current_state(&mut self) -> Result<(), SavedStateError> {
        if !self.interop_allowed {
            debug!("Interop not enabled yet, skipping persistence");
            return Ok(());
        }
        let Some(library) = &self.library else {
            return Ok(());
        };
        library.save_state(&self.snapshot())
    }

    fn rename_persisted_state(
        &mut self,
        old_title: &str,
        new_title: &str,
    ) -> Result<(), SavedStateError> {
        if self.state.title() != new_title {
            self.state.set_title(new_title);
        }
        if !self.interop_allowed {
            debug!("Interop not enabled yet, skipping rename");
            return Ok(());
        }
        let Some(library) = &self.library else {
            return Ok(());
        };
        library.rename_state(old_title, &self.snapshot())
    }
}
