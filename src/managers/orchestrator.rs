//! State Orchestrator for Leto.
//!
//! Owns the live reading state and config and keeps the playback and config
//! managers in step with them. The managers only exist once the orchestrator
//! has been initialized, so the lifecycle is carried as an enum rather than
//! optional fields.

use std::mem;

use tracing::{debug, info, warn};

use crate::managers::config_manager::ConfigManagerTrait;
use crate::managers::playback_manager::PlaybackManagerTrait;
use crate::services::site_interaction::SiteInteraction;
use crate::types::config::ReadingConfig;
use crate::types::errors::OrchestratorError;
use crate::types::reading::{ReadingSource, ReadingState, DEFAULT_NEW_TEXT};
use crate::types::upload::UploadedFile;

/// Where the orchestrator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// State and config may be set; no managers yet.
    Uninitialized,
    /// Managers constructed.
    Initialized,
    /// First render happened: interop is enabled.
    Ready,
}

/// Everything that exists once the managers have been constructed.
struct Live<P, C> {
    state: ReadingState,
    config: ReadingConfig,
    playback: P,
    config_manager: C,
}

enum Lifecycle<P, C> {
    Uninitialized {
        state: Option<ReadingState>,
        config: Option<ReadingConfig>,
    },
    Initialized(Live<P, C>),
    Ready(Live<P, C>),
}

impl<P, C> Lifecycle<P, C> {
    fn empty() -> Self {
        Lifecycle::Uninitialized {
            state: None,
            config: None,
        }
    }
}

/// Coordinates state changes between the host and the managers.
pub struct StateOrchestrator<S, P, C>
where
    S: SiteInteraction,
    P: PlaybackManagerTrait,
    C: ConfigManagerTrait,
{
    site: S,
    lifecycle: Lifecycle<P, C>,
}

impl<S, P, C> StateOrchestrator<S, P, C>
where
    S: SiteInteraction,
    P: PlaybackManagerTrait,
    C: ConfigManagerTrait,
{
    pub fn new(site: S) -> Self {
        Self {
            site,
            lifecycle: Lifecycle::empty(),
        }
    }

    // === Accessors ===

    pub fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Uninitialized { .. } => Phase::Uninitialized,
            Lifecycle::Initialized(_) => Phase::Initialized,
            Lifecycle::Ready(_) => Phase::Ready,
        }
    }

    pub fn state(&self) -> Option<&ReadingState> {
        match &self.lifecycle {
            Lifecycle::Uninitialized { state, .. } => state.as_ref(),
            Lifecycle::Initialized(live) | Lifecycle::Ready(live) => Some(&live.state),
        }
    }

    pub fn config(&self) -> Option<&ReadingConfig> {
        match &self.lifecycle {
            Lifecycle::Uninitialized { config, .. } => config.as_ref(),
            Lifecycle::Initialized(live) | Lifecycle::Ready(live) => Some(&live.config),
        }
    }

    pub fn site(&self) -> &S {
        &self.site
    }

    pub fn playback(&self) -> Option<&P> {
        self.live().map(|live| &live.playback)
    }

    pub fn config_manager(&self) -> Option<&C> {
        self.live().map(|live| &live.config_manager)
    }

    fn live(&self) -> Option<&Live<P, C>> {
        match &self.lifecycle {
            Lifecycle::Uninitialized { .. } => None,
            Lifecycle::Initialized(live) | Lifecycle::Ready(live) => Some(live),
        }
    }

    fn live_mut(&mut self) -> Option<&mut Live<P, C>> {
        match &mut self.lifecycle {
            Lifecycle::Uninitialized { .. } => None,
            Lifecycle::Initialized(live) | Lifecycle::Ready(live) => Some(live),
        }
    }

    fn require_live(&mut self, action: &str) -> Result<&mut Live<P, C>, OrchestratorError> {
        self.live_mut().ok_or_else(|| {
            OrchestratorError::Precondition(format!("cannot {} before initialization", action))
        })
    }

    fn require_state(&self, action: &str) -> Result<(), OrchestratorError> {
        match self.state() {
            Some(_) => Ok(()),
            None => Err(OrchestratorError::Precondition(format!(
                "cannot {} without a state",
                action
            ))),
        }
    }

    // === Lifecycle ===

    /// Constructs the managers from the current state and config.
    ///
    /// Fails if either is missing or the managers already exist.
    pub fn initialize<F>(&mut self, build: F) -> Result<(), OrchestratorError>
    where
        F: FnOnce(&ReadingState, &ReadingConfig) -> (P, C),
    {
        match mem::replace(&mut self.lifecycle, Lifecycle::empty()) {
            Lifecycle::Uninitialized {
                state: Some(state),
                config: Some(config),
            } => {
                let (playback, config_manager) = build(&state, &config);
                let mut live = Live {
                    state,
                    config,
                    playback,
                    config_manager,
                };
                Self::resync(&mut live);
                info!(title = live.state.title(), "Orchestrator initialized");
                self.lifecycle = Lifecycle::Initialized(live);
                Ok(())
            }
            other => {
                let message = match &other {
                    Lifecycle::Uninitialized { .. } => {
                        "state and config must be set before initialization"
                    }
                    _ => "orchestrator is already initialized",
                };
                self.lifecycle = other;
                Err(OrchestratorError::Precondition(message.to_string()))
            }
        }
    }

    /// Installs the demo state and default config, then initializes.
    pub fn trigger_on_initialized<F>(&mut self, build: F) -> Result<(), OrchestratorError>
    where
        F: FnOnce(&ReadingState, &ReadingConfig) -> (P, C),
    {
        if self.phase() != Phase::Uninitialized {
            return Err(OrchestratorError::Precondition(
                "orchestrator is already initialized".to_string(),
            ));
        }
        self.set_state(ReadingState::demo(ReadingSource::Demo, None));
        self.set_config(ReadingConfig::default())?;
        self.initialize(build)
    }

    /// Moves to `Ready`: enables interop, applies a persisted config if there
    /// is one, and starts playback when the demo is showing.
    pub fn on_first_render(&mut self) -> Result<(), OrchestratorError> {
        let mut live = match mem::replace(&mut self.lifecycle, Lifecycle::empty()) {
            Lifecycle::Initialized(live) => live,
            other => {
                self.lifecycle = other;
                return Err(OrchestratorError::Precondition(
                    "first render requires an initialized orchestrator".to_string(),
                ));
            }
        };
        live.playback.enable_interop();
        let persisted = live.config_manager.load_persisted();
        self.lifecycle = Lifecycle::Ready(live);

        match persisted {
            Ok(Some(config)) => {
                debug!("Applying persisted reading config");
                if let Err(e) = self.set_config(config) {
                    warn!(error = %e, "Persisted reading config could not be applied");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable persisted reading config"),
        }

        if let Some(live) = self.live_mut() {
            if live.state.is_demo() {
                live.playback.start_playback();
                info!("Auto-started demo playback");
            }
        }
        Ok(())
    }

    // === State and config ===

    /// Replaces the current state and resynchronizes everything that depends on it.
    ///
    /// Playback of the previous state is stopped before anything else changes.
    /// Before initialization the state is only stored.
    pub fn set_state(&mut self, new_state: ReadingState) {
        match &mut self.lifecycle {
            Lifecycle::Uninitialized { state, .. } => {
                self.site.sync_editor(new_state.title(), new_state.text());
                *state = Some(new_state);
            }
            Lifecycle::Initialized(live) | Lifecycle::Ready(live) => {
                live.playback.stop_playback();
                live.state = new_state;
                self.site.sync_editor(live.state.title(), live.state.text());
                Self::resync(live);
            }
        }
        debug!(title = self.state().map(|s| s.title()), "State installed");
        self.site.notify_state_changed();
    }

    /// Installs a new config and forwards it to the managers.
    ///
    /// The config manager re-segments the text through a callback when the
    /// segment size changes. If it fails, the previous config is reinstalled
    /// and the text re-segmented for it.
    pub fn set_config(&mut self, new_config: ReadingConfig) -> Result<(), OrchestratorError> {
        new_config.validate()?;

        match &mut self.lifecycle {
            Lifecycle::Uninitialized { config, .. } => *config = Some(new_config),
            Lifecycle::Initialized(live) | Lifecycle::Ready(live) => {
                let previous = mem::replace(&mut live.config, new_config);
                live.playback.set_config(&live.config);

                let playback = &mut live.playback;
                let state = &live.state;
                let applied = live.config_manager.apply(&live.config, &mut |config: &ReadingConfig| {
                    playback.set_config(config);
                    playback.setup_segments(state.text());
                    playback.clamp_position();
                });

                if let Err(e) = applied {
                    warn!(error = %e, "Reading config not applied, restoring previous config");
                    live.config = previous;
                    live.playback.set_config(&live.config);
                    live.playback.setup_segments(live.state.text());
                    live.playback.clamp_position();
                    let position = live.playback.position();
                    live.state.set_position(position);
                    return Err(e.into());
                }
                let position = live.playback.position();
                live.state.set_position(position);
            }
        }
        self.site.notify_state_changed();
        Ok(())
    }

    /// Pushes a fresh copy of the state into playback and re-derives segments.
    fn resync(live: &mut Live<P, C>) {
        live.playback.load_state(&live.state);
        live.playback.setup_segments(live.state.text());
        live.playback.clamp_position();
        let position = live.playback.position();
        live.state.set_position(position);
    }

    /// Copies the playback position into the state.
    pub fn sync_progress(&mut self) {
        if let Some(live) = self.live_mut() {
            let position = live.playback.position();
            live.state.set_position(position);
        }
    }

    // === Playback ===

    pub fn start_playback(&mut self) -> Result<(), OrchestratorError> {
        self.require_live("start playback")?.playback.start_playback();
        Ok(())
    }

    pub fn stop_playback(&mut self) -> Result<(), OrchestratorError> {
        let live = self.require_live("stop playback")?;
        live.playback.stop_playback();
        let position = live.playback.position();
        live.state.set_position(position);
        Ok(())
    }

    pub fn persist_current_state(&mut self) -> Result<(), OrchestratorError> {
        self.require_live("persist the state")?
            .playback
            .persist_current_state()?;
        Ok(())
    }

    // === Handlers ===

    /// Replaces the state with a blank one and persists it.
    pub fn handle_new_text(&mut self) -> Result<(), OrchestratorError> {
        self.require_live("create a new text")?;
        self.set_state(ReadingState::blank(ReadingSource::NewBlank, None));
        self.persist_current_state()
    }

    /// Replaces the title with the clipboard text.
    pub async fn handle_paste_title(&mut self) -> Result<(), OrchestratorError> {
        self.require_state("paste a title")?;
        let pasted = self.site.read_clipboard_text().await?;
        self.replace_current(|state| state.set_title(pasted.trim()))
    }

    /// Replaces the text with the clipboard text.
    pub async fn handle_paste_text(&mut self) -> Result<(), OrchestratorError> {
        self.require_state("paste text")?;
        let pasted = self.site.read_clipboard_text().await?;
        self.replace_current(|state| state.set_text(pasted))
    }

    /// Replaces the text with the text extracted from `files`.
    pub async fn handle_file_upload(
        &mut self,
        files: &[UploadedFile],
    ) -> Result<(), OrchestratorError> {
        self.require_state("upload files")?;
        let extracted = self.site.extract_text_from_files(files).await?;
        info!(files = files.len(), chars = extracted.len(), "Imported text from files");
        self.replace_current(|state| state.set_text(extracted))
    }

    /// Applies an edit of the text field.
    ///
    /// Blank input falls back to the placeholder with a full resync; otherwise
    /// only the segmentation is rebuilt. The result is persisted either way.
    pub fn handle_text_changed(&mut self, text: &str) -> Result<(), OrchestratorError> {
        self.require_live("change the text")?;
        self.sync_progress();
        let trimmed = text.trim();

        if trimmed.is_empty() {
            self.replace_current(|state| state.set_text(DEFAULT_NEW_TEXT))?;
        } else {
            let live = self.require_live("change the text")?;
            live.state.set_text(trimmed);
            live.playback.load_state(&live.state);
            live.playback.setup_segments(live.state.text());
            live.playback.clamp_position();
            let position = live.playback.position();
            live.state.set_position(position);
        }

        self.persist_current_state()
    }

    /// Applies an edit of the title field and renames the stored record.
    pub fn handle_title_changed(&mut self, title: &str) -> Result<(), OrchestratorError> {
        self.require_live("change the title")?;
        self.sync_progress();
        let live = self.require_live("change the title")?;
        let old_title = live.state.title().to_string();

        live.state.set_title(title);
        live.playback.load_state(&live.state);
        if let Err(e) = live.playback.rename_persisted_state(&old_title, title) {
            live.state.set_title(old_title.as_str());
            live.playback.load_state(&live.state);
            return Err(e.into());
        }
        debug!(old_title = %old_title, new_title = title, "Title changed");
        Ok(())
    }

    /// Applies `mutate` to a copy of the current state and installs it.
    fn replace_current<F>(&mut self, mutate: F) -> Result<(), OrchestratorError>
    where
        F: FnOnce(&mut ReadingState),
    {
        self.sync_progress();
        let mut state = self.state().cloned().ok_or_else(|| {
            OrchestratorError::Precondition("no current state to update".to_string())
        })?;
        mutate(&mut state);
        self.set_state(state);
        Ok(())
    }
}
