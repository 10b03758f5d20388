//! App Core for Leto.
//!
//! Central struct holding the database, extractor, saved-state library, and
//! the state orchestrator, and running the startup sequence.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::database::connection::Database;
use crate::managers::config_manager::ConfigManager;
use crate::managers::orchestrator::StateOrchestrator;
use crate::managers::playback_manager::PlaybackManager;
use crate::managers::saved_state_manager::{SavedStateManager, SavedStateManagerTrait};
use crate::services::config_store::ConfigStore;
use crate::services::content_extractor::ContentExtractor;
use crate::services::site_interaction::HostSite;
use crate::types::errors::OrchestratorError;

/// The orchestrator wired to the concrete managers.
pub type Orchestrator = StateOrchestrator<HostSite, PlaybackManager, ConfigManager>;

/// Central application struct holding all managers and services.
pub struct App {
    pub db: Arc<Database>,
    pub extractor: ContentExtractor,
    pub library: SavedStateManager,
    pub config_store: Option<ConfigStore>,
    pub orchestrator: Orchestrator,
}

impl App {
    /// Opens the database at `db_path` and persists the config at `config_path`
    /// (or the platform default when `None`).
    pub fn new(
        db_path: &str,
        config_path: Option<PathBuf>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;
        Self::with_database(db, Some(ConfigStore::new(config_path)))
    }

    /// Builds an app around an already opened database.
    ///
    /// Without a config store the reading config lives only in memory.
    pub fn with_database(
        db: Database,
        config_store: Option<ConfigStore>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(db);
        let extractor = ContentExtractor::new()
            .map_err(|e| format!("ContentExtractor init failed: {}", e))?;

        Ok(Self {
            library: SavedStateManager::new(db.clone()),
            db,
            extractor,
            config_store,
            orchestrator: StateOrchestrator::new(HostSite::new()),
        })
    }

    /// Startup sequence: demo state and default config, managers, first render.
    pub fn startup(&mut self) -> Result<(), OrchestratorError> {
        let library = self.library.clone();
        let store = self.config_store.clone();

        self.orchestrator.trigger_on_initialized(move |state, config| {
            (
                PlaybackManager::new(state, config, Some(library)),
                ConfigManager::new(config, store),
            )
        })?;
        self.orchestrator.on_first_render()?;

        let saved = self.library.list_states().map(|s| s.len()).unwrap_or(0);
        info!(saved_states = saved, "Leto started");
        Ok(())
    }

    /// Stops playback and stores the current progress.
    pub fn shutdown(&mut self) -> Result<(), OrchestratorError> {
        self.orchestrator.stop_playback()?;
        self.orchestrator.persist_current_state()
    }
}
