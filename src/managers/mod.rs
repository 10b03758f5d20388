// Leto state managers
// Managers hold live state: the orchestrator, playback, config, and the saved-state library.

pub mod config_manager;
pub mod orchestrator;
pub mod playback_manager;
pub mod saved_state_manager;
