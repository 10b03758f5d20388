// Leto services
// Services provide the stateless pieces: state codec, web extraction, file import, config storage, host interop.

pub mod config_store;
pub mod content_extractor;
pub mod file_import;
pub mod site_interaction;
pub mod state_codec;
