//! RPC method handler for the Leto JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! `handle_method` dispatches a method call to the orchestrator, the
//! extractor, or the saved-state library through the `App` struct.

use serde_json::{json, Map, Value};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::app::App;
use crate::managers::playback_manager::PlaybackManagerTrait;
use crate::managers::saved_state_manager::SavedStateManagerTrait;
use crate::types::config::ReadingConfig;
use crate::types::extraction::ExtractionRequest;
use crate::types::reading::{ReadingSource, ReadingState};
use crate::types::upload::UploadedFile;

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64.decode(input).map_err(|e| format!("base64 decode error: {}", e))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &mut App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Reading state ───
        "state.get" => state_summary(app),
        "state.export" => {
            let state = current_state(app)?;
            Ok(json!({"json": state.export_json()}))
        }
        "state.import" => {
            let payload = params.get("json").and_then(|v| v.as_str()).ok_or("missing json")?;
            let source = match params.get("source").and_then(|v| v.as_str()) {
                Some(name) => ReadingSource::from_name(name)
                    .ok_or_else(|| format!("unknown source: {}", name))?,
                None => ReadingSource::JsonImport,
            };
            let description = params.get("source_description").and_then(|v| v.as_str());
            let state = ReadingState::import_from_json(payload, source, description)
                .map_err(|e| e.to_string())?;
            install_and_persist(app, state)
        }
        "state.scrape" => {
            let request = ExtractionRequest::from_surface(params).map_err(|e| e.to_string())?;
            let state = ReadingState::scrape_from_web(&app.extractor, &request)
                .await
                .map_err(|e| e.to_string())?;
            install_and_persist(app, state)
        }
        "state.new" => {
            app.orchestrator.handle_new_text().map_err(|e| e.to_string())?;
            state_summary(app)
        }
        "state.demo" => {
            app.orchestrator.set_state(ReadingState::demo(ReadingSource::Demo, None));
            state_summary(app)
        }
        "state.paste_title" => {
            stage_clipboard(app, params);
            app.orchestrator.handle_paste_title().await.map_err(|e| e.to_string())?;
            state_summary(app)
        }
        "state.paste_text" => {
            stage_clipboard(app, params);
            app.orchestrator.handle_paste_text().await.map_err(|e| e.to_string())?;
            state_summary(app)
        }
        "state.upload" => {
            let files = parse_files(params)?;
            app.orchestrator.handle_file_upload(&files).await.map_err(|e| e.to_string())?;
            state_summary(app)
        }
        "state.text_changed" => {
            let text = params.get("text").and_then(|v| v.as_str()).ok_or("missing text")?;
            app.orchestrator.handle_text_changed(text).map_err(|e| e.to_string())?;
            state_summary(app)
        }
        "state.title_changed" => {
            let title = params.get("title").and_then(|v| v.as_str()).ok_or("missing title")?;
            app.orchestrator.handle_title_changed(title).map_err(|e| e.to_string())?;
            state_summary(app)
        }

        // ─── Config ───
        "config.get" => {
            let config = app.orchestrator.config().ok_or("config not initialized")?;
            serde_json::to_value(config).map_err(|e| e.to_string())
        }
        "config.set" => {
            let current = app.orchestrator.config().cloned().unwrap_or_default();
            let config = merge_config(&current, params)?;
            app.orchestrator.set_config(config).map_err(|e| e.to_string())?;
            let config = app.orchestrator.config().ok_or("config not initialized")?;
            serde_json::to_value(config).map_err(|e| e.to_string())
        }

        // ─── Playback ───
        "playback.start" => {
            app.orchestrator.start_playback().map_err(|e| e.to_string())?;
            Ok(json!({"playing": is_playing(app)}))
        }
        "playback.stop" => {
            app.orchestrator.stop_playback().map_err(|e| e.to_string())?;
            Ok(json!({"playing": is_playing(app)}))
        }

        // ─── Library ───
        "library.list" => {
            let entries = app.library.list_states().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = entries
                .iter()
                .map(|s| json!({"title": s.title, "last_read": s.last_read.map(|t| t.to_rfc3339()), "updated_at": s.updated_at}))
                .collect();
            Ok(json!(arr))
        }
        "library.open" => {
            let title = params.get("title").and_then(|v| v.as_str()).ok_or("missing title")?;
            let state = app.library.load_state(title).map_err(|e| e.to_string())?;
            app.orchestrator.set_state(state);
            state_summary(app)
        }
        "library.delete" => {
            let title = params.get("title").and_then(|v| v.as_str()).ok_or("missing title")?;
            app.library.delete_state(title).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        "ping" => Ok(json!({"pong": true})),

        _ => Err(format!("unknown method: {}", method)),
    }
}

fn current_state(app: &App) -> Result<&ReadingState, String> {
    app.orchestrator.state().ok_or_else(|| "no reading state".to_string())
}

fn is_playing(app: &App) -> bool {
    app.orchestrator.playback().map_or(false, |p| p.is_playing())
}

fn state_summary(app: &App) -> Result<Value, String> {
    let state = current_state(app)?;
    Ok(json!({
        "title": state.title(),
        "text": state.text(),
        "position": state.position(),
        "token_count": state.token_count(),
        "last_read": state.last_read().to_rfc3339(),
        "source": state.source().name(),
        "source_description": state.source_description(),
        "playing": is_playing(app),
    }))
}

fn install_and_persist(app: &mut App, state: ReadingState) -> Result<Value, String> {
    app.orchestrator.set_state(state);
    app.orchestrator.persist_current_state().map_err(|e| e.to_string())?;
    state_summary(app)
}

fn stage_clipboard(app: &App, params: &Value) {
    if let Some(text) = params.get("clipboard").and_then(|v| v.as_str()) {
        app.orchestrator.site().stage_clipboard(text);
    }
}

/// Reads `files: [{name, content_type?, data}]` with base64 `data`.
fn parse_files(params: &Value) -> Result<Vec<UploadedFile>, String> {
    let entries = params.get("files").and_then(|v| v.as_array()).ok_or("missing files")?;
    entries
        .iter()
        .map(|entry| {
            let name = entry.get("name").and_then(|v| v.as_str()).ok_or("missing file name")?;
            let data = entry.get("data").and_then(|v| v.as_str()).ok_or("missing file data")?;
            let mut file = UploadedFile::new(name, base64_decode(data)?);
            file.content_type = entry
                .get("content_type")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            Ok(file)
        })
        .collect()
}

/// Overlays the given fields onto `current`.
fn merge_config(current: &ReadingConfig, params: &Value) -> Result<ReadingConfig, String> {
    let updates = params.as_object().ok_or("config must be an object")?;
    let mut merged: Map<String, Value> = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(e.to_string()),
    };
    for (key, value) in updates {
        if !merged.contains_key(key) {
            return Err(format!("unknown config key: {}", key));
        }
        merged.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(merged)).map_err(|e| format!("invalid config: {}", e))
}
