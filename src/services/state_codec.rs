//! JSON codec for reading states.
//!
//! The serialized shape uses PascalCase keys:
//! `{ "Title", "Text", "Position", "LastRead", "Source", "SourceDescription", "Version" }`.
//! Only `Text` is required on import; every other field degrades to a default.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::types::errors::ImportError;
use crate::types::reading::{ReadingSource, ReadingState};

/// Format tag written into every export.
pub const FORMAT_VERSION: &str = "1";

impl ReadingState {
    /// Imports a state from a serialized JSON object.
    ///
    /// Missing optional fields fall back to `fallback_source`,
    /// `fallback_description`, the current time, or the blank-state title.
    pub fn import_from_json(
        payload: &str,
        fallback_source: ReadingSource,
        fallback_description: Option<&str>,
    ) -> Result<ReadingState, ImportError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| ImportError::MalformedInput(e.to_string()))?;

        let obj = match value {
            Value::Object(map) => map,
            Value::Null => {
                return Err(ImportError::MalformedInput("empty JSON payload".to_string()))
            }
            other => {
                return Err(ImportError::MalformedInput(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
        };

        let text = obj
            .get("Text")
            .and_then(Value::as_str)
            .ok_or_else(|| ImportError::MissingField("Text".to_string()))?
            .to_string();

        let last_read = obj.get("LastRead").and_then(read_timestamp);
        let source = obj
            .get("Source")
            .and_then(read_source)
            .unwrap_or(fallback_source);
        let source_description = obj
            .get("SourceDescription")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| fallback_description.map(str::to_string));

        let title = match obj.get("Title").and_then(Value::as_str) {
            Some(title) => title.to_string(),
            None => ReadingState::blank(source, source_description.clone())
                .title()
                .to_string(),
        };

        let mut state = ReadingState::new(title, text, source, source_description, last_read);
        if let Some(position) = obj.get("Position").and_then(Value::as_u64) {
            state = state.with_position(usize::try_from(position).unwrap_or(usize::MAX));
        }

        info!(
            source = %state.source(),
            source_description = ?state.source_description(),
            version = ?read_version(&obj),
            "Imported reading state from JSON"
        );

        Ok(state)
    }

    /// Serializes the state into the import shape.
    pub fn export_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("Title".to_string(), json!(self.title()));
        obj.insert("Text".to_string(), json!(self.text()));
        obj.insert("Position".to_string(), json!(self.position()));
        obj.insert("LastRead".to_string(), json!(self.last_read().to_rfc3339()));
        obj.insert("Source".to_string(), json!(self.source().name()));
        if let Some(description) = self.source_description() {
            obj.insert("SourceDescription".to_string(), json!(description));
        }
        obj.insert("Version".to_string(), json!(FORMAT_VERSION));
        Value::Object(obj)
    }

    pub fn export_json(&self) -> String {
        self.export_value().to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO timestamps (read as UTC).
fn read_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            warn!(last_read = raw, error = %e, "Ignoring unreadable LastRead");
            None
        }
    }
}

/// Accepts the variant ordinal or its name.
fn read_source(value: &Value) -> Option<ReadingSource> {
    let source = match value {
        Value::Number(n) => n.as_i64().and_then(ReadingSource::from_ordinal),
        Value::String(s) => ReadingSource::from_name(s).or_else(|| {
            s.trim()
                .parse::<i64>()
                .ok()
                .and_then(ReadingSource::from_ordinal)
        }),
        _ => None,
    };
    if source.is_none() {
        warn!(source = %value, "Ignoring unknown Source");
    }
    source
}

fn read_version(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("Version")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
