//! Saved State Manager for Leto.
//!
//! Keeps a library of reading states in SQLite, one record per title. Each
//! record stores the exported state JSON so it can be re-imported verbatim.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::errors::SavedStateError;
use crate::types::reading::{ReadingSource, ReadingState};

/// A library entry without its text.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedStateSummary {
    pub title: String,
    pub last_read: Option<DateTime<Utc>>,
    pub updated_at: i64,
}

/// Trait defining saved-state library operations.
pub trait SavedStateManagerTrait {
    fn save_state(&self, state: &ReadingState) -> Result<(), SavedStateError>;
    fn load_state(&self, title: &str) -> Result<ReadingState, SavedStateError>;
    fn rename_state(&self, old_title: &str, state: &ReadingState) -> Result<(), SavedStateError>;
    fn delete_state(&self, title: &str) -> Result<(), SavedStateError>;
    fn list_states(&self) -> Result<Vec<SavedStateSummary>, SavedStateError>;
    fn most_recent(&self) -> Result<Option<ReadingState>, SavedStateError>;
}

/// Saved-state library backed by SQLite.
#[derive(Clone)]
pub struct SavedStateManager {
    db: Arc<Database>,
}

impl SavedStateManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Inserts or replaces the record for the state's title.
    ///
    /// `updated_at` is kept strictly increasing so the library order is stable
    /// even when several saves land in the same millisecond.
    fn upsert(conn: &Connection, state: &ReadingState) -> Result<(), SavedStateError> {
        conn.execute(
            "INSERT INTO saved_states (id, title, payload, last_read, updated_at)
             VALUES (?1, ?2, ?3, ?4, MAX(?5, (SELECT COALESCE(MAX(updated_at), 0) + 1 FROM saved_states)))
             ON CONFLICT(title) DO UPDATE SET
                 payload = excluded.payload,
                 last_read = excluded.last_read,
                 updated_at = excluded.updated_at",
            params![
                Uuid::new_v4().to_string(),
                state.title(),
                state.export_json(),
                state.last_read().to_rfc3339(),
                Utc::now().timestamp_millis(),
            ],
        )
        .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn decode(title: &str, payload: &str) -> Result<ReadingState, SavedStateError> {
        ReadingState::import_from_json(payload, ReadingSource::JsonImport, None).map_err(|e| {
            SavedStateError::SerializationError(format!("saved state '{}': {}", title, e))
        })
    }
}

impl SavedStateManagerTrait for SavedStateManager {
    fn save_state(&self, state: &ReadingState) -> Result<(), SavedStateError> {
        Self::upsert(self.db.connection(), state)?;
        debug!(title = state.title(), "Saved reading state");
        Ok(())
    }

    fn load_state(&self, title: &str) -> Result<ReadingState, SavedStateError> {
        let payload: Option<String> = self
            .db
            .connection()
            .query_row(
                "SELECT payload FROM saved_states WHERE title = ?1",
                params![title],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;

        match payload {
            Some(payload) => Self::decode(title, &payload),
            None => Err(SavedStateError::NotFound(title.to_string())),
        }
    }

    /// Moves the record stored under `old_title` to the state's current title.
    ///
    /// A record already stored under the new title is replaced.
    fn rename_state(&self, old_title: &str, state: &ReadingState) -> Result<(), SavedStateError> {
        let conn = self.db.connection();
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;

        if old_title != state.title() {
            tx.execute("DELETE FROM saved_states WHERE title = ?1", params![old_title])
                .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;
        }
        Self::upsert(&tx, state)?;

        tx.commit()
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;
        debug!(old_title, new_title = state.title(), "Renamed saved reading state");
        Ok(())
    }

    fn delete_state(&self, title: &str) -> Result<(), SavedStateError> {
        let affected = self
            .db
            .connection()
            .execute("DELETE FROM saved_states WHERE title = ?1", params![title])
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(SavedStateError::NotFound(title.to_string()));
        }
        Ok(())
    }

    /// Lists the library, most recently updated first.
    fn list_states(&self) -> Result<Vec<SavedStateSummary>, SavedStateError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare("SELECT title, last_read, updated_at FROM saved_states ORDER BY updated_at DESC")
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let last_read: String = row.get(1)?;
                Ok(SavedStateSummary {
                    title: row.get(0)?,
                    last_read: DateTime::parse_from_rfc3339(&last_read)
                        .ok()
                        .map(|dt| dt.with_timezone(&Utc)),
                    updated_at: row.get(2)?,
                })
            })
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))
    }

    fn most_recent(&self) -> Result<Option<ReadingState>, SavedStateError> {
        let row: Option<(String, String)> = self
            .db
            .connection()
            .query_row(
                "SELECT title, payload FROM saved_states ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| SavedStateError::DatabaseError(e.to_string()))?;

        row.map(|(title, payload)| Self::decode(&title, &payload))
            .transpose()
    }
}
