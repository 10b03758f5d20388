//! Unit tests for the Leto database layer (connection + migrations).

use leto::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use leto::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_tables_and_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for (kind, name) in [
        ("table", "saved_states"),
        ("table", "schema_version"),
        ("index", "idx_saved_states_updated_at"),
    ] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type=?1 AND name=?2",
                [kind, name],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "{} '{}' should exist after migrations", kind, name);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    // Running migrations a second time should not fail
    let result = leto::database::migrations::run_all(db.connection());
    assert!(result.is_ok(), "Running migrations twice should succeed (idempotent)");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_open_file_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("leto.db");

    let db = Database::open(&db_path);
    assert!(db.is_ok(), "open with file path should succeed");
    assert!(db_path.exists(), "Database file should exist on disk");
}

#[test]
fn test_title_is_unique() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();
    let insert = "INSERT INTO saved_states (id, title, payload, last_read, updated_at)
                  VALUES (?1, 'Same', '{}', '2024-01-01T00:00:00Z', 1)";

    conn.execute(insert, ["a"]).expect("first insert should succeed");
    assert!(conn.execute(insert, ["b"]).is_err(), "duplicate title should be rejected");
}
