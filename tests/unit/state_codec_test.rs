//! Unit tests for importing and exporting reading states as JSON.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use leto::services::state_codec::FORMAT_VERSION;
use leto::types::errors::ImportError;
use leto::types::reading::{ReadingSource, ReadingState, DEFAULT_NEW_TEXT, DEFAULT_NEW_TITLE};

fn import(payload: &str) -> Result<ReadingState, ImportError> {
    ReadingState::import_from_json(payload, ReadingSource::JsonImport, Some("pasted json"))
}

#[test]
fn test_import_only_text_uses_defaults() {
    let before = Utc::now();
    let state = import(r#"{"Text":"hello world"}"#).unwrap();

    assert_eq!(state.title(), DEFAULT_NEW_TITLE);
    assert_eq!(state.text(), "hello world");
    assert_eq!(state.position(), 0);
    assert_eq!(state.source(), ReadingSource::JsonImport);
    assert_eq!(state.source_description(), Some("pasted json"));
    assert!(state.last_read() >= before);
}

#[test]
fn test_import_full_payload() {
    let payload = json!({
        "Title": "Chapter 1",
        "Text": "It was a bright cold day in April",
        "Position": 4,
        "LastRead": "2024-02-03T04:05:06Z",
        "Source": "WebsiteExtract",
        "SourceDescription": "Extracted from example.com",
        "Version": "1",
        "Unknown": [1, 2, 3]
    });
    let state = import(&payload.to_string()).unwrap();

    assert_eq!(state.title(), "Chapter 1");
    assert_eq!(state.position(), 4);
    assert_eq!(state.last_read(), Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap());
    assert_eq!(state.source(), ReadingSource::WebsiteExtract);
    assert_eq!(state.source_description(), Some("Extracted from example.com"));
}

#[test]
fn test_import_numeric_source() {
    let state = import(r#"{"Text":"a b","Source":5}"#).unwrap();
    assert_eq!(state.source(), ReadingSource::FileUpload);
}

#[test]
fn test_import_unreadable_optional_fields_degrade() {
    let state = import(r#"{"Text":"a b","Source":42,"LastRead":"yesterday","Position":"x"}"#)
        .unwrap();
    assert_eq!(state.source(), ReadingSource::JsonImport);
    assert_eq!(state.position(), 0);
}

#[test]
fn test_import_position_is_clamped() {
    let state = import(r#"{"Text":"a b c","Position":1000}"#).unwrap();
    assert_eq!(state.position(), 3);
}

#[test]
fn test_import_empty_text_becomes_placeholder() {
    let state = import(r#"{"Text":"  "}"#).unwrap();
    assert_eq!(state.text(), DEFAULT_NEW_TEXT);
}

#[test]
fn test_import_missing_text_is_missing_field() {
    assert_eq!(
        import(r#"{"Title":"no body"}"#).unwrap_err(),
        ImportError::MissingField("Text".to_string())
    );
    assert_eq!(
        import(r#"{"Text":17}"#).unwrap_err(),
        ImportError::MissingField("Text".to_string())
    );
}

#[test]
fn test_import_malformed_input() {
    for payload in ["", "not json", "{\"Text\":", "[1,2]", "\"Text\"", "null"] {
        assert!(
            matches!(import(payload), Err(ImportError::MalformedInput(_))),
            "payload {:?} should be malformed",
            payload
        );
    }
}

#[test]
fn test_export_shape() {
    let state = ReadingState::new(
        "Export me",
        "one two three",
        ReadingSource::ClipboardPaste,
        Some("clipboard".to_string()),
        Some(Utc.with_ymd_and_hms(2022, 1, 2, 3, 4, 5).unwrap()),
    )
    .with_position(2);

    let value: Value = serde_json::from_str(&state.export_json()).unwrap();
    assert_eq!(value["Title"], "Export me");
    assert_eq!(value["Text"], "one two three");
    assert_eq!(value["Position"], 2);
    assert_eq!(value["LastRead"], "2022-01-02T03:04:05+00:00");
    assert_eq!(value["Source"], "ClipboardPaste");
    assert_eq!(value["SourceDescription"], "clipboard");
    assert_eq!(value["Version"], FORMAT_VERSION);
}

#[test]
fn test_export_omits_missing_description() {
    let state = ReadingState::blank(ReadingSource::NewBlank, None);
    assert!(state.export_value().get("SourceDescription").is_none());
}

#[test]
fn test_export_then_import_preserves_state() {
    let state = ReadingState::new(
        "Round trip",
        "some words to read again",
        ReadingSource::FileUpload,
        Some("notes.txt".to_string()),
        None,
    )
    .with_position(3);

    let restored =
        ReadingState::import_from_json(&state.export_json(), ReadingSource::Demo, None).unwrap();
    assert_eq!(restored, state);
}
