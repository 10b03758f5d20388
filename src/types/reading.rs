use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to a freshly created blank state.
pub const DEFAULT_NEW_TITLE: &str = "New Text";

/// Placeholder body used whenever a state would otherwise have no text.
pub const DEFAULT_NEW_TEXT: &str =
    "Paste, type, or import the text you want to read here, then press play.";

pub const DEMO_TITLE: &str = "Welcome to Leto";

pub const DEMO_TEXT: &str = "Leto shows you one word at a time, right where your eyes already are. \
Because your eyes no longer travel across the page, you can read far faster than usual while \
keeping your focus. Adjust the speed in the settings, paste your own text, upload a file, or \
extract an article from any website to get started.";

/// Where the text of a reading state came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReadingSource {
    NewBlank,
    Demo,
    JsonImport,
    WebsiteExtract,
    ClipboardPaste,
    FileUpload,
}

impl ReadingSource {
    /// All sources in declaration order; the index is the serialized ordinal.
    pub const ALL: [ReadingSource; 6] = [
        ReadingSource::NewBlank,
        ReadingSource::Demo,
        ReadingSource::JsonImport,
        ReadingSource::WebsiteExtract,
        ReadingSource::ClipboardPaste,
        ReadingSource::FileUpload,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReadingSource::NewBlank => "NewBlank",
            ReadingSource::Demo => "Demo",
            ReadingSource::JsonImport => "JsonImport",
            ReadingSource::WebsiteExtract => "WebsiteExtract",
            ReadingSource::ClipboardPaste => "ClipboardPaste",
            ReadingSource::FileUpload => "FileUpload",
        }
    }

    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Case-insensitive lookup by variant name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ReadingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The document currently being read, with progress and provenance.
///
/// Fields are only writable inside the crate; the orchestrator is the one
/// mutation path for a live state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingState {
    title: String,
    text: String,
    position: usize,
    last_read: DateTime<Utc>,
    source: ReadingSource,
    source_description: Option<String>,
}

impl ReadingState {
    /// Creates a state at position 0. Empty text is replaced by the placeholder
    /// and a missing `last_read` becomes now.
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        source: ReadingSource,
        source_description: Option<String>,
        last_read: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: title.into(),
            text: normalize_text(text.into()),
            position: 0,
            last_read: last_read.unwrap_or_else(Utc::now),
            source,
            source_description,
        }
    }

    /// The built-in demo document.
    pub fn demo(source: ReadingSource, source_description: Option<String>) -> Self {
        Self::new(DEMO_TITLE, DEMO_TEXT, source, source_description, None)
    }

    /// An empty document carrying the placeholder title and text.
    pub fn blank(source: ReadingSource, source_description: Option<String>) -> Self {
        Self::new(
            DEFAULT_NEW_TITLE,
            DEFAULT_NEW_TEXT,
            source,
            source_description,
            None,
        )
    }

    /// Returns the state with its position set, clamped to the token count.
    pub fn with_position(mut self, position: usize) -> Self {
        self.set_position(position);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn last_read(&self) -> DateTime<Utc> {
        self.last_read
    }

    pub fn source(&self) -> ReadingSource {
        self.source
    }

    pub fn source_description(&self) -> Option<&str> {
        self.source_description.as_deref()
    }

    /// Number of whitespace-separated words in the text.
    pub fn token_count(&self) -> usize {
        token_count(&self.text)
    }

    /// Whether this state still holds the untouched demo document.
    pub fn is_demo(&self) -> bool {
        self.title == DEMO_TITLE && self.text == DEMO_TEXT
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replaces the text and re-clamps the position against it.
    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = normalize_text(text.into());
        self.clamp_position();
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
        self.clamp_position();
    }

    pub(crate) fn touch(&mut self) {
        self.last_read = Utc::now();
    }

    fn clamp_position(&mut self) {
        self.position = self.position.min(self.token_count());
    }
}

/// Number of whitespace-separated words in `text`.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn normalize_text(text: String) -> String {
    if text.trim().is_empty() {
        DEFAULT_NEW_TEXT.to_string()
    } else {
        text
    }
}
