use std::fmt;

// === ImportError ===

/// Errors raised while importing a serialized reading state.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The payload could not be parsed as a JSON object.
    MalformedInput(String),
    /// A required field is absent or has the wrong type.
    MissingField(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::MalformedInput(msg) => write!(f, "Malformed state payload: {}", msg),
            ImportError::MissingField(field) => {
                write!(f, "Required field missing from state payload: {}", field)
            }
        }
    }
}

impl std::error::Error for ImportError {}

// === ExtractionError ===

/// Errors raised while loading a web page or extracting text from it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The page could not be fetched (invalid URL, network, non-success status).
    Fetch(String),
    /// The response could not be turned into a document.
    Parse(String),
    /// No candidate node in the document holds any text.
    NoContentFound,
    /// The path matched zero nodes.
    PathNotFound(String),
    /// The path is not a valid selector.
    InvalidPath(String),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::Fetch(msg) => write!(f, "Failed to fetch page: {}", msg),
            ExtractionError::Parse(msg) => write!(f, "Failed to parse page: {}", msg),
            ExtractionError::NoContentFound => write!(f, "No readable content found on page"),
            ExtractionError::PathNotFound(path) => {
                write!(f, "No element matches path: {}", path)
            }
            ExtractionError::InvalidPath(msg) => write!(f, "Invalid path: {}", msg),
        }
    }
}

impl std::error::Error for ExtractionError {}

// === ScrapeError ===

/// Errors raised while turning a web page into a reading state.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeError {
    /// The requested extraction method is not one of the known strategies.
    UnknownMethod(String),
    /// A path-select request was made without a path.
    MissingPath,
    /// The request surface could not be read.
    InvalidRequest(String),
    /// Loading or extraction failed.
    Extraction(ExtractionError),
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeError::UnknownMethod(method) => {
                write!(f, "Invalid new text input method: {}", method)
            }
            ScrapeError::MissingPath => write!(f, "Path-select extraction requires a path"),
            ScrapeError::InvalidRequest(msg) => write!(f, "Invalid extraction request: {}", msg),
            ScrapeError::Extraction(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ScrapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScrapeError::Extraction(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExtractionError> for ScrapeError {
    fn from(err: ExtractionError) -> Self {
        ScrapeError::Extraction(err)
    }
}

// === FileImportError ===

/// Errors raised while reading text out of uploaded files.
#[derive(Debug, Clone, PartialEq)]
pub enum FileImportError {
    /// The file type is not supported.
    Unsupported(String),
    /// The file content could not be decoded as text.
    Decode(String),
    /// None of the files contained readable text.
    Empty,
}

impl fmt::Display for FileImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileImportError::Unsupported(name) => write!(f, "Unsupported file type: {}", name),
            FileImportError::Decode(msg) => write!(f, "Failed to decode file: {}", msg),
            FileImportError::Empty => write!(f, "Uploaded files contain no readable text"),
        }
    }
}

impl std::error::Error for FileImportError {}

// === InteropError ===

/// Errors surfaced by the host collaborators (clipboard, file picker).
#[derive(Debug, Clone, PartialEq)]
pub enum InteropError {
    /// Reading the clipboard failed.
    Clipboard(String),
    /// Extracting text from uploaded files failed.
    FileExtraction(String),
}

impl fmt::Display for InteropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteropError::Clipboard(msg) => write!(f, "Clipboard unavailable: {}", msg),
            InteropError::FileExtraction(msg) => write!(f, "File extraction failed: {}", msg),
        }
    }
}

impl std::error::Error for InteropError {}

impl From<FileImportError> for InteropError {
    fn from(err: FileImportError) -> Self {
        InteropError::FileExtraction(err.to_string())
    }
}

// === SavedStateError ===

/// Errors related to the saved reading-state library.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedStateError {
    /// Database operation failed.
    DatabaseError(String),
    /// A stored payload could not be serialized or read back.
    SerializationError(String),
    /// No saved state exists under the given title.
    NotFound(String),
}

impl fmt::Display for SavedStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SavedStateError::DatabaseError(msg) => {
                write!(f, "Saved state database error: {}", msg)
            }
            SavedStateError::SerializationError(msg) => {
                write!(f, "Saved state serialization error: {}", msg)
            }
            SavedStateError::NotFound(title) => write!(f, "Saved state not found: {}", title),
        }
    }
}

impl std::error::Error for SavedStateError {}

// === ConfigError ===

/// Errors related to reading configuration persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing the config file.
    IoError(String),
    /// Failed to serialize or deserialize the config.
    SerializationError(String),
    /// A config value is outside its allowed range.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::SerializationError(msg) => {
                write!(f, "Config serialization error: {}", msg)
            }
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// === OrchestratorError ===

/// Errors returned by state orchestration operations.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    /// An orchestrator invariant was violated (e.g. mutation before initialization).
    Precondition(String),
    /// A host collaborator failed.
    Interop(InteropError),
    /// Persisting the current state failed.
    Persistence(SavedStateError),
    /// Persisting the config failed.
    Config(ConfigError),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorError::Precondition(msg) => write!(f, "Precondition failed: {}", msg),
            OrchestratorError::Interop(err) => write!(f, "{}", err),
            OrchestratorError::Persistence(err) => write!(f, "{}", err),
            OrchestratorError::Config(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrchestratorError::Precondition(_) => None,
            OrchestratorError::Interop(err) => Some(err),
            OrchestratorError::Persistence(err) => Some(err),
            OrchestratorError::Config(err) => Some(err),
        }
    }
}

impl From<InteropError> for OrchestratorError {
    fn from(err: InteropError) -> Self {
        OrchestratorError::Interop(err)
    }
}

impl From<SavedStateError> for OrchestratorError {
    fn from(err: SavedStateError) -> Self {
        OrchestratorError::Persistence(err)
    }
}

impl From<ConfigError> for OrchestratorError {
    fn from(err: ConfigError) -> Self {
        OrchestratorError::Config(err)
    }
}
