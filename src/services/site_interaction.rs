//! Host collaborators for the orchestrator.
//!
//! The host owns the clipboard, file picker, editor fields, and change
//! listener. [`HostSite`] is the implementation used by the RPC binary: the
//! host pushes clipboard text with each paste request, and change
//! notifications are collected so they can be emitted as events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::services::file_import;
use crate::types::errors::InteropError;
use crate::types::upload::UploadedFile;

/// Trait defining the host operations the orchestrator depends on.
#[async_trait]
pub trait SiteInteraction: Send + Sync {
    async fn read_clipboard_text(&self) -> Result<String, InteropError>;
    async fn extract_text_from_files(&self, files: &[UploadedFile]) -> Result<String, InteropError>;
    fn notify_state_changed(&self);
    /// Pushes the current title and text into the editor fields.
    fn sync_editor(&self, title: &str, text: &str);
}

/// Editor field contents as last pushed by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorFields {
    pub title: String,
    pub text: String,
}

/// Host collaborator backed by staged values.
#[derive(Debug, Default)]
pub struct HostSite {
    clipboard: Mutex<Option<String>>,
    editor: Mutex<EditorFields>,
    state_changed: AtomicBool,
}

impl HostSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages the text the next clipboard read returns.
    pub fn stage_clipboard(&self, text: impl Into<String>) {
        if let Ok(mut clipboard) = self.clipboard.lock() {
            *clipboard = Some(text.into());
        }
    }

    /// Returns whether a change was notified since the last call, and resets it.
    pub fn take_state_changed(&self) -> bool {
        self.state_changed.swap(false, Ordering::SeqCst)
    }

    pub fn editor(&self) -> EditorFields {
        self.editor
            .lock()
            .map(|editor| editor.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SiteInteraction for HostSite {
    /// Consumes the staged clipboard text.
    async fn read_clipboard_text(&self) -> Result<String, InteropError> {
        let mut clipboard = self
            .clipboard
            .lock()
            .map_err(|e| InteropError::Clipboard(e.to_string()))?;
        clipboard
            .take()
            .ok_or_else(|| InteropError::Clipboard("no clipboard text provided".to_string()))
    }

    async fn extract_text_from_files(&self, files: &[UploadedFile]) -> Result<String, InteropError> {
        Ok(file_import::extract_text_from_files(files)?)
    }

    fn notify_state_changed(&self) {
        self.state_changed.store(true, Ordering::SeqCst);
    }

    fn sync_editor(&self, title: &str, text: &str) {
        if let Ok(mut editor) = self.editor.lock() {
            editor.title = title.to_string();
            editor.text = text.to_string();
        }
        debug!(title, "Synced editor fields");
    }
}
