//! Clipboard access for capture and re-copy
//!
//! `SystemClipboard` uses the `arboard` crate for cross-platform support
//! (Windows, macOS, Linux). The clipboard handle is created fresh on every call
//! to avoid holding OS resources between polls.

use crate::error::ClipboardError;
use arboard::Clipboard;

/// Read and write plain text on a clipboard
///
/// Implementations may be slow or fail transiently. An empty clipboard is a
/// successful read of the empty string, not an error.
pub trait ClipboardAccess: Send + Sync {
    fn read(&self) -> Result<String, ClipboardError>;
    fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    fn open() -> Result<Clipboard, ClipboardError> {
        Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read(&self) -> Result<String, ClipboardError> {
        let mut clipboard = Self::open()?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Empty clipboard or non-text content
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(ClipboardError::Read(e.to_string())),
        }
    }

    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = Self::open()?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// Marker written by the smoke test
pub const SMOKE_MARKER: &str = "cliphub smoke ✅";

/// Outcome of a clipboard round-trip self test
#[derive(Debug, PartialEq, Eq)]
pub enum SmokeResult {
    Passed,
    WriteFailed(String),
    ReadFailed(String),
    Mismatch { read: String },
}

/// Write a marker, read it back, and compare
pub fn smoke_test(clipboard: &dyn ClipboardAccess) -> SmokeResult {
    if let Err(e) = clipboard.write(SMOKE_MARKER) {
        return SmokeResult::WriteFailed(e.to_string());
    }
    match clipboard.read() {
        Ok(text) if text == SMOKE_MARKER => SmokeResult::Passed,
        Ok(text) => SmokeResult::Mismatch { read: text },
        Err(e) => SmokeResult::ReadFailed(e.to_string()),
    }
}
