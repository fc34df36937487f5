//! Error types for clipboard access, storage, and browser input
//!
//! None of these terminate the process on their own. Callers decide at the
//! boundary: the poller logs and skips the cycle, the browser logs and keeps
//! rendering, and only a store-open failure at startup is fatal.

use std::fmt;
use std::path::PathBuf;

/// Failure talking to the OS clipboard
#[derive(Debug)]
pub enum ClipboardError {
    /// Clipboard could not be opened at all (no display server, locked, ...)
    Unavailable(String),
    /// Clipboard opened but reading text failed
    Read(String),
    /// Clipboard opened but writing text failed
    Write(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "clipboard unavailable: {}", msg),
            ClipboardError::Read(msg) => write!(f, "clipboard read failed: {}", msg),
            ClipboardError::Write(msg) => write!(f, "clipboard write failed: {}", msg),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Failure in the persistent entry store
#[derive(Debug)]
pub enum StorageError {
    /// Operation attempted before `open` or after `close`
    NotOpen,
    /// Database file could not be opened or created
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// Parent directory for the database could not be created
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Schema creation or version check failed
    Schema(rusqlite::Error),
    /// Any other statement failure (insert, update, delete, query)
    Sqlite(rusqlite::Error),
    /// A previous holder of the connection lock panicked
    Poisoned,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotOpen => write!(f, "store is not open"),
            StorageError::Open { path, source } => {
                write!(f, "failed to open store at {}: {}", path.display(), source)
            }
            StorageError::Directory { path, source } => {
                write!(f, "failed to create {}: {}", path.display(), source)
            }
            StorageError::Schema(e) => write!(f, "failed to initialize schema: {}", e),
            StorageError::Sqlite(e) => write!(f, "sqlite error: {}", e),
            StorageError::Poisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Open { source, .. } => Some(source),
            StorageError::Directory { source, .. } => Some(source),
            StorageError::Schema(e) | StorageError::Sqlite(e) => Some(e),
            StorageError::NotOpen | StorageError::Poisoned => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Sqlite(e)
    }
}

/// Browser command that could not be acted on. Always ignored after logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Key has no binding in the current mode
    UnboundKey(String),
    /// Transform menu received a key that is not a transform choice
    UnknownTransform(char),
    /// Command needs a selected entry but the list is empty
    NoSelection,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::UnboundKey(key) => write!(f, "no binding for key {}", key),
            InputError::UnknownTransform(c) => write!(f, "unknown transform choice '{}'", c),
            InputError::NoSelection => write!(f, "no entry selected"),
        }
    }
}

impl std::error::Error for InputError {}
