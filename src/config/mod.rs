//! Configuration for cliphub
//!
//! Configuration is loaded in order of precedence:
//! 1. Command-line flags (highest priority)
//! 2. Environment variables
//! 3. Config file (<config dir>/cliphub/config.toml)
//! 4. Built-in defaults (lowest priority)
//!
//! Numeric values are sanitised at every layer: a bad retention falls back to
//! the default, and the poll interval never drops below 100 ms.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

mod logging;

#[cfg(test)]
mod tests;

pub use logging::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name used under the platform data/config dirs
const APP_DIR: &str = "cliphub";

/// Database file name
const DB_FILE: &str = "cliphub.db";

pub const DEFAULT_RETENTION: i64 = 500;
pub const DEFAULT_INTERVAL_MS: u64 = 500;
pub const MIN_INTERVAL_MS: u64 = 100;
pub const DEFAULT_LIST_LIMIT: usize = 500;

// ─────────────────────────────────────────────────────────────────────────────
// Value sanitising
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a retention count. Non-positive or unparsable input gives the default.
pub fn parse_retention(raw: &str) -> i64 {
    sanitize_retention(raw.trim().parse().unwrap_or(DEFAULT_RETENTION))
}

fn sanitize_retention(n: i64) -> i64 {
    if n <= 0 {
        DEFAULT_RETENTION
    } else {
        n
    }
}

/// Parse a poll interval in ms. Unparsable input gives the default, small
/// values are raised to the floor.
pub fn parse_interval_ms(raw: &str) -> u64 {
    match raw.trim().parse::<i64>() {
        Ok(n) => sanitize_interval(n),
        Err(_) => DEFAULT_INTERVAL_MS,
    }
}

fn sanitize_interval(n: i64) -> u64 {
    (n.max(MIN_INTERVAL_MS as i64)) as u64
}

/// Quote `s` as a TOML basic string
fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

fn sanitize_list_limit(n: usize) -> usize {
    if n == 0 {
        DEFAULT_LIST_LIMIT
    } else {
        n
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Paths
// ─────────────────────────────────────────────────────────────────────────────

/// Per-user data directory for cliphub (database, logs)
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR))
}

/// Default database location, without touching the filesystem
fn default_db_candidate() -> PathBuf {
    data_dir()
        .map(|d| d.join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database holding the history
    pub db_path: PathBuf,

    /// Entries kept after each capture
    pub retention: i64,

    /// Clipboard poll period in milliseconds (>= 100)
    pub interval_ms: u64,

    /// Maximum entries loaded into the browser per reload
    pub list_limit: usize,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_candidate(),
            retention: DEFAULT_RETENTION,
            interval_ms: DEFAULT_INTERVAL_MS,
            list_limit: DEFAULT_LIST_LIMIT,
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    db_path: Option<String>,
    retention: Option<i64>,
    interval_ms: Option<i64>,
    list_limit: Option<usize>,

    /// Optional [logging] section
    logging: Option<FileLogging>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub retention: Option<String>,
    pub interval_ms: Option<String>,
}

impl Config {
    /// Get the config file path: <config dir>/cliphub/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// Read the config file. A missing file means defaults; a malformed one is
    /// reported on stderr and then ignored.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!(
                        "Warning: ignoring invalid config file {}: {}",
                        path.display(),
                        e
                    );
                    FileConfig::default()
                }
            },
            Err(_) => FileConfig::default(),
        }
    }

    /// Build from a parsed file over the defaults
    pub(crate) fn from_file(file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            db_path: file.db_path.map(PathBuf::from).unwrap_or(defaults.db_path),
            retention: file
                .retention
                .map(sanitize_retention)
                .unwrap_or(defaults.retention),
            interval_ms: file
                .interval_ms
                .map(sanitize_interval)
                .unwrap_or(defaults.interval_ms),
            list_limit: file
                .list_limit
                .map(sanitize_list_limit)
                .unwrap_or(defaults.list_limit),
            logging: LoggingConfig::from_file(file.logging),
        }
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub(crate) fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(db) = lookup("CLIPHUB_DB") {
            self.db_path = PathBuf::from(db);
        }
        if let Some(v) = lookup("CLIPHUB_RETENTION") {
            self.retention = parse_retention(&v);
        }
        if let Some(v) = lookup("CLIPHUB_INTERVAL_MS") {
            self.interval_ms = parse_interval_ms(&v);
        }
        if let Some(v) = lookup("CLIPHUB_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(db) = &overrides.db_path {
            self.db_path = db.clone();
        }
        if let Some(v) = &overrides.retention {
            self.retention = parse_retention(v);
        }
        if let Some(v) = &overrides.interval_ms {
            self.interval_ms = parse_interval_ms(v);
        }
    }

    /// Load the effective configuration: file, then env, then CLI flags
    pub fn load(overrides: &Overrides) -> Self {
        let mut config = Self::from_file(Self::load_file_config());
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.ensure_db_dir();
        config
    }

    /// Create the default data directory, or fall back to a relative database
    /// path if that is impossible. Explicitly configured paths are left alone.
    fn ensure_db_dir(&mut self) {
        if self.db_path != default_db_candidate() {
            return;
        }
        let Some(parent) = self.db_path.parent() else {
            return;
        };
        if parent.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!(
                "Warning: could not create {} ({}), using ./{}",
                parent.display(),
                e,
                DB_FILE
            );
            self.db_path = PathBuf::from(DB_FILE);
        }
    }

    /// Poll period as a duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Render the config as a TOML document with the current values
    pub fn to_toml(&self) -> String {
        format!(
            r#"# cliphub configuration
# Precedence: command-line flags > CLIPHUB_* environment variables > this file > defaults

# SQLite database with the clipboard history (env: CLIPHUB_DB, flag: --db)
db_path = {db_path}

# Entries kept; older ones are pruned after every capture (env: CLIPHUB_RETENTION)
retention = {retention}

# Clipboard poll period in milliseconds, minimum {min_interval} (env: CLIPHUB_INTERVAL_MS)
interval_ms = {interval_ms}

# Entries loaded into the browser at once
list_limit = {list_limit}

[logging]
# trace, debug, info, warn, error (env: CLIPHUB_LOG_LEVEL; RUST_LOG wins over both)
level = {level}
file_enabled = {file_enabled}
file_dir = {file_dir}
# hourly, daily, never
file_rotation = {rotation}
file_prefix = {prefix}
"#,
            db_path = toml_string(&self.db_path.display().to_string()),
            retention = self.retention,
            min_interval = MIN_INTERVAL_MS,
            interval_ms = self.interval_ms,
            list_limit = self.list_limit,
            level = toml_string(&self.logging.level),
            file_enabled = self.logging.file_enabled,
            file_dir = toml_string(&self.logging.file_dir.display().to_string()),
            rotation = toml_string(self.logging.file_rotation.as_str()),
            prefix = toml_string(&self.logging.file_prefix),
        )
    }
}
