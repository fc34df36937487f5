//! Clipboard history store
//!
//! Owns the single SQLite connection. Every operation takes the same mutex,
//! so the poller thread and the browser never interleave statements and
//! never observe a partial write.
//!
//! # Ordering
//!
//! Display, fetch, search and retention all use `(ts DESC, id DESC)`. Two
//! captures within the same millisecond are still totally ordered by id.

use crate::error::StorageError;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Current schema version stored in `metadata`
const SCHEMA_VERSION: i32 = 1;

/// One recorded clipboard snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Assigned by the store, stable for the entry's lifetime
    pub id: i64,
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp: i64,
    pub text: String,
    /// FNV-1a 64 of `text`, used only for dedup
    pub hash: u64,
    pub favorite: bool,
}

impl Entry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            text: row.get(2)?,
            favorite: row.get::<_, i64>(3)? != 0,
            // Stored as the same 64 bits reinterpreted as a signed integer
            hash: row.get::<_, i64>(4)? as u64,
        })
    }

    /// First line of the text, for one-row list display
    pub fn first_line(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }
}

/// Serialized custodian of the entry table
#[derive(Debug, Default)]
pub struct Store {
    conn: Mutex<Option<Connection>>,
}

impl Store {
    /// Create a store with no connection. Call [`Store::open`] before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or create) the database at `path` and ensure the schema exists.
    ///
    /// Calling this while already open is a no-op.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = path.as_ref();
        let mut guard = self.lock()?;
        if guard.is_some() {
            return Ok(());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init_schema(&conn).map_err(StorageError::Schema)?;

        tracing::info!("Store opened at {}", path.display());
        *guard = Some(conn);
        Ok(())
    }

    /// Release the connection. Safe to call when not open.
    pub fn close(&self) {
        match self.conn.lock() {
            Ok(mut guard) => {
                if let Some(conn) = guard.take() {
                    if let Err((_, e)) = conn.close() {
                        tracing::warn!("Store close reported an error: {}", e);
                    }
                    tracing::debug!("Store closed");
                }
            }
            Err(_) => tracing::warn!("Store lock poisoned during close"),
        }
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.conn.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Initialize schema with WAL mode and run versioned steps
    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA busy_timeout=5000;
            "#,
        )?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT
            );
            "#,
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(
                    (SELECT CAST(value AS INTEGER) FROM metadata WHERE key = 'schema_version'),
                    0
                )",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            Self::apply_schema_v1(conn)?;
        }

        Ok(())
    }

    fn apply_schema_v1(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ts INTEGER NOT NULL,
                text TEXT NOT NULL,
                hash INTEGER NOT NULL,
                favorite INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_entries_ts ON entries(ts DESC, id DESC);
            CREATE INDEX IF NOT EXISTS idx_entries_hash ON entries(hash);
            "#,
        )?;
        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Run `f` against the open connection while holding the store lock
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let guard = self.lock()?;
        let conn = guard.as_ref().ok_or(StorageError::NotOpen)?;
        Ok(f(conn)?)
    }

    /// Append one entry and return its id
    pub fn insert(&self, text: &str, hash: u64, timestamp: i64) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entries (ts, text, hash) VALUES (?1, ?2, ?3)",
                params![timestamp, text, hash as i64],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Set the favorite flag. A missing id is treated as success.
    pub fn set_favorite(&self, id: i64, favorite: bool) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE entries SET favorite = ?1 WHERE id = ?2",
                params![favorite as i64, id],
            )?;
            Ok(())
        })
    }

    /// Remove an entry. Already-absent ids are not an error.
    pub fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    /// Keep only the `keep_limit` most recent entries. Favorites are not exempt.
    ///
    /// Returns the number of rows deleted. `keep_limit <= 0` deletes nothing.
    pub fn prune(&self, keep_limit: i64) -> Result<usize, StorageError> {
        if keep_limit <= 0 {
            return Ok(0);
        }
        self.with_conn(|conn| {
            conn.execute(
                r#"
                DELETE FROM entries WHERE id NOT IN (
                    SELECT id FROM entries ORDER BY ts DESC, id DESC LIMIT ?1
                )
                "#,
                params![keep_limit],
            )
        })
    }

    /// Up to `limit` entries, newest first
    pub fn fetch_recent(&self, limit: usize) -> Result<Vec<Entry>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ts, text, favorite, hash FROM entries
                 ORDER BY ts DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], Entry::from_row)?;
            let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
    }

    /// Entries whose text contains `needle`, newest first.
    ///
    /// Exact, case-sensitive substring match. An empty needle matches everything.
    pub fn search(&self, needle: &str, limit: usize) -> Result<Vec<Entry>, StorageError> {
        if needle.is_empty() {
            return self.fetch_recent(limit);
        }
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ts, text, favorite, hash FROM entries
                 WHERE instr(text, ?1) > 0
                 ORDER BY ts DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![needle, limit as i64], Entry::from_row)?;
            let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
    }

    /// Total number of stored entries
    pub fn count(&self) -> Result<usize, StorageError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM entries", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
        })
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.close();
    }
}
