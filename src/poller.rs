//! Clipboard poller
//!
//! Samples the clipboard on a fixed interval and records new text into the
//! store. Runs on a dedicated OS thread because both the clipboard and SQLite
//! calls are blocking.
//!
//! # Cycle
//!
//! ```text
//! read clipboard ──(error)──→ log, skip
//!     │
//!     └──→ CRLF → LF ──(blank)──→ skip
//!             │
//!             └──→ hash == last recorded? ──(yes)──→ skip
//!                     │
//!                     └──→ insert → prune(retention) → remember hash → refresh signal
//! ```
//!
//! Dedup only compares against the last *recorded* hash. A value that comes
//! back after something else was copied is recorded again.

use crate::clipboard::ClipboardAccess;
use crate::signal::{RefreshSignal, StopSignal};
use crate::storage::Store;
use crate::util::{hash64, now_millis, truncate_utf8_safe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lowest accepted poll interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Default poll interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Poller settings
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between clipboard samples (clamped to `MIN_INTERVAL`)
    pub interval: Duration,
    /// Entries kept after each capture
    pub retention: i64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            retention: 500,
        }
    }
}

/// What a single cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// New entry stored with this id
    Recorded(i64),
    /// Same content as the last recorded entry
    Duplicate,
    /// Empty or whitespace-only clipboard
    Blank,
    /// Clipboard read failed; try again next cycle
    ReadFailed,
    /// Insert failed; the hash marker is untouched so the next cycle retries
    StoreFailed,
}

/// Collapse CRLF line endings to LF
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// True when every character is at or below U+0020
pub fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c <= ' ')
}

/// Capture state: the store, the clipboard, and the last recorded hash
pub struct Poller {
    store: Arc<Store>,
    clipboard: Arc<dyn ClipboardAccess>,
    refresh: RefreshSignal,
    config: PollerConfig,
    /// Hash of the last successfully recorded entry (None before the first)
    last_hash: Option<u64>,
}

impl Poller {
    pub fn new(
        store: Arc<Store>,
        clipboard: Arc<dyn ClipboardAccess>,
        refresh: RefreshSignal,
        mut config: PollerConfig,
    ) -> Self {
        config.interval = config.interval.max(MIN_INTERVAL);
        Self {
            store,
            clipboard,
            refresh,
            config,
            last_hash: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Run one sample-dedup-insert cycle
    pub fn poll_once(&mut self) -> PollOutcome {
        let raw = match self.clipboard.read() {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Clipboard read skipped: {}", e);
                return PollOutcome::ReadFailed;
            }
        };

        let text = normalize(&raw);
        if is_blank(&text) {
            return PollOutcome::Blank;
        }

        let hash = hash64(&text);
        if self.last_hash == Some(hash) {
            return PollOutcome::Duplicate;
        }

        let id = match self.store.insert(&text, hash, now_millis()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Failed to record clipboard entry: {}", e);
                return PollOutcome::StoreFailed;
            }
        };

        match self.store.prune(self.config.retention) {
            Ok(0) => {}
            Ok(n) => tracing::debug!("Pruned {} entries (retention {})", n, self.config.retention),
            Err(e) => tracing::warn!("Prune after insert failed: {}", e),
        }

        self.last_hash = Some(hash);
        self.refresh.request();
        tracing::debug!(
            id,
            bytes = text.len(),
            "Recorded clipboard entry: {:?}",
            truncate_utf8_safe(&text, 60)
        );
        PollOutcome::Recorded(id)
    }

    /// Loop until `stop` is set, sleeping `interval` between cycles
    pub fn run(mut self, stop: StopSignal) {
        tracing::info!(
            "Poller started (interval {:?}, retention {})",
            self.interval(),
            self.config.retention
        );

        while !stop.is_stopped() {
            self.poll_once();
            if stop.sleep(self.config.interval) {
                break;
            }
        }

        tracing::info!("Poller stopped");
    }

    /// Start the poller on its own thread
    pub fn spawn(self, stop: StopSignal) -> std::io::Result<PollerHandle> {
        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("cliphub-poller".into())
            .spawn(move || self.run(thread_stop))?;
        Ok(PollerHandle {
            stop,
            handle: Some(handle),
        })
    }
}

/// Owner's handle on a running poller thread
pub struct PollerHandle {
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal stop and wait for the thread to exit.
    ///
    /// After this returns no poller write can be in flight.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
