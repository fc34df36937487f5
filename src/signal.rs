//! Cross-task signals shared by the poller and the browser
//!
//! Both are cheap handles: clone them and hand one side to each task at
//! startup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// "The browser's view is stale" flag.
///
/// Written by the poller after each successful capture, read-and-cleared by
/// the browser once per frame. Repeated requests between frames collapse into
/// a single refresh.
#[derive(Debug, Clone, Default)]
pub struct RefreshSignal {
    pending: Arc<AtomicBool>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a refresh as due
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consume the pending request, returning whether one was set
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// Process-wide stop request with an interruptible sleep
///
/// Set once when the browser exits. The poller checks it around every sleep
/// and is woken immediately instead of waiting out its interval.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request stop and wake every sleeper
    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        match lock.lock() {
            Ok(mut stopped) => *stopped = true,
            Err(poisoned) => *poisoned.into_inner() = true,
        }
        cvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        match lock.lock() {
            Ok(stopped) => *stopped,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Sleep for up to `duration`, returning early if stop is requested.
    ///
    /// Returns `true` if stop was requested before or during the sleep.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = match lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        match cvar.wait_timeout_while(guard, duration, |stopped| !*stopped) {
            Ok((stopped, _)) => *stopped,
            Err(poisoned) => *poisoned.into_inner().0,
        }
    }
}
