// cliphub - Clipboard history in the terminal
//
// Records every distinct text that lands on the system clipboard into a local
// SQLite database and lets the user browse, search, favorite, delete and
// re-copy past entries from a full-screen terminal UI.
//
// Architecture:
// - Poller (OS thread): samples the clipboard, dedups, inserts, prunes
// - Store (rusqlite): the only shared mutable state, behind one mutex
// - TUI (ratatui): browses the store, reloads when the poller signals
// - Signals: a refresh flag (poller → TUI) and a stop flag (main → poller)

mod cli;
mod clipboard;
mod config;
mod error;
mod logging;
mod poller;
mod signal;
mod storage;
mod transform;
mod tui;
mod util;

use clap::Parser;
use cli::Cli;
use clipboard::{ClipboardAccess, SystemClipboard};
use config::{Config, VERSION};
use logging::Output;
use poller::{Poller, PollerConfig};
use signal::{RefreshSignal, StopSignal};
use std::process::ExitCode;
use std::sync::Arc;
use storage::Store;
use tui::app::App;

#[tokio::main]
async fn main() -> ExitCode {
    // Handles --help / --version itself and exits 0
    let cli = Cli::parse();
    let overrides = cli.to_overrides();

    let config = Config::load(&overrides);

    if let Some(command) = &cli.command {
        let _log_guard = logging::init(&config.logging, Output::Console);
        return ExitCode::from(cli::handle_command(command, &overrides));
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = logging::init(&config.logging, Output::Tui);

    tracing::info!(
        version = VERSION,
        db = %config.db_path.display(),
        retention = config.retention,
        interval_ms = config.interval_ms,
        "Starting cliphub"
    );

    let store = Arc::new(Store::new());
    if let Err(e) = store.open(&config.db_path) {
        tracing::error!("Failed to open store: {}", e);
        eprintln!(
            "Error: cannot open history database {}: {}",
            config.db_path.display(),
            e
        );
        return ExitCode::FAILURE;
    }
    if let Ok(count) = store.count() {
        tracing::info!(entries = count, "Store opened");
    }

    let clipboard: Arc<dyn ClipboardAccess> = Arc::new(SystemClipboard::new());
    let refresh = RefreshSignal::new();

    let poller = Poller::new(
        store.clone(),
        clipboard.clone(),
        refresh.clone(),
        PollerConfig {
            interval: config.interval(),
            retention: config.retention,
        },
    );
    let poller_handle = match poller.spawn(StopSignal::new()) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to start poller: {}", e);
            eprintln!("Error: cannot start clipboard poller: {}", e);
            store.close();
            return ExitCode::FAILURE;
        }
    };

    let app = App::new(store.clone(), clipboard, refresh, config.list_limit);
    let result = tui::run_tui(app).await;

    // Poller must be gone before the store is released
    poller_handle.shutdown();
    store.close();

    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("TUI error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
