// Logging module - tracing subscriber setup
//
// The TUI owns the terminal, so an interactive session never logs to
// stdout/stderr (that would garble the alternate screen). Its logs go to a
// rolling JSON file instead. Non-interactive commands log to stderr.
//
// Precedence for the filter: RUST_LOG env var > config file > default "info"

use crate::config::{LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where human-readable log output should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Interactive session: file only
    Tui,
    /// One-shot command: stderr (plus file if enabled)
    Console,
}

/// Default filter directive for a configured level
pub fn default_directive(level: &str) -> String {
    format!("cliphub={}", level)
}

/// Install the global subscriber.
///
/// Returns the file writer guard, which must be kept alive for the duration of
/// the program so buffered lines are flushed.
pub fn init(config: &LoggingConfig, output: Output) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(&config.level).into());

    let (file_layer, guard) = if config.file_enabled {
        match std::fs::create_dir_all(&config.file_dir) {
            Ok(()) => {
                let file_appender = match config.file_rotation {
                    LogRotation::Hourly => {
                        tracing_appender::rolling::hourly(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Daily => {
                        tracing_appender::rolling::daily(&config.file_dir, &config.file_prefix)
                    }
                    LogRotation::Never => {
                        tracing_appender::rolling::never(&config.file_dir, &config.file_prefix)
                    }
                };

                // Writes happen on a background thread
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                if output == Output::Console {
                    eprintln!(
                        "Warning: Could not create log directory {:?}: {}",
                        config.file_dir, e
                    );
                }
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    let console_layer = (output == Output::Console).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    // try_init: a second call (tests, repeated setup) is not fatal
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    guard
}
