// CLI module - command-line argument parsing and handlers
//
// Top-level flags tune the interactive session. Subcommands run once and exit:
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --reset: Regenerate config file with defaults
// - smoke: Clipboard round-trip self test

use crate::clipboard::{smoke_test, ClipboardAccess, SmokeResult, SystemClipboard};
use crate::config::{Config, Overrides, VERSION};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// cliphub - Clipboard history in the terminal
#[derive(Parser, Debug)]
#[command(name = "cliphub")]
#[command(version = VERSION)]
#[command(about = "Record clipboard history and browse it in the terminal", long_about = None)]
pub struct Cli {
    /// SQLite database path (default: per-user data directory)
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Entries to keep (invalid values fall back to 500)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    pub retention: Option<String>,

    /// Poll period in milliseconds (minimum 100)
    #[arg(long, value_name = "MS", allow_hyphen_values = true)]
    pub interval: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Write a marker to the clipboard and read it back
    Smoke,
}

impl Cli {
    /// Flags that override the config file and environment
    pub fn to_overrides(&self) -> Overrides {
        Overrides {
            db_path: self.db.clone(),
            retention: self.retention.clone(),
            interval_ms: self.interval.clone(),
        }
    }
}

/// Run a subcommand and return its exit code
pub fn handle_command(command: &Commands, overrides: &Overrides) -> u8 {
    match command {
        Commands::Config { show, path, reset } => {
            if *path {
                handle_config_path()
            } else if *show {
                handle_config_show(overrides)
            } else if *reset {
                handle_config_reset()
            } else {
                println!("Usage: cliphub config [--show|--path|--reset]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --path    Show config file path");
                println!("  --reset   Reset config file to defaults");
                0
            }
        }
        Commands::Smoke => handle_smoke(&SystemClipboard::new()),
    }
}

fn handle_config_path() -> u8 {
    match Config::config_path() {
        Some(path) => {
            println!("{}", path.display());
            0
        }
        None => {
            eprintln!("Error: Could not determine config path");
            1
        }
    }
}

fn handle_config_show(overrides: &Overrides) -> u8 {
    let config = Config::load(overrides);

    println!("# Effective configuration (flags > env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    match Config::config_path() {
        Some(path) if path.exists() => println!("# Source: {}", path.display()),
        _ => println!("# Source: defaults (no config file)"),
    }
    0
}

fn handle_config_reset() -> u8 {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        return 1;
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return 0;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            return 1;
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        return 1;
    }

    println!("Config reset to defaults: {}", path.display());
    0
}

fn handle_smoke(clipboard: &dyn ClipboardAccess) -> u8 {
    match smoke_test(clipboard) {
        SmokeResult::Passed => {
            println!("Clipboard round-trip OK");
            0
        }
        SmokeResult::WriteFailed(e) => {
            eprintln!("Clipboard write failed: {}", e);
            1
        }
        SmokeResult::ReadFailed(e) => {
            eprintln!("Clipboard read failed: {}", e);
            1
        }
        SmokeResult::Mismatch { read } => {
            eprintln!("Clipboard mismatch: read back {:?}", read);
            1
        }
    }
}
