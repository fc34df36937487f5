//! Configuration tests

use super::*;
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// Serialized config must parse back into the same values
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );

    let back = Config::from_file(parsed.unwrap());
    assert_eq!(back.db_path, config.db_path);
    assert_eq!(back.retention, config.retention);
    assert_eq!(back.interval_ms, config.interval_ms);
    assert_eq!(back.list_limit, config.list_limit);
    assert_eq!(back.logging.file_rotation, config.logging.file_rotation);
}

#[test]
fn test_roundtrip_windows_style_path() {
    let config = Config {
        db_path: PathBuf::from(r"C:\Users\me\AppData\Local\cliphub\cliphub.db"),
        ..Config::default()
    };
    let parsed: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    assert_eq!(Config::from_file(parsed).db_path, config.db_path);
}

#[test]
fn test_roundtrip_control_characters_in_strings() {
    let mut config = Config {
        db_path: PathBuf::from("/tmp/odd\u{7f}name\"quoted\".db"),
        ..Config::default()
    };
    config.logging.file_prefix = "tab\there".to_string();

    let toml_str = config.to_toml();
    let parsed: FileConfig = toml::from_str(&toml_str)
        .unwrap_or_else(|e| panic!("unreadable TOML:\n{}\n{}", toml_str, e));
    let back = Config::from_file(parsed);
    assert_eq!(back.db_path, config.db_path);
    assert_eq!(back.logging.file_prefix, "tab\there");
}

// ─────────────────────────────────────────────────────────────────────────────
// File layer
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_gives_defaults() {
    let parsed: FileConfig = toml::from_str("").unwrap();
    let config = Config::from_file(parsed);
    assert_eq!(config.retention, DEFAULT_RETENTION);
    assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
    assert_eq!(config.list_limit, DEFAULT_LIST_LIMIT);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_file_values_are_sanitised() {
    let parsed: FileConfig = toml::from_str(
        r#"
        retention = -1
        interval_ms = 20
        list_limit = 0

        [logging]
        level = "debug"
        file_rotation = "weekly"
        "#,
    )
    .unwrap();
    let config = Config::from_file(parsed);
    assert_eq!(config.retention, DEFAULT_RETENTION);
    assert_eq!(config.interval_ms, MIN_INTERVAL_MS);
    assert_eq!(config.list_limit, DEFAULT_LIST_LIMIT);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

// ─────────────────────────────────────────────────────────────────────────────
// Env and CLI layers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let env: HashMap<&str, &str> = [
        ("CLIPHUB_DB", "/tmp/env.db"),
        ("CLIPHUB_RETENTION", "42"),
        ("CLIPHUB_INTERVAL_MS", "250"),
        ("CLIPHUB_LOG_LEVEL", "trace"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::default();
    config.apply_env(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(config.db_path, PathBuf::from("/tmp/env.db"));
    assert_eq!(config.retention, 42);
    assert_eq!(config.interval_ms, 250);
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn test_cli_overrides_env() {
    let mut config = Config::default();
    config.apply_env(|k| (k == "CLIPHUB_RETENTION").then(|| "42".to_string()));
    config.apply_overrides(&Overrides {
        db_path: Some(PathBuf::from("cli.db")),
        retention: Some("7".into()),
        interval_ms: None,
    });

    assert_eq!(config.db_path, PathBuf::from("cli.db"));
    assert_eq!(config.retention, 7);
    assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
}

#[test]
fn test_parse_retention_fallbacks() {
    assert_eq!(parse_retention("10"), 10);
    assert_eq!(parse_retention(" 3 "), 3);
    assert_eq!(parse_retention("0"), DEFAULT_RETENTION);
    assert_eq!(parse_retention("-5"), DEFAULT_RETENTION);
    assert_eq!(parse_retention("lots"), DEFAULT_RETENTION);
}

#[test]
fn test_parse_interval_floor_and_fallback() {
    assert_eq!(parse_interval_ms("750"), 750);
    assert_eq!(parse_interval_ms("100"), 100);
    assert_eq!(parse_interval_ms("50"), MIN_INTERVAL_MS);
    assert_eq!(parse_interval_ms("-1"), MIN_INTERVAL_MS);
    assert_eq!(parse_interval_ms("fast"), DEFAULT_INTERVAL_MS);
}

#[test]
fn test_interval_duration() {
    let config = Config {
        interval_ms: 250,
        ..Config::default()
    };
    assert_eq!(config.interval(), Duration::from_millis(250));
}

#[test]
fn test_log_rotation_parse() {
    assert_eq!(LogRotation::parse("HOURLY"), LogRotation::Hourly);
    assert_eq!(LogRotation::parse("never"), LogRotation::Never);
    assert_eq!(LogRotation::parse("bogus"), LogRotation::Daily);
}
