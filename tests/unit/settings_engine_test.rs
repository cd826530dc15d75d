//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface:
//! default loading, value persistence and reset.

use keydeck::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use keydeck::types::errors::SettingsError;
use keydeck::types::settings::ConsoleSettings;
use tempfile::TempDir;

/// Engine backed by a temp directory the caller keeps alive.
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();
    assert_eq!(settings, ConsoleSettings::default());
    assert!(!std::path::Path::new(engine.get_config_path()).exists());
}

#[test]
fn test_save_then_load_in_fresh_engine() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine.set_value("keys.secret_length", serde_json::json!(40)).unwrap();
    engine.set_value("logging.filter", serde_json::json!("keydeck=debug")).unwrap();

    let mut fresh = engine_in_temp(&dir);
    let loaded = fresh.load().unwrap();
    assert_eq!(loaded.keys.secret_length, 40);
    assert_eq!(loaded.logging.filter, "keydeck=debug");
}

#[test]
fn test_set_value_replaces_whole_section() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let storage = serde_json::json!({"database_file": "other.db", "namespace": "staging"});
    engine.set_value("storage", storage).unwrap();
    assert_eq!(engine.get_settings().storage.namespace, "staging");
}

#[test]
fn test_set_value_rejects_empty_key() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    assert!(matches!(
        engine.set_value("", serde_json::json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
}

#[test]
fn test_reset_writes_defaults_to_disk() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine.set_value("latency.jitter_ms", serde_json::json!(0)).unwrap();
    engine.reset().unwrap();

    let mut fresh = engine_in_temp(&dir);
    assert_eq!(fresh.load().unwrap(), ConsoleSettings::default());
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b").join("settings.json");
    let engine = SettingsEngine::new(Some(nested.to_string_lossy().to_string()));
    engine.save().unwrap();
    assert!(nested.exists());
}
