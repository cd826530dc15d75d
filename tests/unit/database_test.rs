//! Unit tests for the keydeck database layer (connection, migrations, kv area).

use std::sync::Arc;

use keydeck::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use keydeck::database::{Database, KeyValueStore, MemoryKvStore, SqliteKvStore};
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_kv_table() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection().expect("connection");

    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='kv_entries'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "kv_entries should exist after migrations");
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection().expect("connection");
    assert_eq!(get_schema_version(&conn), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection().expect("connection");
    run_all(&conn).expect("second run should succeed");
    assert_eq!(get_schema_version(&conn), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_sqlite_kv_survives_reopen() {
    let tmp = TempDir::new().expect("temp dir");
    let path = tmp.path().join("keys.db");

    {
        let kv = SqliteKvStore::new(Arc::new(Database::open(&path).unwrap()));
        kv.set("keydeck", "theme", "dark").unwrap();
    }

    let kv = SqliteKvStore::new(Arc::new(Database::open(&path).unwrap()));
    assert_eq!(kv.get("keydeck", "theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn test_namespaces_are_isolated() {
    let kv = MemoryKvStore::new();
    kv.set("keydeck", "lang", "nl").unwrap();
    kv.set("other-app", "lang", "fr").unwrap();
    assert_eq!(kv.get("keydeck", "lang").unwrap().as_deref(), Some("nl"));
    assert_eq!(kv.keys("keydeck").unwrap(), vec!["lang".to_string()]);
}

#[test]
fn test_last_write_wins() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let kv = SqliteKvStore::new(db);
    kv.set("keydeck", "keys", "[]").unwrap();
    kv.set("keydeck", "keys", "[1]").unwrap();
    assert_eq!(kv.get("keydeck", "keys").unwrap().as_deref(), Some("[1]"));
    assert_eq!(kv.keys("keydeck").unwrap().len(), 1);
}
