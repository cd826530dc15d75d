//! keydeck database layer.
//!
//! Provides SQLite connection management, schema migrations and the local
//! key-value area every persisted entry lives in.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use keydeck::database::{Database, KeyValueStore, SqliteKvStore};
//!
//! let db = Arc::new(Database::open("keydeck.db").expect("failed to open database"));
//! let kv = SqliteKvStore::new(db);
//! kv.set("keydeck", "theme", "dark").expect("write failed");
//! ```

pub mod connection;
pub mod kv;
pub mod migrations;

pub use connection::Database;
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};
