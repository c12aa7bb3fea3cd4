//! Key-value persistence for TabbiMate
//!
//! Mirrors browser local storage: every entry is a whole JSON document
//! under a string key, and writers follow read-full / mutate / write-full.

mod favorites;
mod profile;
mod requests;
mod schema;

pub use favorites::{FavoritesMap, FavoritesStore};
pub use profile::ProfileStore;
pub use requests::RequestStore;
pub use schema::*;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("This language is already in your list: {0}")]
    DuplicateLanguage(String),
    #[error("This interest is already in your list: {0}")]
    DuplicateInterest(String),
    #[error("You can only add up to {MAX_INTERESTS} interests")]
    InterestLimit,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe handle to the local entry store
#[derive(Clone)]
pub struct KvStore {
    conn: Arc<Mutex<Connection>>,
}

impl KvStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Read the raw serialized value under a key
    pub fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM entries WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Replace the value under a key (last write wins)
    pub fn put_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove an entry; removing a missing key is not an error
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Deserialize the value under a key
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a value under a key
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.put_raw(key, &raw)
    }

    /// Read a value, falling back to its default when the entry is missing
    /// or unreadable. Read and parse failures are logged and swallowed:
    /// a corrupt entry behaves like no prior data.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Unreadable entry, starting fresh");
                T::default()
            }
        }
    }
}
