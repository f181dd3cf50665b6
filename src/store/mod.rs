// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Durable key/value storage for pin state.
//!
//! The registry never talks to a database directly. It reads and writes
//! whole serialized snapshots through a [`PersistenceGate`], which makes the
//! storage engine swappable: [`SqliteStore`] for the application and
//! [`MemoryStore`] for tests and hosts that persist elsewhere.

mod snapshot;

pub use snapshot::PinSnapshot;

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use rusqlite::Connection;

use crate::{db, error::Result};

/// A durable string store keyed by name.
pub trait PersistenceGate: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite backed store, one row per key.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialised.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = db::init_db(path.as_ref())?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceGate for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        db::get_value(&self.conn(), key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        db::put_value(&self.conn(), key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        db::delete_value(&self.conn(), key)
    }
}

/// In-memory store.
///
/// Clones share the same underlying map, so a test can keep one handle and
/// hand another to a registry.
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `key` with `value` directly.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values().insert(key.into(), value.into());
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceGate for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();

        other.save("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert_eq!(other.get("k"), None);
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.save("pin-storage", "{}").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load("pin-storage").unwrap().as_deref(), Some("{}"));

        store.remove("pin-storage").unwrap();
        assert_eq!(store.load("pin-storage").unwrap(), None);
    }
}
