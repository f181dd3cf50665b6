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

//! Application configuration.
//!
//! This module manages the configuration file naming the pin database and
//! the storage keys used inside it.

use std::{path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    store::SqliteStore,
    tasks::{StoreHandle, spawn_store_worker},
};

const CONFIG_NAME: &str = "pinboard";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PinConfig {
    pub version: u32,
    pub database_file: PathBuf,
    pub pins_key: String,
    pub checklist_key: String,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            version: 1,
            database_file: PathBuf::from("pinboard.db"),
            pins_key: "pin-storage".to_string(),
            checklist_key: "pins-page-checklist-storage".to_string(),
        }
    }
}

impl PinConfig {
    /// Opens the configured database and starts a store worker for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_store(&self) -> Result<StoreHandle> {
        let store = SqliteStore::open(&self.database_file)?;
        Ok(spawn_store_worker(Arc::new(store)))
    }
}

pub fn load_config() -> PinConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {}", e);
        PinConfig::default()
    })
}

pub fn save_config(cfg: &PinConfig) -> Result<()> {
    confy::store(CONFIG_NAME, None, cfg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stored_key_names() {
        let cfg = PinConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.pins_key, "pin-storage");
        assert_eq!(cfg.checklist_key, "pins-page-checklist-storage");
    }

    #[test]
    fn open_store_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PinConfig {
            database_file: dir.path().join("pins.db"),
            ..PinConfig::default()
        };

        let store = cfg.open_store().unwrap();
        store.save("k", "v".to_string());
        store.flush().unwrap();

        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
        assert!(cfg.database_file.exists());
    }
}
