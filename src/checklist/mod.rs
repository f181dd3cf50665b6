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

//! Pins page checklist.
//!
//! A short list of checkable notes shown next to the pins, persisted through
//! the same store as the pins themselves.

use rand::{rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{config::PinConfig, error::Result, tasks::StoreHandle, util::now_millis};

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub checked: bool,
    pub created_at: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChecklistState {
    #[serde(default)]
    items: Vec<ChecklistItem>,
}

pub struct Checklist {
    items: Vec<ChecklistItem>,
    persistence: Option<(StoreHandle, String)>,
}

impl Default for Checklist {
    fn default() -> Self {
        Self::new()
    }
}

impl Checklist {
    pub fn new() -> Self {
        Self {
            items: vec![],
            persistence: None,
        }
    }

    /// Loads the checklist stored under `key`, starting empty if there is
    /// none or it is corrupt. If the store cannot be read the checklist
    /// starts empty and is not persisted, leaving the stored one intact.
    pub fn open(store: &StoreHandle, key: impl Into<String>) -> Self {
        let key = key.into();

        let state = match store.load(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt checklist under {}: {}", key, e);
                ChecklistState::default()
            }),
            Ok(None) => ChecklistState::default(),
            Err(e) => {
                tracing::warn!(
                    "Failed to load checklist under {}, changes will not be saved: {}",
                    key,
                    e
                );
                return Self::new();
            }
        };

        Self {
            items: state.items,
            persistence: Some((store.clone(), key)),
        }
    }

    pub fn open_with_config(config: &PinConfig) -> Result<Self> {
        let store = config.open_store()?;
        Ok(Self::open(&store, config.checklist_key.clone()))
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Appends a new unchecked item. Blank text is ignored.
    ///
    /// Returns the id of the new item.
    pub fn add_item(&mut self, text: &str, created_at: Option<i64>) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let created_at = created_at.unwrap_or_else(now_millis);
        let id = format!("cl-{}-{}", created_at, random_suffix());

        self.items.push(ChecklistItem {
            id: id.clone(),
            text: text.to_string(),
            checked: false,
            created_at,
        });
        self.persist();

        Some(id)
    }

    pub fn toggle_checked(&mut self, id: &str) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.checked = !item.checked;
            self.persist();
        }
    }

    pub fn remove_item(&mut self, id: &str) {
        let len = self.items.len();
        self.items.retain(|i| i.id != id);

        if self.items.len() != len {
            self.persist();
        }
    }

    /// Replaces the text of an item. Blank text is ignored.
    pub fn set_item_text(&mut self, id: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.text = text.to_string();
            self.persist();
        }
    }

    pub fn flush(&self) -> Result<()> {
        match &self.persistence {
            Some((store, _)) => store.flush(),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        let Some((store, key)) = &self.persistence else {
            return;
        };

        let state = ChecklistState {
            items: self.items.clone(),
        };

        match serde_json::to_string(&state) {
            Ok(value) => store.save(key, value),
            Err(e) => tracing::error!("Failed to serialize checklist: {}", e),
        }
    }
}

fn random_suffix() -> String {
    let mut rng = rng();

    (0..ID_SUFFIX_LEN)
        .filter_map(|_| ID_ALPHABET.choose(&mut rng))
        .map(|b| *b as char)
        .collect()
}
