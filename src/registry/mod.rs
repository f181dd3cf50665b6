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

//! Pin registry.
//!
//! This module provides the state of pinned media items: which items are
//! pinned, which of those are priority pins (always rendered first, most
//! recently promoted first), and which are follower pins (handed on to the
//! next item in a sequence when they finish playing, see [`transfer`]).
//!
//! Every mutation leaves the items in render order and queues a snapshot of
//! the whole registry for persistence. Mutations never fail; requests that
//! do not apply (unpinning something that is not pinned, for example) are
//! silently ignored so that duplicate or late UI events are harmless.

mod transfer;

use std::collections::BTreeSet;

use crate::{
    config::PinConfig,
    error::Result,
    model::{MediaItem, Modifiers, PinId, PinInfo, PinState, PinnedItem, order::reorder},
    store::PinSnapshot,
    tasks::StoreHandle,
    util::now_millis,
};

struct Persistence {
    store: StoreHandle,
    key: String,
}

/// The set of pinned items and their modifiers.
pub struct PinRegistry {
    /// Kept in render order.
    items: Vec<PinnedItem>,

    /// Most recently promoted first.
    priority_ids: Vec<PinId>,

    follower_ids: BTreeSet<PinId>,

    persistence: Option<Persistence>,
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PinRegistry {
    /// Creates an empty registry that is not persisted anywhere.
    pub fn new() -> Self {
        Self::from_snapshot(PinSnapshot::default())
    }

    /// Creates an unpersisted registry holding `snapshot`.
    ///
    /// The snapshot is sanitized first, so the registry invariants hold
    /// whatever the input.
    pub fn from_snapshot(snapshot: PinSnapshot) -> Self {
        let PinSnapshot {
            items,
            priority_ids,
            follower_ids,
        } = snapshot.sanitized();

        Self {
            items,
            priority_ids,
            follower_ids: follower_ids.into_iter().collect(),
            persistence: None,
        }
    }

    /// Loads the registry stored under `key` and persists every later change
    /// back to it.
    ///
    /// A missing or corrupt stored value yields an empty registry; the
    /// problem is logged and the next change overwrites it.
    ///
    /// If the store cannot be read at all, the registry starts empty and is
    /// not persisted for this session, so the stored pins are left intact.
    pub fn open(store: &StoreHandle, key: impl Into<String>) -> Self {
        let key = key.into();

        let snapshot = match store.load(&key) {
            Ok(Some(raw)) => PinSnapshot::decode(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt pin state under {}: {}", key, e);
                PinSnapshot::default()
            }),
            Ok(None) => PinSnapshot::default(),
            Err(e) => {
                tracing::warn!(
                    "Failed to load pin state under {}, changes will not be saved: {}",
                    key,
                    e
                );
                return Self::new();
            }
        };

        let mut registry = Self::from_snapshot(snapshot);
        registry.persistence = Some(Persistence {
            store: store.clone(),
            key,
        });

        tracing::debug!(
            "Loaded {} pins ({} priority, {} follower)",
            registry.items.len(),
            registry.priority_ids.len(),
            registry.follower_ids.len()
        );

        registry
    }

    /// Opens the database named by `config` and loads the registry from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_with_config(config: &PinConfig) -> Result<Self> {
        let store = config.open_store()?;
        Ok(Self::open(&store, config.pins_key.clone()))
    }

    /// Pins an unpinned item, or toggles the follower modifier of a pinned
    /// one.
    ///
    /// A newly pinned item is a plain pin placed after all existing pins.
    /// On an already pinned item only the follower bit changes, priority is
    /// left alone. Use [`remove_pin`](Self::remove_pin) to unpin.
    pub fn toggle_pin(&mut self, item: MediaItem) {
        let id = item.id;

        if self.contains(id) {
            if !self.follower_ids.remove(&id) {
                self.follower_ids.insert(id);
            }
        } else {
            self.items.push(PinnedItem::new(item, now_millis()));
        }

        self.commit();
    }

    /// Promotes an item to the most recent priority pin, pinning it first
    /// if needed.
    ///
    /// Promoting an item that is already a priority pin does nothing. An
    /// existing plain pin keeps its snapshot, timestamp and follower bit.
    pub fn toggle_priority_pin(&mut self, item: MediaItem) {
        let id = item.id;

        if self.is_priority_pin(id) {
            tracing::debug!("Pin {} is already a priority pin", id);
            return;
        }

        self.priority_ids.insert(0, id);

        if !self.contains(id) {
            self.items.insert(0, PinnedItem::new(item, now_millis()));
        }

        self.commit();
    }

    /// Removes `id` from the registry along with both its modifiers.
    ///
    /// Returns whether anything was removed.
    pub fn remove_pin(&mut self, id: PinId) -> bool {
        if !self.contains(id) {
            return false;
        }

        self.items.retain(|p| p.id() != id);
        self.priority_ids.retain(|p| *p != id);
        self.follower_ids.remove(&id);

        self.commit();

        true
    }

    /// Removes the pin whose media identifier is `video_id`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_pin_by_video_id(&mut self, video_id: &str) -> bool {
        let Some(id) = self.find_by_video_id(video_id).map(PinnedItem::id) else {
            return false;
        };

        self.remove_pin(id)
    }

    /// Flips the follower modifier of a pinned item.
    ///
    /// An unpinned id cannot become a follower, so that case does nothing.
    pub fn toggle_follower_pin(&mut self, id: PinId) {
        if self.follower_ids.remove(&id) {
            self.commit();
        } else {
            self.set_follower_pin(id);
        }
    }

    /// Marks a pinned item as a follower. Does nothing for unpinned ids.
    pub fn set_follower_pin(&mut self, id: PinId) {
        if !self.contains(id) {
            tracing::debug!("Ignoring follower request for unpinned {}", id);
            return;
        }

        if self.follower_ids.insert(id) {
            self.commit();
        }
    }

    /// Clears the follower modifier of `id`, keeping the pin itself.
    pub fn remove_follower_status(&mut self, id: PinId) {
        if self.follower_ids.remove(&id) {
            self.commit();
        }
    }

    pub fn clear_all_pins(&mut self) {
        self.items.clear();
        self.priority_ids.clear();
        self.follower_ids.clear();

        self.commit();
    }

    /// Retained for callers written against timed pins. Pins never expire,
    /// they persist until removed.
    pub fn check_expiration(&mut self) {}

    /// True for plain pins only, priority pins report `false`.
    pub fn is_pinned(&self, id: PinId) -> bool {
        self.contains(id) && !self.is_priority_pin(id)
    }

    pub fn is_priority_pin(&self, id: PinId) -> bool {
        self.priority_ids.contains(&id)
    }

    pub fn is_follower_pin(&self, id: PinId) -> bool {
        self.follower_ids.contains(&id)
    }

    pub fn pin_info(&self, id: PinId) -> PinInfo {
        PinInfo {
            is_pinned: self.is_pinned(id),
            is_priority: self.is_priority_pin(id),
            is_follower: self.is_follower_pin(id),
            pinned_at: self
                .is_pinned(id)
                .then(|| self.get(id).map(|p| p.pinned_at))
                .flatten(),
        }
    }

    pub fn state(&self, id: PinId) -> PinState {
        match self.modifiers(id) {
            Some(modifiers) => PinState::Pinned(modifiers),
            None => PinState::Unpinned,
        }
    }

    /// Modifiers of a pinned item, `None` if `id` is not pinned.
    pub fn modifiers(&self, id: PinId) -> Option<Modifiers> {
        self.contains(id).then(|| Modifiers {
            priority: self.is_priority_pin(id),
            follower: self.is_follower_pin(id),
        })
    }

    /// Pinned items in render order.
    pub fn items(&self) -> &[PinnedItem] {
        &self.items
    }

    pub fn get(&self, id: PinId) -> Option<&PinnedItem> {
        self.items.iter().find(|p| p.id() == id)
    }

    pub fn find_by_video_id(&self, video_id: &str) -> Option<&PinnedItem> {
        self.items.iter().find(|p| p.item.has_video_id(video_id))
    }

    /// Priority pin ids, most recently promoted first.
    pub fn priority_ids(&self) -> &[PinId] {
        &self.priority_ids
    }

    /// Follower pin ids in ascending order.
    pub fn follower_ids(&self) -> impl Iterator<Item = PinId> + '_ {
        self.follower_ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> PinSnapshot {
        PinSnapshot {
            items: self.items.clone(),
            priority_ids: self.priority_ids.clone(),
            follower_ids: self.follower_ids.iter().copied().collect(),
        }
    }

    /// Blocks until every queued write of this registry has reached the
    /// store. A registry without persistence returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::WorkerStopped`] if the store worker is gone.
    pub fn flush(&self) -> Result<()> {
        match &self.persistence {
            Some(persistence) => persistence.store.flush(),
            None => Ok(()),
        }
    }

    fn contains(&self, id: PinId) -> bool {
        self.items.iter().any(|p| p.id() == id)
    }

    /// Re-derives render order and queues a save.
    fn commit(&mut self) {
        let items = std::mem::take(&mut self.items);
        self.items = reorder(items, &self.priority_ids);

        self.persist();
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };

        match self.snapshot().encode() {
            Ok(value) => persistence.store.save(&persistence.key, value),
            Err(e) => tracing::error!("Failed to serialize pin state: {}", e),
        }
    }
}
