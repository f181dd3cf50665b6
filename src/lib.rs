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

//! # Pinned media for quick access.
//!
//! This crate keeps track of which media items a user has pinned, ordered so
//! that priority pins always come first, and moves follower pins along a
//! playlist as items finish playing.
//!
//! ## Architecture
//!
//! * [`PinRegistry`] is an owned value. UI handlers call its operations
//!   directly; every operation is synchronous and never fails.
//! * Persistence is injected: a registry opened on a [`StoreHandle`] queues a
//!   full snapshot after each change. A background worker thread writes the
//!   snapshots through a [`PersistenceGate`] (SQLite by default) and logs
//!   any failure, the caller never waits on or sees a write.
//!
//! ```no_run
//! use pinboard::{MediaItem, PinRegistry, config};
//!
//! # fn main() -> pinboard::Result<()> {
//! let mut pins = PinRegistry::open_with_config(&config::load_config())?;
//!
//! let episode = MediaItem::new(41, "dQw4w9WgXcQ").with_field("title", "Episode 1");
//! pins.toggle_pin(episode.clone());
//! pins.toggle_priority_pin(episode);
//! # Ok(())
//! # }
//! ```

pub mod checklist;
pub mod config;
mod db;
mod error;
pub mod model;
mod registry;
pub mod store;
pub mod tasks;
mod util;

pub use checklist::{Checklist, ChecklistItem};
pub use config::PinConfig;
pub use error::{Error, Result};
pub use model::{MediaItem, Modifiers, PinId, PinInfo, PinState, PinnedItem};
pub use registry::PinRegistry;
pub use store::{MemoryStore, PersistenceGate, PinSnapshot, SqliteStore};
pub use tasks::{StoreHandle, spawn_store_worker};
