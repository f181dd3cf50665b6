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

//! Domain models and core data structures.
//!
//! This module defines the entities the pin registry works with: the media
//! items handed in by the rest of the application, the pinned snapshots the
//! registry keeps of them, and the derived per-item pin state.

pub(crate) mod order;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Registry key of a media item, assigned by the caller's database.
pub type PinId = i64;

/// Wire name of the pin timestamp field.
pub(crate) const PINNED_AT_FIELD: &str = "pinnedAt";

/// A media item as supplied by the caller.
///
/// Only `id` and `video_id` mean anything to the registry. Every other field
/// is carried along untouched in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: PinId,

    /// Secondary media identifier used by playback completion events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl MediaItem {
    pub fn new(id: PinId, video_id: impl Into<String>) -> Self {
        Self {
            id,
            video_id: Some(video_id.into()),
            payload: Map::new(),
        }
    }

    /// Adds an opaque payload field, builder style.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Builds an item from an arbitrary JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingId`] if the object has no integer `id`, and
    /// [`Error::Serialization`] if the remaining fields have the wrong shape.
    pub fn from_json(value: Value) -> Result<Self> {
        if value.get("id").and_then(Value::as_i64).is_none() {
            return Err(Error::MissingId);
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Whether this item refers to the given media identifier.
    pub fn has_video_id(&self, video_id: &str) -> bool {
        self.video_id.as_deref() == Some(video_id)
    }
}

/// Snapshot of a media item taken when it was pinned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedItem {
    #[serde(flatten)]
    pub item: MediaItem,

    /// Milliseconds since the Unix epoch at which the item entered the
    /// pinned set.
    #[serde(rename = "pinnedAt")]
    pub pinned_at: i64,
}

impl PinnedItem {
    pub(crate) fn new(mut item: MediaItem, pinned_at: i64) -> Self {
        // A caller may hand back an item it read from the registry.
        item.payload.remove(PINNED_AT_FIELD);

        Self { item, pinned_at }
    }

    pub fn id(&self) -> PinId {
        self.item.id
    }

    pub fn video_id(&self) -> Option<&str> {
        self.item.video_id.as_deref()
    }
}

/// The two independent modifiers a pin may carry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub priority: bool,
    pub follower: bool,
}

/// Pin state of an id, derived from registry membership.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PinState {
    Unpinned,
    Pinned(Modifiers),
}

impl PinState {
    pub fn pinned(priority: bool, follower: bool) -> Self {
        PinState::Pinned(Modifiers { priority, follower })
    }
}

/// Combined pin flags for display.
///
/// `is_pinned` is only set for plain (non-priority) pins, matching the
/// badge the UI draws for them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinInfo {
    pub is_pinned: bool,
    pub is_priority: bool,
    pub is_follower: bool,
    pub pinned_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_json_rejects_missing_id() {
        let result = MediaItem::from_json(json!({ "video_id": "abc", "title": "No id" }));
        assert!(matches!(result, Err(Error::MissingId)));
    }

    #[test]
    fn from_json_rejects_non_integer_id() {
        let result = MediaItem::from_json(json!({ "id": "7", "video_id": "abc" }));
        assert!(matches!(result, Err(Error::MissingId)));
    }

    #[test]
    fn from_json_keeps_payload() {
        let item = MediaItem::from_json(json!({
            "id": 7,
            "video_id": "abc",
            "title": "Seven",
            "duration": 215
        }))
        .unwrap();

        assert_eq!(item.id, 7);
        assert!(item.has_video_id("abc"));
        assert_eq!(item.payload.get("title"), Some(&json!("Seven")));
        assert_eq!(item.payload.get("duration"), Some(&json!(215)));
    }

    #[test]
    fn pinned_item_serializes_flat() {
        let item = MediaItem::new(3, "xyz").with_field("title", "Three");
        let pinned = PinnedItem::new(item, 1_700_000_000_000);

        let value = serde_json::to_value(&pinned).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "video_id": "xyz",
                "title": "Three",
                "pinnedAt": 1_700_000_000_000_i64
            })
        );

        let back: PinnedItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, pinned);
        assert!(!back.item.payload.contains_key(PINNED_AT_FIELD));
    }

    #[test]
    fn stale_timestamp_in_payload_is_dropped() {
        let item = MediaItem::new(3, "xyz").with_field(PINNED_AT_FIELD, 5);
        let pinned = PinnedItem::new(item, 10);

        assert_eq!(pinned.pinned_at, 10);
        assert!(!pinned.item.payload.contains_key(PINNED_AT_FIELD));
    }
}
