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

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    error::Result,
    model::{PinId, PinnedItem, order::reorder},
};

/// Serialized form of the whole registry.
///
/// Field names match the storage format used by earlier releases, so stores
/// written by those can be read back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinSnapshot {
    #[serde(rename = "pinnedVideos", default, deserialize_with = "null_as_default")]
    pub items: Vec<PinnedItem>,

    #[serde(rename = "priorityPinIds", default, deserialize_with = "null_as_default")]
    pub priority_ids: Vec<PinId>,

    #[serde(rename = "followerPinIds", default, deserialize_with = "null_as_default")]
    pub follower_ids: Vec<PinId>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PinSnapshot {
    /// Parses a stored snapshot.
    ///
    /// Accepts both the bare object and the `{"state": {...}, "version": n}`
    /// envelope older releases wrote. The result is [`sanitized`].
    ///
    /// [`sanitized`]: PinSnapshot::sanitized
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if `raw` is not a snapshot.
    pub fn decode(raw: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(raw)?;

        let envelope = value
            .get_mut("state")
            .filter(|s| s.is_object())
            .map(Value::take);
        if let Some(state) = envelope {
            value = state;
        }

        let snapshot: PinSnapshot = serde_json::from_value(value)?;

        Ok(snapshot.sanitized())
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores the registry invariants on data of unknown origin.
    ///
    /// Drops duplicate items (first occurrence wins), duplicate priority ids,
    /// and modifier ids that have no item, then re-derives render order.
    pub fn sanitized(self) -> Self {
        let mut pinned = HashSet::new();
        let items: Vec<PinnedItem> = self
            .items
            .into_iter()
            .filter(|item| pinned.insert(item.id()))
            .collect();

        let mut seen = HashSet::new();
        let priority_ids: Vec<PinId> = self
            .priority_ids
            .into_iter()
            .filter(|id| pinned.contains(id) && seen.insert(*id))
            .collect();

        let follower_ids = self
            .follower_ids
            .into_iter()
            .filter(|id| pinned.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            items: reorder(items, &priority_ids),
            priority_ids,
            follower_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ids(snapshot: &PinSnapshot) -> Vec<PinId> {
        snapshot.items.iter().map(PinnedItem::id).collect()
    }

    #[test]
    fn missing_and_null_fields_default_to_empty() {
        let snapshot = PinSnapshot::decode("{}").unwrap();
        assert_eq!(snapshot, PinSnapshot::default());

        let raw = r#"{"pinnedVideos": null, "priorityPinIds": null, "followerPinIds": null}"#;
        assert_eq!(PinSnapshot::decode(raw).unwrap(), PinSnapshot::default());
    }

    #[test]
    fn legacy_envelope_is_unwrapped() {
        let raw = json!({
            "state": {
                "pinnedVideos": [{ "id": 1, "video_id": "a", "pinnedAt": 10 }],
                "priorityPinIds": [1]
            },
            "version": 0
        })
        .to_string();

        let snapshot = PinSnapshot::decode(&raw).unwrap();
        assert_eq!(ids(&snapshot), vec![1]);
        assert_eq!(snapshot.priority_ids, vec![1]);
        assert!(snapshot.follower_ids.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(PinSnapshot::decode("not json").is_err());
        assert!(PinSnapshot::decode(r#"{"pinnedVideos": 5}"#).is_err());
    }

    #[test]
    fn sanitize_restores_invariants() {
        let raw = json!({
            "pinnedVideos": [
                { "id": 1, "video_id": "a", "pinnedAt": 1 },
                { "id": 2, "video_id": "b", "pinnedAt": 2 },
                { "id": 1, "video_id": "dup", "pinnedAt": 3 },
                { "id": 3, "video_id": "c", "pinnedAt": 4 }
            ],
            "priorityPinIds": [3, 9, 3],
            "followerPinIds": [2, 8, 2]
        })
        .to_string();

        let snapshot = PinSnapshot::decode(&raw).unwrap();

        assert_eq!(ids(&snapshot), vec![3, 1, 2]);
        assert_eq!(snapshot.items[1].video_id(), Some("a"));
        assert_eq!(snapshot.priority_ids, vec![3]);
        assert_eq!(snapshot.follower_ids, vec![2]);
    }

    #[test]
    fn encode_uses_stored_field_names() {
        let snapshot = PinSnapshot::default();
        let value: Value = serde_json::from_str(&snapshot.encode().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({ "pinnedVideos": [], "priorityPinIds": [], "followerPinIds": [] })
        );
    }
}
