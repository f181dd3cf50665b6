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

//! Follower pin hand-off.
//!
//! When a follower-pinned item finishes playing, its pin moves to the item
//! after it in the sequence the user is watching. The successor takes over
//! the follower bit, and the priority bit if there was one, so a follower
//! pin walks through a playlist one completed item at a time.

use crate::{
    model::{MediaItem, PinnedItem},
    registry::PinRegistry,
    util::now_millis,
};

impl PinRegistry {
    /// Handles playback completion of the media identified by `video_id`.
    ///
    /// `sequence` is the ordered list of items currently in context, it is
    /// only read.
    ///
    /// * No pin for `video_id`: nothing happens.
    /// * A pin that is not a follower: the pin is removed.
    /// * A follower pin whose item is last in `sequence`, or absent from
    ///   it: the pin is removed.
    /// * Otherwise the pin moves to the next item in `sequence`, which is
    ///   returned.
    pub fn handle_follower_pin_completion(
        &mut self,
        video_id: &str,
        sequence: &[MediaItem],
    ) -> Option<MediaItem> {
        let (slot, old_id) = self
            .items
            .iter()
            .enumerate()
            .find(|(_, p)| p.item.has_video_id(video_id))
            .map(|(idx, p)| (idx, p.id()))?;

        if !self.is_follower_pin(old_id) {
            tracing::debug!("Completed pin {} is not a follower, unpinning", old_id);
            self.remove_pin_by_video_id(video_id);
            return None;
        }

        let position = sequence
            .iter()
            .position(|s| s.has_video_id(video_id))
            .or_else(|| sequence.iter().position(|s| s.id == old_id));

        let Some(next) = position.and_then(|idx| sequence.get(idx + 1)) else {
            tracing::debug!("Follower pin {} has no successor, unpinning", old_id);
            self.remove_pin(old_id);
            return None;
        };

        let was_priority = self.is_priority_pin(old_id);

        self.items.remove(slot);
        self.priority_ids.retain(|id| *id != old_id);
        self.follower_ids.remove(&old_id);

        // The successor may already be pinned, its fresh snapshot replaces
        // the old one in the predecessor's slot.
        let mut slot = slot;
        if let Some(existing) = self.items.iter().position(|p| p.id() == next.id) {
            self.items.remove(existing);
            if existing < slot {
                slot -= 1;
            }
        }

        self.items
            .insert(slot, PinnedItem::new(next.clone(), now_millis()));

        if was_priority {
            self.priority_ids.retain(|id| *id != next.id);
            self.priority_ids.insert(0, next.id);
        }

        self.follower_ids.insert(next.id);

        self.commit();

        tracing::debug!("Follower pin moved from {} to {}", old_id, next.id);

        Some(next.clone())
    }
}
