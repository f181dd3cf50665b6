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

//! Render ordering of pinned items.

use std::collections::HashMap;

use crate::model::{PinId, PinnedItem};

/// Moves priority pins to the front of `items`.
///
/// Priority pins come first, in the order given by `priority_ids`. All other
/// items follow in their existing relative order. Priority ids with no
/// matching item are skipped.
pub(crate) fn reorder(items: Vec<PinnedItem>, priority_ids: &[PinId]) -> Vec<PinnedItem> {
    if priority_ids.is_empty() {
        return items;
    }

    let rank: HashMap<PinId, usize> = priority_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx))
        .collect();

    let mut front: Vec<Option<PinnedItem>> = (0..priority_ids.len()).map(|_| None).collect();
    let mut rest = Vec::with_capacity(items.len());

    for item in items {
        match rank.get(&item.id()) {
            Some(&idx) => front[idx] = Some(item),
            None => rest.push(item),
        }
    }

    front.into_iter().flatten().chain(rest).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaItem;

    fn pins(ids: &[PinId]) -> Vec<PinnedItem> {
        ids.iter()
            .map(|id| PinnedItem::new(MediaItem::new(*id, format!("v{id}")), 0))
            .collect()
    }

    fn ids(items: &[PinnedItem]) -> Vec<PinId> {
        items.iter().map(PinnedItem::id).collect()
    }

    #[test]
    fn no_priority_keeps_order() {
        let ordered = reorder(pins(&[3, 1, 2]), &[]);
        assert_eq!(ids(&ordered), vec![3, 1, 2]);
    }

    #[test]
    fn priority_first_in_priority_order() {
        let ordered = reorder(pins(&[1, 2, 3, 4, 5]), &[4, 2]);
        assert_eq!(ids(&ordered), vec![4, 2, 1, 3, 5]);
    }

    #[test]
    fn partition_is_stable_for_the_rest() {
        let ordered = reorder(pins(&[9, 5, 7, 1, 8]), &[1]);
        assert_eq!(ids(&ordered), vec![1, 9, 5, 7, 8]);
    }

    #[test]
    fn unknown_priority_ids_are_skipped() {
        let ordered = reorder(pins(&[1, 2]), &[42, 2]);
        assert_eq!(ids(&ordered), vec![2, 1]);
    }
}
