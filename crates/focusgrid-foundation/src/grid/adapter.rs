//! Data adapter contract for the grid.
//!
//! This module defines the [`GridAdapter`] trait which provides the item
//! count and identity information the engine needs, and the [`DataChange`]
//! notifications a host sends when the backing data moves.

use std::ops::Range;

/// Provides the items a [`FocusGrid`](super::FocusGrid) lays out.
///
/// Adapters are read on every pass and must answer consistently between a
/// change notification and the next layout.
pub trait GridAdapter {
    /// The total number of items (attached or not).
    fn item_count(&self) -> usize;

    /// View type used by the recycler to pick a compatible view.
    fn view_type(&self, position: usize) -> u32 {
        let _ = position;
        0
    }

    /// Stable identity of the item at `position`.
    ///
    /// Identity lets selection, saved state and the scroll anchor follow an
    /// item across inserts, removals and full data-set changes.
    fn stable_id(&self, position: usize) -> Option<u64> {
        let _ = position;
        None
    }

    /// Position of the item with `id`, if any.
    fn index_of_id(&self, id: u64) -> Option<usize> {
        // Default implementation: linear search
        (0..self.item_count()).find(|&i| self.stable_id(i) == Some(id))
    }

    /// Looks for `id` inside `near` first, then falls back to a full search.
    fn index_of_id_near(&self, id: u64, near: Range<usize>) -> Option<usize> {
        let count = self.item_count();
        let near = near.start.min(count)..near.end.min(count);
        near.clone()
            .find(|&i| self.stable_id(i) == Some(id))
            .or_else(|| self.index_of_id(id))
    }
}

/// Change notifications delivered between layout passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataChange {
    Inserted { start: usize, count: usize },
    Removed { start: usize, count: usize },
    Moved { from: usize, to: usize },
    Changed { start: usize, count: usize },
    /// Everything may have changed; positions are only recoverable by id.
    DataSetChanged,
}

impl DataChange {
    /// Where a position that existed before this change ends up after it.
    ///
    /// Returns `None` when the item was removed, or when the change does not
    /// carry enough information to follow it.
    pub fn map_position(self, position: usize) -> Option<usize> {
        match self {
            DataChange::Inserted { start, count } => {
                if position >= start {
                    Some(position + count)
                } else {
                    Some(position)
                }
            }
            DataChange::Removed { start, count } => {
                if position >= start + count {
                    Some(position - count)
                } else if position >= start {
                    None
                } else {
                    Some(position)
                }
            }
            DataChange::Moved { from, to } => {
                if position == from {
                    Some(to)
                } else if from < position && position <= to {
                    Some(position - 1)
                } else if to <= position && position < from {
                    Some(position + 1)
                } else {
                    Some(position)
                }
            }
            DataChange::Changed { .. } => Some(position),
            DataChange::DataSetChanged => None,
        }
    }

    /// Change of the item count this notification implies, if known.
    pub fn count_delta(self) -> Option<isize> {
        match self {
            DataChange::Inserted { count, .. } => Some(count as isize),
            DataChange::Removed { count, .. } => Some(-(count as isize)),
            DataChange::Moved { .. } | DataChange::Changed { .. } => Some(0),
            DataChange::DataSetChanged => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ids(Vec<u64>);

    impl GridAdapter for Ids {
        fn item_count(&self) -> usize {
            self.0.len()
        }

        fn stable_id(&self, position: usize) -> Option<u64> {
            self.0.get(position).copied()
        }
    }

    #[test]
    fn default_index_of_id_searches_linearly() {
        let ids = Ids(vec![10, 20, 30]);
        assert_eq!(ids.index_of_id(30), Some(2));
        assert_eq!(ids.index_of_id(99), None);
        assert_eq!(ids.index_of_id_near(10, 1..3), Some(0));
    }

    #[test]
    fn insert_shifts_positions_at_or_after_start() {
        let change = DataChange::Inserted { start: 3, count: 2 };
        assert_eq!(change.map_position(2), Some(2));
        assert_eq!(change.map_position(3), Some(5));
    }

    #[test]
    fn removal_drops_covered_positions() {
        let change = DataChange::Removed { start: 3, count: 2 };
        assert_eq!(change.map_position(4), None);
        assert_eq!(change.map_position(5), Some(3));
        assert_eq!(change.map_position(1), Some(1));
    }

    #[test]
    fn move_shifts_items_between_ends() {
        let change = DataChange::Moved { from: 1, to: 4 };
        assert_eq!(change.map_position(1), Some(4));
        assert_eq!(change.map_position(3), Some(2));
        assert_eq!(change.map_position(5), Some(5));
        let back = DataChange::Moved { from: 4, to: 1 };
        assert_eq!(back.map_position(2), Some(3));
    }
}
