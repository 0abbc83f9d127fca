//! Directional focus.
//!
//! The navigator owns the single selection and the small state machine
//! around moving it. Geometry questions ("what is below this item?") are
//! answered by [`find_candidate`] over the attached items only; extending
//! the window to find more candidates is the caller's job.

use std::collections::VecDeque;
use std::ops::Range;

use focusgrid_geometry::{Axis, MoveDirection};

use super::adapter::{DataChange, GridAdapter};
use super::item::AttachedItem;

/// Tolerance for comparing edges that were computed independently.
const EDGE_EPSILON: f32 = 0.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusState {
    /// No move in progress.
    #[default]
    Idle,
    /// Moving toward `target`, which may not be attached yet. The previous
    /// selection stays recorded until the target is reached and may have
    /// been detached on the way.
    Seeking { target: usize },
    /// The selection is attached and aligned.
    Settled,
}

/// The selected item, as last known.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionRecord {
    pub position: Option<usize>,
    pub sub_position: usize,
    pub stable_id: Option<u64>,
    /// Shift accumulated from change notifications since the last layout.
    pub pending_delta: isize,
    /// Set when only the stable id can tell where the selection went.
    pub needs_remap: bool,
}

impl SelectionRecord {
    fn effective_position(&self) -> Option<usize> {
        self.position
            .map(|position| (position as isize + self.pending_delta).max(0) as usize)
    }

    /// Folds a change notification into the pending delta.
    pub fn apply_change(&mut self, change: DataChange) {
        let (Some(position), Some(effective)) = (self.position, self.effective_position()) else {
            return;
        };
        match change.map_position(effective) {
            Some(mapped) => self.pending_delta = mapped as isize - position as isize,
            None => {
                self.needs_remap = true;
                if let DataChange::Removed { start, .. } = change {
                    // fallback if the id is gone too: the item that took its place
                    self.pending_delta = start as isize - position as isize;
                }
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_delta != 0 || self.needs_remap
    }

    /// Settles the record against the adapter.
    ///
    /// Follows the stable id when the position alone is not trustworthy,
    /// and clamps into range otherwise. Returns the resolved position.
    pub fn resolve(&mut self, adapter: &dyn GridAdapter, near: Range<usize>) -> Option<usize> {
        let effective = self.effective_position()?;
        let count = adapter.item_count();
        if count == 0 {
            *self = Self::default();
            return None;
        }
        let clamped = effective.min(count - 1);
        let id_moved = self
            .stable_id
            .is_some_and(|id| adapter.stable_id(clamped) != Some(id));
        let resolved = if self.needs_remap || id_moved {
            self.stable_id
                .and_then(|id| adapter.index_of_id_near(id, near))
                .unwrap_or(clamped)
        } else {
            clamped
        };
        let new_id = adapter.stable_id(resolved);
        if new_id != self.stable_id || (new_id.is_none() && Some(resolved) != self.position) {
            self.sub_position = 0;
        }
        self.position = Some(resolved);
        self.stable_id = new_id;
        self.pending_delta = 0;
        self.needs_remap = false;
        Some(resolved)
    }
}

/// Selection change delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionEvent {
    pub position: Option<usize>,
    pub sub_position: usize,
    pub stable_id: Option<u64>,
}

/// What a directional input did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
    Moved { from: Option<usize>, to: usize },
    SubPositionChanged { position: usize, sub_position: usize },
    Unchanged,
    /// Focus should leave the grid in this direction.
    Escaped(MoveDirection),
}

impl FocusOutcome {
    pub fn moved(&self) -> bool {
        matches!(
            self,
            FocusOutcome::Moved { .. } | FocusOutcome::SubPositionChanged { .. }
        )
    }
}

#[derive(Debug, Default)]
pub struct FocusNavigator {
    state: FocusState,
    record: SelectionRecord,
    seek_target_id: Option<u64>,
}

impl FocusNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn selection(&self) -> &SelectionRecord {
        &self.record
    }

    pub fn selected_position(&self) -> Option<usize> {
        self.record.position
    }

    pub fn event(&self) -> SelectionEvent {
        SelectionEvent {
            position: self.record.position,
            sub_position: self.record.sub_position,
            stable_id: self.record.stable_id,
        }
    }

    /// Selects `position` and settles.
    pub fn select(
        &mut self,
        position: usize,
        sub_position: usize,
        stable_id: Option<u64>,
    ) -> SelectionEvent {
        self.record = SelectionRecord {
            position: Some(position),
            sub_position,
            stable_id,
            pending_delta: 0,
            needs_remap: false,
        };
        self.state = FocusState::Settled;
        self.seek_target_id = None;
        self.event()
    }

    pub fn set_sub_position(&mut self, sub_position: usize) -> SelectionEvent {
        self.record.sub_position = sub_position;
        self.event()
    }

    pub fn clear(&mut self) {
        self.record = SelectionRecord::default();
        self.state = FocusState::Idle;
        self.seek_target_id = None;
    }

    /// Replaces the record with one read back from saved state. It is
    /// resolved against the adapter by the next pass.
    pub fn restore(&mut self, record: SelectionRecord) {
        self.record = record;
        self.state = FocusState::Idle;
        self.seek_target_id = None;
    }

    pub fn begin_seek(&mut self, target: usize, target_id: Option<u64>) {
        self.state = FocusState::Seeking { target };
        self.seek_target_id = target_id;
    }

    pub fn seek_target(&self) -> Option<usize> {
        match self.state {
            FocusState::Seeking { target } => Some(target),
            _ => None,
        }
    }

    pub fn settle(&mut self) {
        self.state = if self.record.position.is_some() {
            FocusState::Settled
        } else {
            FocusState::Idle
        };
        self.seek_target_id = None;
    }

    /// Tracks a change notification. An interrupted seek hands its target
    /// to the selection and goes idle.
    pub fn on_data_change(&mut self, change: DataChange) {
        if let FocusState::Seeking { target } = self.state {
            self.record.position = Some(target);
            self.record.stable_id = self.seek_target_id.take();
            self.record.sub_position = 0;
            self.record.pending_delta = 0;
            self.record.needs_remap = false;
        }
        self.record.apply_change(change);
        if self.record.position.is_some() {
            self.state = FocusState::Idle;
        }
    }

    /// Resolves a pending selection against the adapter.
    pub fn resolve(&mut self, adapter: &dyn GridAdapter, near: Range<usize>) -> Option<usize> {
        self.record.resolve(adapter, near)
    }

    /// Sub-position reached by stepping inside `item`, if any.
    pub fn sub_step(&self, item: &AttachedItem, forward: bool) -> Option<usize> {
        let current = self.record.sub_position;
        if forward {
            (current + 1 < item.sub_positions).then_some(current + 1)
        } else {
            current.checked_sub(1)
        }
    }
}

/// Index in `items` of the nearest focusable item from `from` in `direction`.
///
/// Along the main axis the nearest row or column band wins first, then the
/// smallest distance across it, then the lower position. Across the main
/// axis only items overlapping `from` on the main axis qualify.
pub fn find_candidate(
    items: &VecDeque<AttachedItem>,
    from: &AttachedItem,
    direction: MoveDirection,
    axis: Axis,
) -> Option<usize> {
    let forward = direction.is_forward();
    let candidates = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.focusable && item.position != from.position);

    if direction.axis() == axis {
        let ahead: Vec<(usize, &AttachedItem)> = candidates
            .filter(|(_, item)| {
                if forward {
                    item.main_start > from.main_start + EDGE_EPSILON
                        && item.main_center() > from.main_center()
                } else {
                    item.main_end() < from.main_end() - EDGE_EPSILON
                        && item.main_center() < from.main_center()
                }
            })
            .collect();
        let nearest = if forward {
            ahead
                .iter()
                .min_by(|a, b| a.1.main_start.total_cmp(&b.1.main_start))
        } else {
            ahead
                .iter()
                .max_by(|a, b| a.1.main_end().total_cmp(&b.1.main_end()))
        };
        let nearest = nearest?.1;
        let in_band = |item: &AttachedItem| {
            if forward {
                item.main_start < nearest.main_end().max(nearest.main_start + EDGE_EPSILON)
            } else {
                item.main_end() > nearest.main_start.min(nearest.main_end() - EDGE_EPSILON)
            }
        };
        ahead
            .iter()
            .filter(|(_, item)| in_band(item))
            .min_by(|a, b| {
                let da = (a.1.cross_center() - from.cross_center()).abs();
                let db = (b.1.cross_center() - from.cross_center()).abs();
                da.total_cmp(&db).then(a.1.position.cmp(&b.1.position))
            })
            .map(|(index, _)| *index)
    } else {
        candidates
            .filter(|(_, item)| {
                let beside = if forward {
                    item.cross_start >= from.cross_end() - EDGE_EPSILON
                } else {
                    item.cross_end() <= from.cross_start + EDGE_EPSILON
                };
                let from_end = from.main_end().max(from.main_start + EDGE_EPSILON);
                beside && item.overlaps_main(from.main_start, from_end)
            })
            .min_by(|a, b| {
                let gap = |item: &AttachedItem| {
                    if forward {
                        item.cross_start - from.cross_end()
                    } else {
                        from.cross_start - item.cross_end()
                    }
                };
                let da = (a.1.main_center() - from.main_center()).abs();
                let db = (b.1.main_center() - from.main_center()).abs();
                gap(a.1)
                    .total_cmp(&gap(b.1))
                    .then(da.total_cmp(&db))
                    .then(a.1.position.cmp(&b.1.position))
            })
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
#[path = "tests/focus_tests.rs"]
mod tests;
