//! Per-fill working state and the re-entrancy phase of the engine.

use super::focus::SelectionEvent;
use super::recycler::ViewHandle;

/// Direction a fill walks the adapter in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillDirection {
    Forward,
    Backward,
}

impl FillDirection {
    /// Position after `position` in this direction, if it exists.
    pub fn step(self, position: usize, item_count: usize) -> Option<usize> {
        match self {
            FillDirection::Forward => {
                let next = position + 1;
                (next < item_count).then_some(next)
            }
            FillDirection::Backward => position.checked_sub(1),
        }
    }
}

/// Working state of one fill invocation.
///
/// The caller sets the inputs; the fill reports back through the output
/// fields. Nothing here outlives the call.
#[derive(Clone, Debug)]
pub struct LayoutState {
    /// Next position to place.
    pub anchor_position: usize,
    /// Main-axis line empty lanes start from when nothing is attached.
    pub anchor_offset: f32,
    /// Per-lane lines that replace `anchor_offset` for a relayout which
    /// keeps every lane where it was.
    pub lane_starts: Option<Vec<f32>>,
    pub direction: FillDirection,
    /// Pixels left to fill past the current edge.
    pub available: f32,
    /// Stop after the first chunk containing a focusable item.
    pub stop_on_focusable: bool,
    /// Upper bound on items placed by this fill.
    pub item_budget: Option<usize>,
    /// Place at least one chunk even if `available` is already spent.
    pub force_first_chunk: bool,

    /// Set when a view could not be obtained and a corrective pass is due.
    pub needs_corrective_pass: bool,
    /// First focusable position placed by this fill.
    pub focusable_found: Option<usize>,
    pub items_placed: usize,
}

impl LayoutState {
    pub fn new(anchor_position: usize, direction: FillDirection, available: f32) -> Self {
        Self {
            anchor_position,
            anchor_offset: 0.0,
            lane_starts: None,
            direction,
            available,
            stop_on_focusable: false,
            item_budget: None,
            force_first_chunk: false,
            needs_corrective_pass: false,
            focusable_found: None,
            items_placed: 0,
        }
    }

    pub fn with_anchor_offset(mut self, offset: f32) -> Self {
        self.anchor_offset = offset;
        self
    }

    pub fn with_item_budget(mut self, budget: usize) -> Self {
        self.item_budget = Some(budget);
        self
    }

    pub fn stopping_on_focusable(mut self) -> Self {
        self.stop_on_focusable = true;
        self
    }

    pub fn with_lane_starts(mut self, starts: Vec<f32>) -> Self {
        self.lane_starts = Some(starts);
        self
    }

    pub fn forcing_first_chunk(mut self) -> Self {
        self.force_first_chunk = true;
        self
    }

    pub(crate) fn budget_spent(&self) -> bool {
        self.item_budget
            .is_some_and(|budget| self.items_placed >= budget)
    }
}

/// Where the engine is relative to layout passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
    Idle,
    InLayout,
    /// A pass requested from inside another pass.
    InLayoutNested,
}

/// Side effects held back until the engine is idle again.
#[derive(Clone, Debug, PartialEq)]
pub enum DeferredEffect {
    Recycle(ViewHandle),
    Selected(SelectionEvent),
}

/// Tracks pass nesting and queues deferred effects.
#[derive(Debug, Default)]
pub struct PhaseTracker {
    depth: u32,
    deferred: Vec<DeferredEffect>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LayoutPhase {
        match self.depth {
            0 => LayoutPhase::Idle,
            1 => LayoutPhase::InLayout,
            _ => LayoutPhase::InLayoutNested,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.depth == 0
    }

    /// Enters a pass and returns the phase it runs in.
    pub fn enter(&mut self) -> LayoutPhase {
        self.depth += 1;
        self.phase()
    }

    /// Leaves a pass. Returns the queued effects once the outermost pass ends.
    pub fn exit(&mut self) -> Vec<DeferredEffect> {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            std::mem::take(&mut self.deferred)
        } else {
            Vec::new()
        }
    }

    pub fn defer(&mut self, effect: DeferredEffect) {
        self.deferred.push(effect);
    }

    pub fn pending(&self) -> &[DeferredEffect] {
        &self.deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_passes_flush_once() {
        let mut tracker = PhaseTracker::new();
        assert_eq!(tracker.enter(), LayoutPhase::InLayout);
        tracker.defer(DeferredEffect::Recycle(ViewHandle(1)));
        assert_eq!(tracker.enter(), LayoutPhase::InLayoutNested);
        tracker.defer(DeferredEffect::Recycle(ViewHandle(2)));

        assert!(tracker.exit().is_empty());
        assert_eq!(tracker.phase(), LayoutPhase::InLayout);
        assert_eq!(tracker.pending().len(), 2);

        let flushed = tracker.exit();
        assert_eq!(flushed.len(), 2);
        assert!(tracker.is_idle());
        assert!(tracker.pending().is_empty());
    }

    #[test]
    fn step_stops_at_bounds() {
        assert_eq!(FillDirection::Forward.step(3, 4), None);
        assert_eq!(FillDirection::Forward.step(2, 4), Some(3));
        assert_eq!(FillDirection::Backward.step(0, 4), None);
    }
}
