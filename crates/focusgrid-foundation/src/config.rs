//! Grid configuration.
//!
//! A plain struct with public fields and a [`Default`] so hosts can use
//! struct update syntax, plus a few chaining setters for the common knobs.
//! Every value is checked by [`GridConfig::validate`] before the engine
//! accepts it.

use crate::error::{GridError, Result};
use crate::grid::{
    ChildStatePolicy, ItemAlignment, LaneStrategyKind, PrefetchStrategy, ScrollStrategy,
    WindowAlignment,
};
use focusgrid_geometry::{Axis, EdgeInsets};

/// Default scroll speed of the pivot scroller, in pixels per second.
pub const DEFAULT_SCROLL_SPEED: f32 = 3000.0;

/// Default bound of the pending-move accumulator.
pub const DEFAULT_MAX_PENDING_MOVES: u32 = 10;

/// Default number of items a focus search may lay out past the window.
pub const DEFAULT_MAX_ITEMS_PER_FOCUS_REQUEST: usize = 10;

/// Configuration for a [`FocusGrid`](crate::grid::FocusGrid).
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Scroll (main) axis.
    pub orientation: Axis,
    /// Number of lanes laid side by side on the cross axis.
    pub lane_count: usize,
    /// How chunks of items are placed into lanes.
    pub strategy: LaneStrategyKind,
    /// Gap between consecutive items of one lane, along the main axis.
    pub item_spacing: f32,
    /// Gap between adjacent lanes, along the cross axis.
    pub lane_spacing: f32,
    /// Fixed cross size of one lane. Derived from the viewport when unset.
    pub lane_size: Option<f32>,
    /// Viewport padding.
    pub padding: EdgeInsets,
    /// Extra layout space kept attached before the viewport.
    pub extra_layout_space_before: f32,
    /// Extra layout space kept attached after the viewport.
    pub extra_layout_space_after: f32,
    /// Keyline on the main axis.
    pub window_alignment: WindowAlignment,
    /// Keyline on the cross axis, used when lanes overflow the viewport.
    pub cross_window_alignment: WindowAlignment,
    /// Alignment point inside the selected item.
    pub item_alignment: ItemAlignment,
    pub scroll_strategy: ScrollStrategy,
    /// Main-axis key presses are queued and animated instead of jumping.
    pub smooth_scrolling: bool,
    /// Pivot scroller speed in pixels per second.
    pub scroll_speed: f32,
    /// Bound of the pending-move accumulator.
    pub max_pending_moves: u32,
    /// Bound on items laid out past the window while searching for focus.
    pub max_items_per_focus_request: usize,
    /// Moving past the last item wraps to the first and back.
    pub focus_wrap: bool,
    /// Moving backward past the first item escapes the grid.
    pub focus_out_front: bool,
    /// Moving forward past the last item escapes the grid.
    pub focus_out_end: bool,
    /// Moving sideways past the outermost lane escapes the grid.
    pub focus_out_side: bool,
    pub child_state_policy: ChildStatePolicy,
    pub prefetch: PrefetchStrategy,
    /// Recycle items that leave the extended viewport.
    pub prune_children: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            orientation: Axis::Vertical,
            lane_count: 1,
            strategy: LaneStrategyKind::Linear,
            item_spacing: 0.0,
            lane_spacing: 0.0,
            lane_size: None,
            padding: EdgeInsets::default(),
            extra_layout_space_before: 0.0,
            extra_layout_space_after: 0.0,
            window_alignment: WindowAlignment::default(),
            cross_window_alignment: WindowAlignment::default(),
            item_alignment: ItemAlignment::default(),
            scroll_strategy: ScrollStrategy::Aligned,
            smooth_scrolling: true,
            scroll_speed: DEFAULT_SCROLL_SPEED,
            max_pending_moves: DEFAULT_MAX_PENDING_MOVES,
            max_items_per_focus_request: DEFAULT_MAX_ITEMS_PER_FOCUS_REQUEST,
            focus_wrap: false,
            focus_out_front: false,
            focus_out_end: false,
            focus_out_side: false,
            child_state_policy: ChildStatePolicy::OnScreen,
            prefetch: PrefetchStrategy::default(),
            prune_children: true,
        }
    }
}

impl GridConfig {
    /// Single-lane vertical list.
    pub fn linear() -> Self {
        Self::default()
    }

    /// Row-aligned vertical grid with `lanes` columns.
    pub fn grid(lanes: usize) -> Self {
        Self {
            lane_count: lanes,
            strategy: LaneStrategyKind::Grid,
            ..Self::default()
        }
    }

    /// Staggered vertical grid with `lanes` columns.
    pub fn staggered(lanes: usize) -> Self {
        Self {
            lane_count: lanes,
            strategy: LaneStrategyKind::Staggered,
            ..Self::default()
        }
    }

    pub fn with_orientation(mut self, orientation: Axis) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_spacing(mut self, item_spacing: f32, lane_spacing: f32) -> Self {
        self.item_spacing = item_spacing;
        self.lane_spacing = lane_spacing;
        self
    }

    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_extra_layout_space(mut self, before: f32, after: f32) -> Self {
        self.extra_layout_space_before = before;
        self.extra_layout_space_after = after;
        self
    }

    pub fn with_window_alignment(mut self, alignment: WindowAlignment) -> Self {
        self.window_alignment = alignment;
        self
    }

    pub fn with_item_alignment(mut self, alignment: ItemAlignment) -> Self {
        self.item_alignment = alignment;
        self
    }

    pub fn with_smooth_scrolling(mut self, enabled: bool) -> Self {
        self.smooth_scrolling = enabled;
        self
    }

    pub fn with_focus_wrap(mut self, wrap: bool) -> Self {
        self.focus_wrap = wrap;
        self
    }

    pub fn with_child_state_policy(mut self, policy: ChildStatePolicy) -> Self {
        self.child_state_policy = policy;
        self
    }

    /// Checks every value the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.lane_count == 0 {
            return Err(GridError::InvalidLaneCount(self.lane_count));
        }
        if self.strategy == LaneStrategyKind::Linear && self.lane_count != 1 {
            return Err(GridError::LinearRequiresSingleLane(self.lane_count));
        }
        check_non_negative("item_spacing", self.item_spacing)?;
        check_non_negative("lane_spacing", self.lane_spacing)?;
        check_non_negative("extra_layout_space_before", self.extra_layout_space_before)?;
        check_non_negative("extra_layout_space_after", self.extra_layout_space_after)?;
        check_non_negative("scroll_speed", self.scroll_speed)?;
        if let Some(lane_size) = self.lane_size {
            check_non_negative("lane_size", lane_size)?;
        }
        for (name, value) in [
            ("padding.left", self.padding.left),
            ("padding.top", self.padding.top),
            ("padding.right", self.padding.right),
            ("padding.bottom", self.padding.bottom),
        ] {
            check_non_negative(name, value)?;
        }
        self.window_alignment.validate()?;
        self.cross_window_alignment.validate()?;
        self.item_alignment.validate()?;
        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidSpacing { name, value })
    }
}

/// Validates an optional alignment percentage.
pub(crate) fn check_percent(percent: Option<f32>) -> Result<()> {
    match percent {
        Some(p) if !(0.0..=100.0).contains(&p) => {
            Err(GridError::InvalidAlignmentPercent(p))
        }
        _ => Ok(()),
    }
}
