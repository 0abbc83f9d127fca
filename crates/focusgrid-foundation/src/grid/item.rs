//! Attached item representation.
//!
//! Contains everything the engine knows about an item while its view is
//! attached: where it sits in content space and what it is.

use focusgrid_geometry::{Axis, EdgeInsets, Rect};

use super::lane_table::LaneLocation;
use super::recycler::ViewHandle;

/// An item currently attached to the grid.
///
/// Main-axis coordinates are in content space: the viewport's main start is
/// at the grid's scroll offset.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachedItem {
    /// Index in the adapter.
    pub position: usize,
    pub stable_id: Option<u64>,
    pub view_type: u32,
    /// `None` when the recycler could not produce a view.
    pub view: Option<ViewHandle>,
    pub lane: usize,
    pub span: usize,
    pub main_start: f32,
    pub main_size: f32,
    pub cross_start: f32,
    pub cross_size: f32,
    pub insets: EdgeInsets,
    pub sub_positions: usize,
    pub focusable: bool,
}

impl AttachedItem {
    #[inline]
    pub fn main_end(&self) -> f32 {
        self.main_start + self.main_size
    }

    #[inline]
    pub fn main_center(&self) -> f32 {
        self.main_start + self.main_size / 2.0
    }

    #[inline]
    pub fn cross_end(&self) -> f32 {
        self.cross_start + self.cross_size
    }

    #[inline]
    pub fn cross_center(&self) -> f32 {
        self.cross_start + self.cross_size / 2.0
    }

    pub fn location(&self) -> LaneLocation {
        LaneLocation::new(self.lane, self.span)
    }

    pub fn is_placeholder(&self) -> bool {
        self.view.is_none()
    }

    /// True when the item overlaps `[start, end)` on the main axis.
    pub fn overlaps_main(&self, start: f32, end: f32) -> bool {
        self.main_start < end && self.main_end() > start
    }

    /// Bounds in viewport coordinates.
    pub fn bounds(&self, axis: Axis, scroll_offset: f32, cross_scroll_offset: f32) -> Rect {
        let main = self.main_start - scroll_offset;
        let cross = self.cross_start - cross_scroll_offset;
        match axis {
            Axis::Vertical => Rect::new(cross, main, self.cross_size, self.main_size),
            Axis::Horizontal => Rect::new(main, cross, self.main_size, self.cross_size),
        }
    }
}

/// Summary of the last settled layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridLayoutInfo {
    /// Lowest position intersecting the viewport.
    pub first_visible: Option<usize>,
    /// Highest position intersecting the viewport.
    pub last_visible: Option<usize>,
    pub first_attached: Option<usize>,
    pub last_attached: Option<usize>,
    pub attached_count: usize,
    pub item_count: usize,
    pub scroll_offset: f32,
    pub cross_scroll_offset: f32,
    /// Main-axis viewport extent.
    pub viewport_size: f32,
    pub can_scroll_forward: bool,
    pub can_scroll_backward: bool,
}
