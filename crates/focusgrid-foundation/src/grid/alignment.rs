//! Keyline alignment and scroll limits.
//!
//! A keyline is a fixed line in the viewport the selected item's alignment
//! point is scrolled to. Near the ends of the content the low and high edge
//! preferences pin the first or last item against the padded viewport edge
//! instead, so the grid never scrolls into empty space.
//!
//! All scroll values are content-space offsets of the viewport start.

use focusgrid_geometry::{Axis, EdgeInsets};

use super::item::AttachedItem;
use crate::config::{check_percent, GridConfig};
use crate::error::Result;

/// Where the keyline sits in the viewport, and how the ends behave.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowAlignment {
    /// Pixel offset added to the keyline.
    pub offset: f32,
    /// Keyline position in percent of the viewport, `0..=100`.
    pub offset_percent: Option<f32>,
    /// Measure the percentage inside the padding rather than the full extent.
    pub percent_relative_to_padding: bool,
    /// Pin the first item to the low padded edge rather than the keyline.
    pub prefer_low_edge: bool,
    /// Pin the last item to the high padded edge rather than the keyline.
    pub prefer_high_edge: bool,
    pub prefer_keyline_over_low_edge: bool,
    pub prefer_keyline_over_high_edge: bool,
}

impl Default for WindowAlignment {
    fn default() -> Self {
        Self {
            offset: 0.0,
            offset_percent: Some(50.0),
            percent_relative_to_padding: true,
            prefer_low_edge: true,
            prefer_high_edge: true,
            prefer_keyline_over_low_edge: false,
            prefer_keyline_over_high_edge: true,
        }
    }
}

impl WindowAlignment {
    /// Keyline at `percent` with no edge pinning.
    pub fn keyline_only(percent: f32) -> Self {
        Self {
            offset_percent: Some(percent),
            prefer_low_edge: false,
            prefer_high_edge: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_percent(self.offset_percent)
    }

    /// Keyline distance from the viewport start.
    pub fn keyline(&self, extent: f32, padding_before: f32, padding_after: f32) -> f32 {
        match (self.offset_percent, self.percent_relative_to_padding) {
            (Some(percent), true) => {
                let client = extent - padding_before - padding_after;
                padding_before + (percent / 100.0 * client).round() + self.offset
            }
            (Some(percent), false) => (percent / 100.0 * extent).round() + self.offset,
            (None, true) => padding_before + self.offset,
            (None, false) => self.offset,
        }
    }
}

/// The alignment point inside an item.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemAlignment {
    pub offset: f32,
    pub offset_percent: Option<f32>,
    /// Resolve the point inside the item's decoration insets.
    pub include_insets: bool,
}

impl Default for ItemAlignment {
    fn default() -> Self {
        Self {
            offset: 0.0,
            offset_percent: Some(50.0),
            include_insets: false,
        }
    }
}

impl ItemAlignment {
    pub fn validate(&self) -> Result<()> {
        check_percent(self.offset_percent)
    }

    /// Distance of the alignment point from the item start.
    ///
    /// Sub-positions split the item into equal regions; the point is resolved
    /// inside region `sub_position`.
    pub fn resolve(
        &self,
        size: f32,
        inset_before: f32,
        inset_after: f32,
        sub_positions: usize,
        sub_position: usize,
    ) -> f32 {
        let (mut start, mut size) = (0.0, size);
        if self.include_insets {
            start += inset_before;
            size = (size - inset_before - inset_after).max(0.0);
        }
        let regions = sub_positions.max(1);
        let region = size / regions as f32;
        start += region * sub_position.min(regions - 1) as f32;
        let within = match self.offset_percent {
            Some(percent) => percent / 100.0 * region,
            None => 0.0,
        };
        start + within + self.offset
    }
}

/// How far the grid scrolls when the selection changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollStrategy {
    /// Always bring the selection to the keyline.
    #[default]
    Aligned,
    /// Scroll only as far as needed to show the whole selection.
    ItemVisible,
}

/// Scroll bounds. A side is unknown until the item at that end is attached.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollLimits {
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl ScrollLimits {
    pub fn clamp(&self, scroll: f32) -> f32 {
        let mut scroll = scroll;
        if let Some(max) = self.max {
            scroll = scroll.min(max);
        }
        if let Some(min) = self.min {
            scroll = scroll.max(min);
        }
        scroll
    }
}

/// Keyline state of one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisAlignment {
    pub window: WindowAlignment,
    extent: f32,
    padding_before: f32,
    padding_after: f32,
    min_edge: Option<f32>,
    max_edge: Option<f32>,
    min_align: Option<f32>,
    max_align: Option<f32>,
    limits: ScrollLimits,
}

impl AxisAlignment {
    pub fn new(window: WindowAlignment) -> Self {
        Self {
            window,
            extent: 0.0,
            padding_before: 0.0,
            padding_after: 0.0,
            min_edge: None,
            max_edge: None,
            min_align: None,
            max_align: None,
            limits: ScrollLimits::default(),
        }
    }

    pub fn set_size(&mut self, extent: f32, padding_before: f32, padding_after: f32) {
        self.extent = extent;
        self.padding_before = padding_before;
        self.padding_after = padding_after;
        self.recompute();
    }

    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn keyline(&self) -> f32 {
        self.window
            .keyline(self.extent, self.padding_before, self.padding_after)
    }

    pub fn limits(&self) -> ScrollLimits {
        self.limits
    }

    /// Updates the content ends. `min_*` is known only while the first item
    /// is attached and `max_*` only while the last one is.
    pub fn update_edges(
        &mut self,
        min_edge: Option<f32>,
        min_align: Option<f32>,
        max_edge: Option<f32>,
        max_align: Option<f32>,
    ) {
        self.min_edge = min_edge;
        self.min_align = min_align;
        self.max_edge = max_edge;
        self.max_align = max_align;
        self.recompute();
    }

    /// Forgets both ends.
    pub fn invalidate_edges(&mut self) {
        self.update_edges(None, None, None, None);
    }

    fn recompute(&mut self) {
        let keyline = self.keyline();
        let window = self.window;
        let mut min = match (self.min_edge, self.min_align) {
            (Some(edge), Some(align)) => Some(if window.prefer_low_edge {
                edge - self.padding_before
            } else {
                align - keyline
            }),
            _ => None,
        };
        let mut max = match (self.max_edge, self.max_align) {
            (Some(edge), Some(align)) => Some(if window.prefer_high_edge {
                edge + self.padding_after - self.extent
            } else {
                align - keyline
            }),
            _ => None,
        };
        if let (Some(lo), Some(hi), Some(min_align), Some(max_align)) =
            (min, max, self.min_align, self.max_align)
        {
            if window.prefer_low_edge {
                let lo = if window.prefer_keyline_over_low_edge {
                    lo.min(max_align - keyline)
                } else {
                    lo
                };
                min = Some(lo);
                max = Some(hi.max(lo));
            } else if window.prefer_high_edge {
                let hi = if window.prefer_keyline_over_high_edge {
                    hi.max(min_align - keyline)
                } else {
                    hi
                };
                max = Some(hi);
                min = Some(lo.min(hi));
            }
        }
        self.limits = ScrollLimits { min, max };
    }

    /// Scroll that puts an alignment point at `align` on the keyline, or pins
    /// the nearer end when the point is closer to it than the keyline.
    pub fn scroll_for(&self, align: f32) -> f32 {
        let keyline = self.keyline();
        if self.window.prefer_low_edge {
            if let Some(edge) = self.min_edge {
                if align - edge <= keyline - self.padding_before {
                    let scroll = edge - self.padding_before;
                    return self.limits.max.map_or(scroll, |max| scroll.min(max));
                }
            }
        }
        if self.window.prefer_high_edge {
            if let Some(edge) = self.max_edge {
                if edge - align <= self.extent - keyline - self.padding_after {
                    let scroll = edge + self.padding_after - self.extent;
                    return self.limits.min.map_or(scroll, |min| scroll.max(min));
                }
            }
        }
        self.limits.clamp(align - keyline)
    }

    /// Smallest scroll change from `current` that shows `[start, end)` inside
    /// the padded viewport. Oversized items are shown from their start.
    pub fn scroll_to_reveal(&self, start: f32, end: f32, current: f32) -> f32 {
        let low = current + self.padding_before;
        let high = current + self.extent - self.padding_after;
        let target = if start < low || end - start > high - low {
            start - self.padding_before
        } else if end > high {
            end + self.padding_after - self.extent
        } else {
            current
        };
        self.limits.clamp(target)
    }
}

/// Alignment of both axes of a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentEngine {
    axis: Axis,
    pub main: AxisAlignment,
    pub cross: AxisAlignment,
    pub item: ItemAlignment,
    pub strategy: ScrollStrategy,
}

impl AlignmentEngine {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            axis: config.orientation,
            main: AxisAlignment::new(config.window_alignment),
            cross: AxisAlignment::new(config.cross_window_alignment),
            item: config.item_alignment,
            strategy: config.scroll_strategy,
        }
    }

    /// Sizes both axes from the viewport and padding.
    pub fn set_viewport(&mut self, main_extent: f32, cross_extent: f32, padding: EdgeInsets) {
        let cross_axis = self.axis.cross_axis();
        self.main.set_size(
            main_extent,
            self.axis.inset_before(padding),
            self.axis.inset_after(padding),
        );
        self.cross.set_size(
            cross_extent,
            cross_axis.inset_before(padding),
            cross_axis.inset_after(padding),
        );
    }

    /// Keyline distance from the viewport start along `axis`.
    pub fn keyline_offset(&self, axis: Axis) -> f32 {
        if axis == self.axis {
            self.main.keyline()
        } else {
            self.cross.keyline()
        }
    }

    /// Distance of the item's alignment point from its start along `axis`.
    pub fn item_alignment_offset(
        &self,
        item: &AttachedItem,
        axis: Axis,
        sub_position: usize,
    ) -> f32 {
        if axis == self.axis {
            self.item.resolve(
                item.main_size,
                axis.inset_before(item.insets),
                axis.inset_after(item.insets),
                item.sub_positions,
                sub_position,
            )
        } else {
            self.item.resolve(
                item.cross_size,
                axis.inset_before(item.insets),
                axis.inset_after(item.insets),
                1,
                0,
            )
        }
    }

    /// Content-space alignment point of `item` on the main axis.
    pub fn alignment_point(&self, item: &AttachedItem, sub_position: usize) -> f32 {
        item.main_start + self.item_alignment_offset(item, self.axis, sub_position)
    }

    /// Main-axis scroll offset that aligns `item`.
    pub fn scroll_for(&self, item: &AttachedItem, sub_position: usize, current: f32) -> f32 {
        match self.strategy {
            ScrollStrategy::Aligned => self.main.scroll_for(self.alignment_point(item, sub_position)),
            ScrollStrategy::ItemVisible => {
                self.main
                    .scroll_to_reveal(item.main_start, item.main_end(), current)
            }
        }
    }

    /// Cross-axis scroll offset that aligns `item`'s lanes.
    pub fn cross_scroll_for(&self, item: &AttachedItem) -> f32 {
        let cross_axis = self.axis.cross_axis();
        self.cross
            .scroll_for(item.cross_start + self.item_alignment_offset(item, cross_axis, 0))
    }
}

#[cfg(test)]
#[path = "tests/alignment_tests.rs"]
mod tests;
