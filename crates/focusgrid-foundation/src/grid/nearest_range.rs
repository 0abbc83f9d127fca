//! Sliding window for stable-id lookups.
//!
//! Re-finding the selection after a data-set change means asking the adapter
//! which position holds an id. Searching near the last known window first
//! keeps that cheap for long adapters; the window only moves when the first
//! attached position crosses a slot boundary.

use std::ops::Range;

/// Slot size of the sliding window.
pub const NEAREST_ITEMS_SLIDING_WINDOW_SIZE: usize = 30;

/// Extra positions searched on each side of the slot.
pub const NEAREST_ITEMS_EXTRA_COUNT: usize = 100;

#[derive(Clone, Debug)]
pub struct NearestRangeState {
    value: Range<usize>,
    last_first_attached: usize,
    window_size: usize,
    extra_count: usize,
}

impl Default for NearestRangeState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NearestRangeState {
    pub fn new(first_attached: usize) -> Self {
        Self::with_sizes(
            first_attached,
            NEAREST_ITEMS_SLIDING_WINDOW_SIZE,
            NEAREST_ITEMS_EXTRA_COUNT,
        )
    }

    pub fn with_sizes(first_attached: usize, window_size: usize, extra_count: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            value: Self::calculate_range(first_attached, window_size, extra_count),
            last_first_attached: first_attached,
            window_size,
            extra_count,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.value.clone()
    }

    pub fn update(&mut self, first_attached: usize) {
        if first_attached != self.last_first_attached {
            self.last_first_attached = first_attached;
            self.value =
                Self::calculate_range(first_attached, self.window_size, self.extra_count);
        }
    }

    fn calculate_range(first_attached: usize, window_size: usize, extra_count: usize) -> Range<usize> {
        let slot_start = window_size.saturating_mul(first_attached / window_size);
        let start = slot_start.saturating_sub(extra_count);
        let end = slot_start
            .saturating_add(window_size)
            .saturating_add(extra_count);
        start..end
    }
}
