//! Prefetch of positions just outside the attached window.
//!
//! A host with idle frame time can bind views for these positions ahead of
//! the scroll so the next fill finds them ready.

use std::collections::VecDeque;

/// How many positions past the window are worth preparing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefetchStrategy {
    /// Positions per direction. Counted in chunks for row-aligned grids.
    pub prefetch_count: usize,
    pub enabled: bool,
}

impl Default for PrefetchStrategy {
    fn default() -> Self {
        Self {
            prefetch_count: 2,
            enabled: true,
        }
    }
}

impl PrefetchStrategy {
    pub fn new(prefetch_count: usize) -> Self {
        Self {
            prefetch_count,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            prefetch_count: 0,
            enabled: false,
        }
    }
}

/// Queue of positions to prefetch, nearest first.
#[derive(Debug, Default)]
pub struct PrefetchScheduler {
    queue: VecDeque<usize>,
}

impl PrefetchScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the queue from the attached range and scroll direction
    /// (positive is forward). `per_chunk` widens the count for grids whose
    /// chunks hold several positions.
    pub fn update(
        &mut self,
        first_attached: usize,
        last_attached: usize,
        item_count: usize,
        scroll_direction: f32,
        per_chunk: usize,
        strategy: &PrefetchStrategy,
    ) {
        self.queue.clear();
        if !strategy.enabled {
            return;
        }
        let count = strategy.prefetch_count.saturating_mul(per_chunk.max(1));
        if scroll_direction >= 0.0 {
            self.queue.extend(
                (1..=count)
                    .map(|i| last_attached.saturating_add(i))
                    .take_while(|&position| position < item_count),
            );
        } else {
            self.queue.extend(
                (1..=count).map_while(|i| first_attached.checked_sub(i)),
            );
        }
    }

    pub fn next_prefetch(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    pub fn pending_prefetches(&self) -> &VecDeque<usize> {
        &self.queue
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
