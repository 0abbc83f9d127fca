//! Span size resolution and row packing.
//!
//! Span lookups are host callbacks and may be expensive, so answers are
//! cached until the next data change bumps the generation. Row-aligned grids
//! also need the lane a position lands in, which depends on every span before
//! it; rows are packed once from position 0 and only their first positions
//! are kept. Cached spans can be trimmed to a window around the attached
//! range; a trimmed span is asked for again when needed.

use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::error::{GridError, Result};

/// Number of adjacent lanes an item occupies.
pub trait SpanSizeLookup {
    fn span_size(&self, position: usize) -> usize;
}

impl<F> SpanSizeLookup for F
where
    F: Fn(usize) -> usize,
{
    fn span_size(&self, position: usize) -> usize {
        self(position)
    }
}

/// Every item occupies a single lane.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSpanSizeLookup;

impl SpanSizeLookup for DefaultSpanSizeLookup {
    fn span_size(&self, _position: usize) -> usize {
        1
    }
}

/// Row and first lane of a position in a row-aligned grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub lane: usize,
    pub span: usize,
}

/// Cached span sizes and packed rows.
#[derive(Debug, Default)]
pub struct SpanResolver {
    spans: FxHashMap<usize, usize>,
    generation: u64,
    /// Positions `0..packed` are assigned to rows.
    packed: usize,
    /// First position of every packed row.
    row_starts: Vec<usize>,
    /// Next free lane of the last packed row.
    packing_lane: usize,
}

impl SpanResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops every cached value and bumps the generation.
    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.spans.clear();
        self.packed = 0;
        self.row_starts.clear();
        self.packing_lane = 0;
    }

    /// Span of `position`, validated against `lane_count`.
    pub fn span_size(
        &mut self,
        position: usize,
        lookup: &dyn SpanSizeLookup,
        lane_count: usize,
    ) -> Result<usize> {
        if let Some(&span) = self.spans.get(&position) {
            return Ok(span);
        }
        let span = lookup.span_size(position);
        if span == 0 || span > lane_count {
            return Err(GridError::InvalidSpan {
                position,
                span,
                lane_count,
            });
        }
        self.spans.insert(position, span);
        Ok(span)
    }

    /// Row and lane of `position` when rows are packed left to right.
    pub fn cell(
        &mut self,
        position: usize,
        lookup: &dyn SpanSizeLookup,
        lane_count: usize,
    ) -> Result<GridCell> {
        while self.packed <= position {
            self.pack_next(lookup, lane_count)?;
        }
        let row = self
            .row_starts
            .partition_point(|&start| start <= position)
            .saturating_sub(1);
        let mut lane = 0;
        for earlier in self.row_starts[row]..position {
            lane += self.span_size(earlier, lookup, lane_count)?;
        }
        let span = self.span_size(position, lookup, lane_count)?;
        Ok(GridCell { row, lane, span })
    }

    /// Positions sharing the row of `position`, clipped to `item_count`.
    pub fn row_range(
        &mut self,
        position: usize,
        item_count: usize,
        lookup: &dyn SpanSizeLookup,
        lane_count: usize,
    ) -> Result<Range<usize>> {
        let row = self.cell(position, lookup, lane_count)?.row;
        while self.row_starts.len() <= row + 1 && self.packed < item_count {
            self.pack_next(lookup, lane_count)?;
        }
        let start = self.row_starts[row];
        let end = self
            .row_starts
            .get(row + 1)
            .copied()
            .unwrap_or(self.packed)
            .min(item_count);
        Ok(start..end)
    }

    fn pack_next(&mut self, lookup: &dyn SpanSizeLookup, lane_count: usize) -> Result<()> {
        let position = self.packed;
        let span = self.span_size(position, lookup, lane_count)?;
        if self.row_starts.is_empty() || self.packing_lane + span > lane_count {
            self.row_starts.push(position);
            self.packing_lane = 0;
        }
        self.packed += 1;
        self.packing_lane += span;
        Ok(())
    }

    /// Forgets cached spans outside `window`. Packed rows are kept.
    pub fn retain(&mut self, window: Range<usize>) {
        self.spans.retain(|position, _| window.contains(position));
    }

    pub fn cached_spans(&self) -> usize {
        self.spans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn default_lookup_is_one() {
        let mut resolver = SpanResolver::new();
        assert_eq!(resolver.span_size(7, &DefaultSpanSizeLookup, 3), Ok(1));
    }

    #[test]
    fn zero_and_oversized_spans_are_rejected() {
        let mut resolver = SpanResolver::new();
        let zero = |_: usize| -> usize { 0 };
        assert_eq!(
            resolver.span_size(2, &zero, 3),
            Err(GridError::InvalidSpan {
                position: 2,
                span: 0,
                lane_count: 3
            })
        );
        let wide = |_: usize| -> usize { 4 };
        assert!(resolver.span_size(2, &wide, 3).is_err());
    }

    #[test]
    fn answers_are_cached_until_invalidated() {
        let calls = Cell::new(0);
        let lookup = |_: usize| -> usize {
            calls.set(calls.get() + 1);
            2
        };
        let mut resolver = SpanResolver::new();
        resolver.span_size(5, &lookup, 4).unwrap();
        resolver.span_size(5, &lookup, 4).unwrap();
        assert_eq!(calls.get(), 1);

        let generation = resolver.generation();
        resolver.invalidate();
        assert_eq!(resolver.generation(), generation + 1);
        resolver.span_size(5, &lookup, 4).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn trimmed_spans_are_looked_up_again() {
        let spans = [1usize, 2, 2, 1, 3, 1, 1];
        let calls = Cell::new(0);
        let lookup = |p: usize| {
            calls.set(calls.get() + 1);
            spans[p]
        };
        let mut resolver = SpanResolver::new();
        let before = resolver.cell(6, &lookup, 3).unwrap();
        assert_eq!(resolver.cached_spans(), 7);

        resolver.retain(5..7);
        assert_eq!(resolver.cached_spans(), 2);
        let calls_before = calls.get();
        assert_eq!(resolver.cell(6, &lookup, 3).unwrap(), before);
        assert_eq!(
            resolver.cell(3, &lookup, 3).unwrap(),
            GridCell {
                row: 1,
                lane: 2,
                span: 1
            }
        );
        assert!(calls.get() > calls_before);
    }

    #[test]
    fn rows_break_when_span_does_not_fit() {
        // spans: 1, 2, 2, 1, 3 over three lanes
        let spans = [1usize, 2, 2, 1, 3];
        let lookup = |p: usize| spans[p];
        let mut resolver = SpanResolver::new();

        assert_eq!(resolver.row_range(0, 5, &lookup, 3).unwrap(), 0..2);
        assert_eq!(resolver.row_range(2, 5, &lookup, 3).unwrap(), 2..4);
        assert_eq!(resolver.row_range(4, 5, &lookup, 3).unwrap(), 4..5);
        assert_eq!(
            resolver.cell(3, &lookup, 3).unwrap(),
            GridCell {
                row: 1,
                lane: 2,
                span: 1
            }
        );
    }
}
