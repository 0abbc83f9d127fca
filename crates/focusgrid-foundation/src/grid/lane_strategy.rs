//! Lane placement strategies.
//!
//! The fill loop is shared; a strategy only decides which positions form the
//! next chunk, which lanes they occupy and where on the main axis the chunk
//! goes once measured.

use std::ops::Range;

use smallvec::SmallVec;

use super::lane_table::{LaneLocation, LaneTable};
use super::layout_state::FillDirection;
use super::span::{GridCell, SpanResolver, SpanSizeLookup};
use crate::error::Result;

/// Which [`LaneStrategy`] a grid uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LaneStrategyKind {
    /// Single lane list.
    #[default]
    Linear,
    /// Rows packed left to right by span; every row shares one main-axis start.
    Grid,
    /// Each item goes to the currently shortest lane.
    Staggered,
}

/// One position of a chunk and the lanes it occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkItem {
    pub position: usize,
    pub location: LaneLocation,
}

/// Inline capacity covers a row of a typical TV grid.
pub type Chunk = SmallVec<[ChunkItem; 8]>;
pub type ChunkOffsets = SmallVec<[f32; 8]>;

/// Span lookups bundled with the lane count they are validated against.
pub struct SpanSource<'a> {
    pub resolver: &'a mut SpanResolver,
    pub lookup: &'a dyn SpanSizeLookup,
    pub lane_count: usize,
}

impl SpanSource<'_> {
    pub fn span(&mut self, position: usize) -> Result<usize> {
        self.resolver
            .span_size(position, self.lookup, self.lane_count)
    }

    pub fn cell(&mut self, position: usize) -> Result<GridCell> {
        self.resolver.cell(position, self.lookup, self.lane_count)
    }

    pub fn row_range(&mut self, position: usize, item_count: usize) -> Result<Range<usize>> {
        self.resolver
            .row_range(position, item_count, self.lookup, self.lane_count)
    }
}

pub trait LaneStrategy: std::fmt::Debug {
    fn kind(&self) -> LaneStrategyKind;

    /// Positions filled together, starting at `position` when filling
    /// forward and ending at it when filling backward. Ordered by position.
    fn chunk(
        &self,
        position: usize,
        direction: FillDirection,
        item_count: usize,
        table: &LaneTable,
        spans: &mut SpanSource<'_>,
        spacing: f32,
    ) -> Result<Chunk>;

    /// Main-axis start of every measured chunk item.
    fn place(
        &self,
        table: &LaneTable,
        chunk: &[ChunkItem],
        extents: &[f32],
        direction: FillDirection,
        spacing: f32,
    ) -> ChunkOffsets;

    /// First position of the chunk holding `position`.
    fn chunk_start(
        &self,
        position: usize,
        item_count: usize,
        spans: &mut SpanSource<'_>,
    ) -> Result<usize> {
        let _ = (item_count, spans);
        Ok(position)
    }

    /// The line a fill in `direction` has reached.
    ///
    /// A forward fill continues while this is below its limit, a backward
    /// fill while it is above.
    fn fill_edge(&self, table: &LaneTable, direction: FillDirection, spacing: f32) -> f32 {
        match direction {
            FillDirection::Forward => table.next_start_bounds(spacing).1,
            FillDirection::Backward => table.next_end_bounds(spacing).0,
        }
    }
}

pub fn create_strategy(kind: LaneStrategyKind) -> Box<dyn LaneStrategy> {
    match kind {
        LaneStrategyKind::Linear => Box::new(LinearLanes),
        LaneStrategyKind::Grid => Box::new(GridLanes),
        LaneStrategyKind::Staggered => Box::new(StaggeredLanes),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LinearLanes;

impl LaneStrategy for LinearLanes {
    fn kind(&self) -> LaneStrategyKind {
        LaneStrategyKind::Linear
    }

    fn chunk(
        &self,
        position: usize,
        _direction: FillDirection,
        _item_count: usize,
        _table: &LaneTable,
        spans: &mut SpanSource<'_>,
        _spacing: f32,
    ) -> Result<Chunk> {
        let span = spans.span(position)?;
        let mut chunk = Chunk::new();
        chunk.push(ChunkItem {
            position,
            location: LaneLocation::new(0, span),
        });
        Ok(chunk)
    }

    fn place(
        &self,
        table: &LaneTable,
        _chunk: &[ChunkItem],
        extents: &[f32],
        direction: FillDirection,
        spacing: f32,
    ) -> ChunkOffsets {
        let extent = extents.first().copied().unwrap_or(0.0);
        let start = match direction {
            FillDirection::Forward => table.next_start(0, spacing),
            FillDirection::Backward => table.next_end(0, spacing) - extent,
        };
        smallvec::smallvec![start]
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GridLanes;

impl LaneStrategy for GridLanes {
    fn kind(&self) -> LaneStrategyKind {
        LaneStrategyKind::Grid
    }

    fn chunk(
        &self,
        position: usize,
        direction: FillDirection,
        item_count: usize,
        _table: &LaneTable,
        spans: &mut SpanSource<'_>,
        _spacing: f32,
    ) -> Result<Chunk> {
        let row = spans.row_range(position, item_count)?;
        let positions = match direction {
            FillDirection::Forward => position..row.end,
            FillDirection::Backward => row.start..position + 1,
        };
        let mut chunk = Chunk::new();
        for position in positions {
            let cell = spans.cell(position)?;
            chunk.push(ChunkItem {
                position,
                location: LaneLocation::new(cell.lane, cell.span),
            });
        }
        Ok(chunk)
    }

    fn place(
        &self,
        table: &LaneTable,
        chunk: &[ChunkItem],
        extents: &[f32],
        direction: FillDirection,
        spacing: f32,
    ) -> ChunkOffsets {
        let start = match direction {
            FillDirection::Forward => table.next_start_bounds(spacing).1,
            FillDirection::Backward => {
                let row_end = table.next_end_bounds(spacing).0;
                let row_size = extents.iter().copied().fold(0.0, f32::max);
                row_end - row_size
            }
        };
        chunk.iter().map(|_| start).collect()
    }

    fn chunk_start(
        &self,
        position: usize,
        item_count: usize,
        spans: &mut SpanSource<'_>,
    ) -> Result<usize> {
        Ok(spans.row_range(position, item_count)?.start)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StaggeredLanes;

impl LaneStrategy for StaggeredLanes {
    fn kind(&self) -> LaneStrategyKind {
        LaneStrategyKind::Staggered
    }

    fn chunk(
        &self,
        position: usize,
        direction: FillDirection,
        _item_count: usize,
        table: &LaneTable,
        spans: &mut SpanSource<'_>,
        spacing: f32,
    ) -> Result<Chunk> {
        let span = spans.span(position)?;
        let remembered = table
            .location(position)
            .filter(|loc| loc.span == span && loc.lane + span <= table.lane_count());
        let location = remembered.unwrap_or_else(|| {
            let lane = match direction {
                FillDirection::Forward => table.pick_shortest_lane(span, spacing),
                FillDirection::Backward => table.pick_longest_lane(span, spacing),
            };
            LaneLocation::new(lane, span)
        });
        let mut chunk = Chunk::new();
        chunk.push(ChunkItem { position, location });
        Ok(chunk)
    }

    fn place(
        &self,
        table: &LaneTable,
        chunk: &[ChunkItem],
        extents: &[f32],
        direction: FillDirection,
        spacing: f32,
    ) -> ChunkOffsets {
        chunk
            .iter()
            .zip(extents)
            .map(|(item, &extent)| match direction {
                FillDirection::Forward => item
                    .location
                    .lanes()
                    .map(|lane| table.next_start(lane, spacing))
                    .fold(f32::NEG_INFINITY, f32::max),
                FillDirection::Backward => {
                    item.location
                        .lanes()
                        .map(|lane| table.next_end(lane, spacing))
                        .fold(f32::INFINITY, f32::min)
                        - extent
                }
            })
            .collect()
    }

    fn fill_edge(&self, table: &LaneTable, direction: FillDirection, spacing: f32) -> f32 {
        // Keep filling until every lane reaches the limit.
        match direction {
            FillDirection::Forward => table.next_start_bounds(spacing).0,
            FillDirection::Backward => table.next_end_bounds(spacing).1,
        }
    }
}

#[cfg(test)]
#[path = "tests/lane_strategy_tests.rs"]
mod tests;
