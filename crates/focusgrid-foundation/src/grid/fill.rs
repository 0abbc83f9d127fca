//! The shared fill loop.
//!
//! [`FillEngine`] owns the attached items and everything a pass needs to
//! place more of them: the lane strategy, span cache, lane table and the
//! child states waiting to be replayed. Fills walk the adapter one chunk at a
//! time from the current edge; pruning removes whole chunks that left the
//! extended viewport.

use std::collections::VecDeque;
use std::ops::Range;

use focusgrid_geometry::{Axis, EdgeInsets, Size};
use smallvec::SmallVec;
use web_time::{Duration, Instant};

use super::adapter::GridAdapter;
use super::item::AttachedItem;
use super::lane_strategy::{create_strategy, ChunkItem, LaneStrategy, LaneStrategyKind, SpanSource};
use super::lane_table::{LaneLocation, LaneTable};
use super::layout_state::{DeferredEffect, FillDirection, LayoutState, PhaseTracker};
use super::persistence::ChildStateStore;
use super::recycler::{ItemConstraints, Recycler, ViewHandle};
use super::span::{DefaultSpanSizeLookup, SpanResolver, SpanSizeLookup};
use super::viewport::ViewportHandler;
use crate::config::GridConfig;
use crate::error::{GridError, Result};

/// Time budget for a single fill.
///
/// Stops runaway fills (zero-size items, huge extra layout space) while
/// adapting to device speed better than an item count alone.
const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(50);

/// Hard cap on items placed by one fill.
const MAX_ITEMS_PER_FILL_SAFETY: usize = 10_000;

/// Number of samples the running item size average saturates at.
const AVERAGE_WINDOW: usize = 100;

/// Where a full relayout starts.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOrigin {
    pub anchor: usize,
    /// Main-axis start of `anchor`.
    pub anchor_start: f32,
    /// Start line of every lane. `None` puts all lanes on `anchor_start`.
    pub lane_starts: Option<Vec<f32>>,
}

impl LayoutOrigin {
    /// Every lane starts on the line `anchor` starts on.
    pub fn line(anchor: usize, anchor_start: f32) -> Self {
        Self {
            anchor,
            anchor_start,
            lane_starts: None,
        }
    }
}

/// Measurement of one chunk item before placement.
struct MeasuredSlot {
    view: Option<ViewHandle>,
    stable_id: Option<u64>,
    view_type: u32,
    main_size: f32,
    insets: EdgeInsets,
    sub_positions: usize,
    focusable: bool,
}

pub struct FillEngine {
    config: GridConfig,
    strategy: Box<dyn LaneStrategy>,
    spans: SpanResolver,
    span_lookup: Box<dyn SpanSizeLookup>,
    table: LaneTable,
    items: VecDeque<AttachedItem>,
    viewport: Size,
    main_extent: f32,
    scroll_offset: f32,
    average_item_size: f32,
    measured_samples: usize,
    pub(crate) phase: PhaseTracker,
    pub(crate) child_states: ChildStateStore,
}

impl std::fmt::Debug for FillEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillEngine")
            .field("strategy", &self.strategy)
            .field("attached", &self.items.len())
            .field("scroll_offset", &self.scroll_offset)
            .field("viewport", &self.viewport)
            .finish()
    }
}

impl FillEngine {
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            strategy: create_strategy(config.strategy),
            spans: SpanResolver::new(),
            span_lookup: Box::new(DefaultSpanSizeLookup),
            table: LaneTable::new(config.lane_count),
            items: VecDeque::new(),
            viewport: Size::ZERO,
            main_extent: 0.0,
            scroll_offset: 0.0,
            average_item_size: 0.0,
            measured_samples: 0,
            phase: PhaseTracker::new(),
            child_states: ChildStateStore::new(config.child_state_policy),
            config,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn strategy_kind(&self) -> LaneStrategyKind {
        self.strategy.kind()
    }

    pub fn axis(&self) -> Axis {
        self.config.orientation
    }

    pub fn items(&self) -> &VecDeque<AttachedItem> {
        &self.items
    }

    pub fn lane_table(&self) -> &LaneTable {
        &self.table
    }

    pub fn span_generation(&self) -> u64 {
        self.spans.generation()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub(crate) fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Main-axis viewport extent, with unbounded viewports replaced by an
    /// estimate.
    pub fn main_extent(&self) -> f32 {
        self.main_extent
    }

    pub fn average_item_size(&self) -> f32 {
        self.average_item_size
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let raw = self.axis().extent(viewport);
        self.main_extent = ViewportHandler::new(
            raw,
            self.average_item_size,
            self.config.item_spacing,
        )
        .effective_size();
    }

    pub fn set_span_lookup(&mut self, lookup: Box<dyn SpanSizeLookup>) {
        self.span_lookup = lookup;
        self.invalidate_caches();
    }

    /// Drops cached spans and remembered lane locations.
    pub fn invalidate_caches(&mut self) {
        self.spans.invalidate();
        self.table.clear_locations();
    }

    /// Forgets cached spans and lane locations outside `window`. The
    /// attached range is always kept.
    pub fn trim_caches(&mut self, window: Range<usize>) {
        let (Some(first), Some(last)) = (self.first_attached(), self.last_attached()) else {
            return;
        };
        let window = window.start.min(first)..window.end.max(last + 1);
        self.spans.retain(window.clone());
        self.table.retain_locations(window);
    }

    /// Origin that lays the attached items out again where they are now.
    ///
    /// Staggered lanes each restart from their own line as long as the lanes
    /// of the attached items are still remembered; every other strategy
    /// shares one line per chunk.
    pub fn current_origin(&self) -> Option<LayoutOrigin> {
        let front = self.items.front()?;
        let lane_starts = (self.strategy.kind() == LaneStrategyKind::Staggered
            && self.table.location(front.position).is_some())
        .then(|| self.table.lane_starts());
        Some(LayoutOrigin {
            anchor: front.position,
            anchor_start: front.main_start,
            lane_starts,
        })
    }

    /// Remembers `lanes` for the positions from `first` on, so the next fill
    /// places them there. Only staggered lanes are chosen freely.
    pub fn remember_lanes(&mut self, first: usize, lanes: &[usize], item_count: usize) -> Result<()> {
        for (offset, &lane) in lanes.iter().enumerate() {
            self.hint_lane(first + offset, lane, item_count)?;
        }
        Ok(())
    }

    pub fn padding_before(&self) -> f32 {
        self.axis().inset_before(self.config.padding)
    }

    pub fn padding_after(&self) -> f32 {
        self.axis().inset_after(self.config.padding)
    }

    /// Cross size of a single lane.
    pub fn lane_size(&self) -> f32 {
        if let Some(size) = self.config.lane_size {
            return size;
        }
        let cross_axis = self.axis().cross_axis();
        let lanes = self.config.lane_count as f32;
        let available = cross_axis.extent(self.viewport)
            - cross_axis.inset_sum(self.config.padding)
            - self.config.lane_spacing * (lanes - 1.0);
        (available / lanes).max(0.0)
    }

    pub fn cross_start(&self, lane: usize) -> f32 {
        let cross_axis = self.axis().cross_axis();
        cross_axis.inset_before(self.config.padding)
            + lane as f32 * (self.lane_size() + self.config.lane_spacing)
    }

    pub fn cross_size(&self, span: usize) -> f32 {
        let span = span.max(1) as f32;
        span * self.lane_size() + (span - 1.0) * self.config.lane_spacing
    }

    /// Cross extent of all lanes including padding.
    pub fn content_cross_extent(&self) -> f32 {
        let cross_axis = self.axis().cross_axis();
        cross_axis.inset_sum(self.config.padding) + self.cross_size(self.config.lane_count)
    }

    /// Content-space range items are kept attached in.
    pub fn window(&self) -> (f32, f32) {
        (
            self.scroll_offset - self.config.extra_layout_space_before,
            self.scroll_offset + self.main_extent + self.config.extra_layout_space_after,
        )
    }

    pub fn first_attached(&self) -> Option<usize> {
        self.items.front().map(|item| item.position)
    }

    pub fn last_attached(&self) -> Option<usize> {
        self.items.back().map(|item| item.position)
    }

    /// Index into [`FillEngine::items`] of `position`.
    pub fn index_of(&self, position: usize) -> Option<usize> {
        self.items
            .binary_search_by_key(&position, |item| item.position)
            .ok()
    }

    pub fn find(&self, position: usize) -> Option<&AttachedItem> {
        self.index_of(position).map(|index| &self.items[index])
    }

    pub fn fill_edge(&self, direction: FillDirection) -> f32 {
        self.strategy
            .fill_edge(&self.table, direction, self.config.item_spacing)
    }

    /// First position of the chunk holding `position`.
    pub fn chunk_start(&mut self, position: usize, item_count: usize) -> Result<usize> {
        let mut spans = SpanSource {
            resolver: &mut self.spans,
            lookup: self.span_lookup.as_ref(),
            lane_count: self.config.lane_count,
        };
        self.strategy.chunk_start(position, item_count, &mut spans)
    }

    /// Pins `position` to `lane` for strategies that choose lanes freely.
    /// Row-aligned grids derive lanes from spans and ignore the hint.
    pub fn hint_lane(&mut self, position: usize, lane: usize, item_count: usize) -> Result<()> {
        if self.strategy.kind() != LaneStrategyKind::Staggered || position >= item_count {
            return Ok(());
        }
        let lane_count = self.config.lane_count;
        let span = self
            .spans
            .span_size(position, self.span_lookup.as_ref(), lane_count)?;
        let lane = lane.min(lane_count - span);
        self.table.remember(position, LaneLocation::new(lane, span));
        Ok(())
    }

    /// Places chunks from `state.anchor_position` in `state.direction`.
    ///
    /// Returns the pixels the fill edge advanced by.
    pub fn fill(
        &mut self,
        state: &mut LayoutState,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<f32> {
        let item_count = adapter.item_count();
        if self.items.is_empty() {
            self.seed_lanes(state);
        }
        let spacing = self.config.item_spacing;
        let direction = state.direction;
        let start_time = Instant::now();
        let placed_at_start = state.items_placed;
        let mut filled = 0.0;
        let mut position = Some(state.anchor_position).filter(|&p| p < item_count);

        while let Some(current) = position {
            let placed = state.items_placed - placed_at_start;
            let first_chunk = placed == 0 && state.force_first_chunk;
            if state.budget_spent() || (state.available <= 0.0 && !first_chunk) {
                break;
            }
            if placed >= MAX_ITEMS_PER_FILL_SAFETY {
                log::warn!(
                    "fill placed {} items without reaching its target; stopping at {}",
                    placed,
                    current
                );
                break;
            }
            if start_time.elapsed() > DEFAULT_TIME_BUDGET {
                log::warn!(
                    "fill exceeded time budget ({:?}) at position {}. stopping early.",
                    DEFAULT_TIME_BUDGET,
                    current
                );
                break;
            }

            let edge_before = self.fill_edge(direction);
            let chunk = {
                let mut spans = SpanSource {
                    resolver: &mut self.spans,
                    lookup: self.span_lookup.as_ref(),
                    lane_count: self.config.lane_count,
                };
                self.strategy.chunk(
                    current,
                    direction,
                    item_count,
                    &self.table,
                    &mut spans,
                    spacing,
                )?
            };

            let mut slots: SmallVec<[MeasuredSlot; 8]> = SmallVec::with_capacity(chunk.len());
            for item in &chunk {
                slots.push(self.obtain_and_measure(item, adapter, recycler, state)?);
            }
            let extents: SmallVec<[f32; 8]> = slots.iter().map(|slot| slot.main_size).collect();
            let starts = self
                .strategy
                .place(&self.table, &chunk, &extents, direction, spacing);

            let mut chunk_has_focusable = false;
            let mut attached: SmallVec<[AttachedItem; 8]> = SmallVec::with_capacity(chunk.len());
            for ((item, slot), main_start) in chunk.iter().zip(slots).zip(starts) {
                self.table
                    .assign(item.position, item.location, main_start, slot.main_size);
                if slot.focusable && state.focusable_found.is_none() {
                    state.focusable_found = Some(item.position);
                }
                chunk_has_focusable |= slot.focusable;
                log::trace!(
                    "placed {} in lane {}+{} at {:.1} ({:.1})",
                    item.position,
                    item.location.lane,
                    item.location.span,
                    main_start,
                    slot.main_size
                );
                attached.push(AttachedItem {
                    position: item.position,
                    stable_id: slot.stable_id,
                    view_type: slot.view_type,
                    view: slot.view,
                    lane: item.location.lane,
                    span: item.location.span,
                    main_start,
                    main_size: slot.main_size,
                    cross_start: self.cross_start(item.location.lane),
                    cross_size: self.cross_size(item.location.span),
                    insets: slot.insets,
                    sub_positions: slot.sub_positions,
                    focusable: slot.focusable,
                });
            }
            state.items_placed += attached.len();
            match direction {
                FillDirection::Forward => self.items.extend(attached),
                FillDirection::Backward => {
                    for item in attached.into_iter().rev() {
                        self.items.push_front(item);
                    }
                }
            }

            let edge_after = self.fill_edge(direction);
            let consumed = match direction {
                FillDirection::Forward => edge_after - edge_before,
                FillDirection::Backward => edge_before - edge_after,
            };
            state.available -= consumed;
            filled += consumed;

            let edge_item = match direction {
                FillDirection::Forward => chunk.last(),
                FillDirection::Backward => chunk.first(),
            };
            position = edge_item.and_then(|item| direction.step(item.position, item_count));
            if let Some(next) = position {
                state.anchor_position = next;
            }
            if state.stop_on_focusable && chunk_has_focusable {
                break;
            }
        }
        Ok(filled)
    }

    /// Empties the lanes at the lines `state` starts from.
    fn seed_lanes(&mut self, state: &LayoutState) {
        match &state.lane_starts {
            Some(starts) => self.table.reset_lanes(starts),
            None => self.table.reset(state.anchor_offset),
        }
    }

    fn obtain_and_measure(
        &mut self,
        item: &ChunkItem,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
        state: &mut LayoutState,
    ) -> Result<MeasuredSlot> {
        let position = item.position;
        let stable_id = adapter.stable_id(position);
        let view_type = adapter.view_type(position);
        let Some(view) = recycler.obtain_view(position) else {
            log::warn!(
                "recycler produced no view for position {}; attaching a placeholder",
                position
            );
            state.needs_corrective_pass = true;
            return Ok(MeasuredSlot {
                view: None,
                stable_id,
                view_type,
                main_size: 0.0,
                insets: EdgeInsets::default(),
                sub_positions: 1,
                focusable: false,
            });
        };

        if let Some(id) = stable_id {
            if let Some(saved) = self.child_states.take_for_attach(id) {
                recycler.restore_view_state(view, &saved);
            }
        }
        let constraints = ItemConstraints {
            axis: self.axis(),
            position,
            lane: item.location.lane,
            span: item.location.span,
            cross_size: self.cross_size(item.location.span),
        };
        let measured = recycler.measure(view, constraints);
        let main_size = self.axis().extent(measured.size);
        if !main_size.is_finite() || main_size < 0.0 {
            recycler.scrap(view);
            return Err(GridError::UnsupportedLayoutParams {
                position,
                size: main_size,
            });
        }
        self.record_item_size(main_size);
        Ok(MeasuredSlot {
            view: Some(view),
            stable_id,
            view_type,
            main_size,
            insets: measured.insets,
            sub_positions: recycler.sub_position_count(view).max(1),
            focusable: recycler.is_focusable(view),
        })
    }

    fn record_item_size(&mut self, size: f32) {
        self.measured_samples = (self.measured_samples + 1).min(AVERAGE_WINDOW);
        self.average_item_size += (size - self.average_item_size) / self.measured_samples as f32;
    }

    /// Fills toward both window limits from the attached edges.
    ///
    /// Returns true when a corrective pass is due.
    pub fn fill_window(
        &mut self,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<bool> {
        let item_count = adapter.item_count();
        let (low, high) = self.window();
        let mut corrective = false;

        let next = self
            .last_attached()
            .and_then(|last| FillDirection::Forward.step(last, item_count));
        if let Some(next) = next {
            let edge = self.fill_edge(FillDirection::Forward);
            if edge < high {
                let mut state = LayoutState::new(next, FillDirection::Forward, high - edge);
                self.fill(&mut state, adapter, recycler)?;
                corrective |= state.needs_corrective_pass;
            }
        }
        let previous = self
            .first_attached()
            .and_then(|first| FillDirection::Backward.step(first, item_count));
        if let Some(previous) = previous {
            let edge = self.fill_edge(FillDirection::Backward);
            if edge > low {
                let mut state = LayoutState::new(previous, FillDirection::Backward, edge - low);
                self.fill(&mut state, adapter, recycler)?;
                corrective |= state.needs_corrective_pass;
            }
        }
        Ok(corrective)
    }

    /// Fills past the window looking for a focusable item.
    ///
    /// Nothing is pruned; the caller scrolls to whatever it picks first.
    pub fn extend_for_focus(
        &mut self,
        direction: FillDirection,
        budget: usize,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<Option<usize>> {
        let edge = match direction {
            FillDirection::Forward => self.last_attached(),
            FillDirection::Backward => self.first_attached(),
        };
        let Some(next) = edge.and_then(|edge| direction.step(edge, adapter.item_count())) else {
            return Ok(None);
        };
        let mut state = LayoutState::new(next, direction, f32::INFINITY)
            .with_item_budget(budget)
            .stopping_on_focusable();
        self.fill(&mut state, adapter, recycler)?;
        log::debug!(
            "focus search placed {} items {:?}, found {:?}",
            state.items_placed,
            direction,
            state.focusable_found
        );
        Ok(state.focusable_found)
    }

    /// Detaches every item, scrapping its view.
    ///
    /// Returns the scrapped views so the caller can recycle the ones the
    /// next fill does not pick up again.
    pub fn detach_all(&mut self, recycler: &mut dyn Recycler) -> Vec<(ViewHandle, Option<u64>)> {
        let mut scrapped = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            if let Some(view) = item.view {
                recycler.scrap(view);
                scrapped.push((view, item.stable_id));
            }
        }
        scrapped
    }

    /// Recycles scrapped views that were not attached again.
    pub fn recycle_leftovers(
        &mut self,
        scrapped: Vec<(ViewHandle, Option<u64>)>,
        recycler: &mut dyn Recycler,
    ) {
        for (view, stable_id) in scrapped {
            let reattached = self.items.iter().any(|item| item.view == Some(view));
            if !reattached {
                self.retire_view(view, stable_id, recycler);
            }
        }
    }

    /// Full relayout with `anchor` starting at `anchor_start`.
    ///
    /// Returns true when a corrective pass is due.
    pub fn layout_from(
        &mut self,
        anchor: usize,
        anchor_start: f32,
        keep: Option<usize>,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<bool> {
        self.relayout(LayoutOrigin::line(anchor, anchor_start), keep, adapter, recycler)
    }

    /// Full relayout from `origin`.
    ///
    /// Returns true when a corrective pass is due.
    pub fn relayout(
        &mut self,
        origin: LayoutOrigin,
        keep: Option<usize>,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<bool> {
        let scrapped = self.detach_all(recycler);
        let item_count = adapter.item_count();
        let LayoutOrigin {
            anchor,
            anchor_start,
            lane_starts,
        } = origin;
        let mut forward = LayoutState::new(anchor, FillDirection::Forward, 0.0)
            .with_anchor_offset(anchor_start)
            .forcing_first_chunk();
        if let Some(starts) = lane_starts {
            forward = forward.with_lane_starts(starts);
        }
        self.seed_lanes(&forward);
        if item_count == 0 {
            self.recycle_leftovers(scrapped, recycler);
            return Ok(false);
        }
        forward.anchor_position = self.chunk_start(anchor.min(item_count - 1), item_count)?;
        let (_, high) = self.window();
        forward.available = high - self.fill_edge(FillDirection::Forward);
        self.fill(&mut forward, adapter, recycler)?;
        let mut corrective = forward.needs_corrective_pass;
        corrective |= self.fill_window(adapter, recycler)?;
        self.prune(keep, item_count, recycler);
        self.recycle_leftovers(scrapped, recycler);

        log::debug!(
            "layout from {} at {:.1}: attached {:?}..={:?}",
            anchor,
            anchor_start,
            self.first_attached(),
            self.last_attached()
        );
        Ok(corrective)
    }

    /// Moves the window by `delta` and fills the newly exposed side.
    pub fn scroll_by(
        &mut self,
        delta: f32,
        keep: Option<usize>,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<bool> {
        self.scroll_offset += delta;
        let corrective = self.fill_window(adapter, recycler)?;
        self.prune(keep, adapter.item_count(), recycler);
        Ok(corrective)
    }

    /// Removes whole chunks that lie outside the window. `keep` stays
    /// attached, and so does everything between it and the viewport.
    ///
    /// An edge is only pruned once the opposite edge reached its target.
    pub fn prune(&mut self, keep: Option<usize>, item_count: usize, recycler: &mut dyn Recycler) {
        if !self.config.prune_children || self.items.is_empty() {
            return;
        }
        let (low, high) = self.window();
        let spacing = self.config.item_spacing;
        let forward_done = self.last_attached().map_or(true, |last| last + 1 >= item_count)
            || self.fill_edge(FillDirection::Forward) >= high;
        let backward_done =
            self.first_attached() == Some(0) || self.fill_edge(FillDirection::Backward) <= low;
        let row_aligned = self.strategy.kind() == LaneStrategyKind::Grid;

        let mut removed: Vec<AttachedItem> = Vec::new();
        if forward_done {
            let mut count = self
                .items
                .iter()
                .take_while(|item| item.main_end() < low && Some(item.position) != keep)
                .count();
            if row_aligned {
                while count > 0
                    && count < self.items.len()
                    && self.items[count].main_start == self.items[count - 1].main_start
                {
                    count -= 1;
                }
            }
            count = count.min(self.items.len().saturating_sub(1));
            for item in self.items.drain(..count) {
                self.table.release(item.location(), item.main_end() + spacing);
                removed.push(item);
            }
        }
        if backward_done {
            let mut count = self
                .items
                .iter()
                .rev()
                .take_while(|item| item.main_start > high && Some(item.position) != keep)
                .count();
            if row_aligned {
                let len = self.items.len();
                while count > 0
                    && count < len
                    && self.items[len - count].main_start == self.items[len - count - 1].main_start
                {
                    count -= 1;
                }
            }
            count = count.min(self.items.len().saturating_sub(1));
            let split = self.items.len() - count;
            for item in self.items.drain(split..).rev() {
                self.table.release(item.location(), item.main_start);
                removed.push(item);
            }
        }
        if removed.is_empty() {
            return;
        }
        self.table.rebuild(
            self.items
                .iter()
                .map(|item| (item.position, item.location(), item.main_start, item.main_size)),
        );
        log::trace!("pruned {} items", removed.len());
        for item in removed {
            if let Some(view) = item.view {
                self.retire_view(view, item.stable_id, recycler);
            }
        }
    }

    /// Saves child state per policy and recycles `view`, deferring the
    /// recycle while a pass is running.
    fn retire_view(&mut self, view: ViewHandle, stable_id: Option<u64>, recycler: &mut dyn Recycler) {
        if self.child_states.keeps_recycled() {
            if let Some(id) = stable_id {
                if let Some(state) = recycler.save_view_state(view) {
                    self.child_states.remember_recycled(id, state);
                }
            }
        }
        if self.phase.is_idle() {
            recycler.recycle(view);
        } else {
            self.phase.defer(DeferredEffect::Recycle(view));
        }
    }

    /// Replaces an attached item's focusable flag and sub-position count
    /// from the recycler.
    pub fn refresh_item(&mut self, position: usize, recycler: &dyn Recycler) {
        if let Some(index) = self.index_of(position) {
            let item = &mut self.items[index];
            if let Some(view) = item.view {
                item.focusable = recycler.is_focusable(view);
                item.sub_positions = recycler.sub_position_count(view).max(1);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/fill_tests.rs"]
mod tests;
