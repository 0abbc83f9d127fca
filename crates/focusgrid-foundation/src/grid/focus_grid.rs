//! The grid a host talks to.
//!
//! [`FocusGrid`] ties the fill engine, alignment, focus navigation, pivot
//! scrolling and persistence together behind one frame-synchronous API.
//! Every public entry point runs as a pass: recycling and selection
//! listeners are held back until the outermost pass returns.

use std::collections::VecDeque;
use std::rc::Rc;

use focusgrid_geometry::{KeyEvent, MoveDirection, Size};

use super::adapter::{DataChange, GridAdapter};
use super::alignment::{AlignmentEngine, ScrollLimits};
use super::fill::{FillEngine, LayoutOrigin};
use super::focus::{find_candidate, FocusNavigator, FocusOutcome, FocusState, SelectionEvent, SelectionRecord};
use super::item::{AttachedItem, GridLayoutInfo};
use super::lane_strategy::LaneStrategyKind;
use super::lane_table::LaneTable;
use super::layout_state::{DeferredEffect, FillDirection, LayoutPhase};
use super::nearest_range::NearestRangeState;
use super::persistence::SavedState;
use super::prefetch::PrefetchScheduler;
use super::recycler::Recycler;
use super::smooth_scroller::{FrameBudget, SmoothScroller};
use super::span::SpanSizeLookup;
use crate::config::GridConfig;
use crate::error::Result;

/// Rounds a jump may take to settle on the selection while limits firm up.
const MAX_ALIGN_ROUNDS: usize = 3;

/// Chunks a smooth seek scrolls through before it jumps closer instead.
const MAX_SMOOTH_SEEK_CHUNKS: usize = 30;

/// Callback invoked when the selection changes.
pub type SelectionListener = Rc<dyn Fn(&SelectionEvent)>;

/// Handle returned by [`FocusGrid::add_selection_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A programmatic request to bring `position` into view and select it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollRequest {
    pub position: usize,
    pub sub_position: usize,
    /// Lane to place the item in when it is not laid out yet. Only lane
    /// strategies that pick lanes freely honor it.
    pub lane_hint: Option<usize>,
    /// Animate toward the item over the following ticks. A target far
    /// outside the window is first approached with a jump that detaches
    /// the old selection; the selection record keeps pointing at it until
    /// the seek lands, so [`FocusGrid::attached_item`] can return `None`
    /// for the selected position in between.
    pub smooth: bool,
}

impl ScrollRequest {
    pub fn to(position: usize) -> Self {
        Self {
            position,
            sub_position: 0,
            lane_hint: None,
            smooth: false,
        }
    }

    pub fn smoothly(mut self) -> Self {
        self.smooth = true;
        self
    }

    pub fn with_sub_position(mut self, sub_position: usize) -> Self {
        self.sub_position = sub_position;
        self
    }

    pub fn with_lane_hint(mut self, lane: usize) -> Self {
        self.lane_hint = Some(lane);
        self
    }
}

/// What the grid did with a key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDispatch {
    /// The move ran immediately.
    Handled(FocusOutcome),
    /// The move was queued for the pivot scroller. `pending` is the signed
    /// count of queued moves, positive forward.
    Queued { pending: i32 },
    /// Not a key the grid handles.
    Ignored,
}

impl KeyDispatch {
    /// Whether the host should stop propagating the key.
    pub fn is_consumed(&self) -> bool {
        !matches!(
            self,
            KeyDispatch::Ignored | KeyDispatch::Handled(FocusOutcome::Escaped(_))
        )
    }
}

/// Result of one animation frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickResult {
    /// Change of the main-axis scroll offset during the frame.
    pub offset_delta: f32,
    /// Queued move or seek that completed this frame.
    pub outcome: Option<FocusOutcome>,
    /// More frames are needed.
    pub running: bool,
}

/// Where a full relayout starts: an item and its distance from the
/// viewport start, tracked through change notifications like the selection.
#[derive(Clone, Debug)]
struct LayoutAnchor {
    record: SelectionRecord,
    offset: f32,
}

pub struct FocusGrid {
    engine: FillEngine,
    alignment: AlignmentEngine,
    navigator: FocusNavigator,
    scroller: SmoothScroller,
    prefetch: PrefetchScheduler,
    nearest_range: NearestRangeState,
    listeners: Vec<(ListenerId, SelectionListener)>,
    next_listener_id: u64,
    last_emitted: Option<SelectionEvent>,
    cross_scroll_offset: f32,
    needs_layout: bool,
    item_count: usize,
    /// Item count the last pass saw, adjusted by notifications since.
    expected_count: Option<usize>,
    pending_restore: Option<SavedState>,
    anchor: Option<LayoutAnchor>,
    seek: Option<ScrollRequest>,
    scroll_direction: f32,
}

impl std::fmt::Debug for FocusGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusGrid")
            .field("engine", &self.engine)
            .field("focus", &self.navigator)
            .field("scroller", &self.scroller)
            .field("listeners", &self.listeners.len())
            .field("needs_layout", &self.needs_layout)
            .finish()
    }
}

impl FocusGrid {
    pub fn new(config: GridConfig) -> Result<Self> {
        let engine = FillEngine::new(config)?;
        let config = engine.config();
        Ok(Self {
            alignment: AlignmentEngine::new(config),
            scroller: SmoothScroller::new(config.scroll_speed, config.max_pending_moves),
            navigator: FocusNavigator::new(),
            prefetch: PrefetchScheduler::new(),
            nearest_range: NearestRangeState::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
            last_emitted: None,
            cross_scroll_offset: 0.0,
            needs_layout: true,
            item_count: 0,
            expected_count: None,
            pending_restore: None,
            anchor: None,
            seek: None,
            scroll_direction: 1.0,
            engine,
        })
    }

    pub fn config(&self) -> &GridConfig {
        self.engine.config()
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport == self.engine.viewport() {
            return;
        }
        self.engine.set_viewport(viewport);
        let cross_axis = self.engine.axis().cross_axis();
        let padding = self.config().padding;
        self.alignment.set_viewport(
            self.engine.main_extent(),
            cross_axis.extent(viewport),
            padding,
        );
        self.needs_layout = true;
    }

    pub fn set_span_lookup(&mut self, lookup: impl SpanSizeLookup + 'static) {
        self.engine.set_span_lookup(Box::new(lookup));
        self.needs_layout = true;
    }

    /// Forces the next pass to lay everything out again.
    pub fn request_layout(&mut self) {
        self.needs_layout = true;
    }

    // ── Read accessors ──────────────────────────────────────────────────

    pub fn attached_items(&self) -> &VecDeque<AttachedItem> {
        self.engine.items()
    }

    pub fn attached_item(&self, position: usize) -> Option<&AttachedItem> {
        self.engine.find(position)
    }

    pub fn selection(&self) -> &SelectionRecord {
        self.navigator.selection()
    }

    pub fn selected_position(&self) -> Option<usize> {
        self.navigator.selected_position()
    }

    pub fn focus_state(&self) -> FocusState {
        self.navigator.state()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.engine.scroll_offset()
    }

    pub fn cross_scroll_offset(&self) -> f32 {
        self.cross_scroll_offset
    }

    pub fn scroll_limits(&self) -> ScrollLimits {
        self.alignment.main.limits()
    }

    pub fn lane_table(&self) -> &LaneTable {
        self.engine.lane_table()
    }

    pub fn alignment(&self) -> &AlignmentEngine {
        &self.alignment
    }

    pub fn phase(&self) -> LayoutPhase {
        self.engine.phase.phase()
    }

    /// Signed count of queued main-axis moves.
    pub fn pending_moves(&self) -> i32 {
        self.scroller.pending().value()
    }

    /// Whether an animation or a queued move still needs frames.
    pub fn is_scrolling(&self) -> bool {
        self.scroller.is_running() || self.navigator.seek_target().is_some()
    }

    /// Positions worth binding ahead of the scroll, nearest first.
    pub fn prefetch_positions(&self) -> Vec<usize> {
        self.prefetch.pending_prefetches().iter().copied().collect()
    }

    pub fn next_prefetch(&mut self) -> Option<usize> {
        self.prefetch.next_prefetch()
    }

    pub fn layout_info(&self) -> GridLayoutInfo {
        let items = self.engine.items();
        let scroll = self.engine.scroll_offset();
        let viewport_end = scroll + self.engine.main_extent();
        let visible =
            |item: &&AttachedItem| item.main_end() > scroll && item.main_start < viewport_end;
        let limits = self.alignment.main.limits();
        let has_items = self.item_count > 0 && !items.is_empty();
        GridLayoutInfo {
            first_visible: items.iter().find(visible).map(|item| item.position),
            last_visible: items.iter().rev().find(visible).map(|item| item.position),
            first_attached: self.engine.first_attached(),
            last_attached: self.engine.last_attached(),
            attached_count: items.len(),
            item_count: self.item_count,
            scroll_offset: scroll,
            cross_scroll_offset: self.cross_scroll_offset,
            viewport_size: self.engine.main_extent(),
            can_scroll_forward: has_items && limits.max.map_or(true, |max| scroll < max),
            can_scroll_backward: has_items && limits.min.map_or(true, |min| scroll > min),
        }
    }

    // ── Listeners ───────────────────────────────────────────────────────

    pub fn add_selection_listener(
        &mut self,
        listener: impl Fn(&SelectionEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn remove_selection_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    // ── Passes ──────────────────────────────────────────────────────────

    /// Lays out against the adapter's current content.
    ///
    /// A full relayout runs on the first call and after viewport, span or
    /// data changes; otherwise the window is only topped up.
    pub fn layout(&mut self, adapter: &dyn GridAdapter, recycler: &mut dyn Recycler) -> Result<()> {
        self.engine.phase.enter();
        let result = self.layout_pass(adapter, recycler);
        self.finish(recycler);
        result
    }

    /// Records a content change. The next pass remaps the selection and
    /// relays out around the same item.
    pub fn notify_data_changed(&mut self, change: DataChange) {
        log::debug!("data changed: {:?}", change);
        self.engine.invalidate_caches();
        if self.anchor.is_none() {
            self.anchor = self.capture_anchor();
        }
        if let Some(anchor) = &mut self.anchor {
            anchor.record.apply_change(change);
        }
        if self.navigator.seek_target().is_some() {
            self.seek = None;
            self.scroller.stop();
        }
        self.navigator.on_data_change(change);
        self.expected_count = match (self.expected_count, change.count_delta()) {
            (Some(count), Some(delta)) => Some((count as isize + delta).max(0) as usize),
            _ => None,
        };
        self.needs_layout = true;
    }

    /// Scrolls by `delta` pixels, clamped to the content ends. Returns the
    /// distance actually scrolled.
    pub fn scroll_by(
        &mut self,
        delta: f32,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<f32> {
        self.engine.phase.enter();
        let result = self.scroll_by_pass(delta, adapter, recycler);
        self.finish(recycler);
        result
    }

    /// Selects `request.position`, clamped into range, and scrolls it onto
    /// the keyline. A smooth request animates over the following ticks.
    pub fn scroll_to_position(
        &mut self,
        request: ScrollRequest,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        self.engine.phase.enter();
        let result = self.scroll_to_pass(request, adapter, recycler);
        self.finish(recycler);
        result
    }

    /// Routes a remote key. Confirm and non-directional keys are ignored.
    pub fn dispatch_key(
        &mut self,
        event: KeyEvent,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> KeyDispatch {
        if !event.is_key_down() {
            return KeyDispatch::Ignored;
        }
        match event.direction() {
            Some(direction) => self.request_move(direction, adapter, recycler),
            None => KeyDispatch::Ignored,
        }
    }

    /// Queues a main-axis move for the pivot scroller when smooth scrolling
    /// is on; everything else moves right away.
    pub fn request_move(
        &mut self,
        direction: MoveDirection,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> KeyDispatch {
        if direction.axis() == self.engine.axis() && self.config().smooth_scrolling {
            if self.navigator.seek_target().is_some() {
                self.seek = None;
                self.navigator.settle();
            }
            let pending = self.scroller.request_move(direction.is_forward());
            return KeyDispatch::Queued { pending };
        }
        KeyDispatch::Handled(self.move_focus(direction, adapter, recycler))
    }

    /// Moves the selection one step in `direction` and jumps to it.
    pub fn move_focus(
        &mut self,
        direction: MoveDirection,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> FocusOutcome {
        self.engine.phase.enter();
        let result = self.move_focus_pass(direction, false, adapter, recycler);
        self.finish(recycler);
        result.unwrap_or_else(|err| {
            log::warn!("focus move {:?} failed: {}", direction, err);
            FocusOutcome::Unchanged
        })
    }

    /// Advances queued moves, seeks and the scroll animation by one frame.
    pub fn tick(
        &mut self,
        budget: FrameBudget,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<TickResult> {
        self.engine.phase.enter();
        let result = self.tick_pass(budget, adapter, recycler);
        self.finish(recycler);
        result
    }

    /// Captures the selection, the anchor and the nested state of attached
    /// items with a stable id.
    pub fn snapshot(&self, recycler: &mut dyn Recycler) -> SavedState {
        let mut child_states = self.engine.child_states.recycled_states().clone();
        if self.engine.child_states.saves_attached() {
            for item in self.engine.items() {
                let (Some(id), Some(view)) = (item.stable_id, item.view) else {
                    continue;
                };
                if let Some(state) = recycler.save_view_state(view) {
                    child_states.shift_remove(&id);
                    child_states.insert(id, state);
                }
            }
        }
        let record = self.navigator.selection();
        let scroll = self.engine.scroll_offset();
        let mut state = SavedState {
            selected_position: record.position,
            selected_sub_position: record.sub_position,
            selected_id: record.stable_id,
            child_states,
            ..SavedState::default()
        };
        // Lanes that do not share a line are saved one by one, anchored on
        // the first attached item.
        if let Some(LayoutOrigin {
            anchor,
            anchor_start,
            lane_starts: Some(starts),
        }) = self.engine.current_origin()
        {
            state.anchor_position = Some(anchor);
            state.anchor_id = self.engine.find(anchor).and_then(|item| item.stable_id);
            state.anchor_offset = anchor_start - scroll;
            state.lane_offsets = starts.iter().map(|start| start - scroll).collect();
            state.anchor_lanes = self.engine.items().iter().map(|item| item.lane).collect();
            return state;
        }
        if let Some(anchor) = self.capture_anchor() {
            state.anchor_position = anchor.record.position;
            state.anchor_id = anchor.record.stable_id;
            state.anchor_offset = anchor.offset;
        }
        state
    }

    /// Seeds the next pass with `state`.
    pub fn restore(&mut self, state: SavedState) {
        self.pending_restore = Some(state);
        self.needs_layout = true;
    }

    /// Re-reads focusability and sub-positions of an attached item.
    pub fn refresh_item(&mut self, position: usize, recycler: &dyn Recycler) {
        self.engine.refresh_item(position, recycler);
    }

    // ── Pass bodies ─────────────────────────────────────────────────────

    fn finish(&mut self, recycler: &mut dyn Recycler) {
        let effects = self.engine.phase.exit();
        self.apply_effects(effects, recycler);
    }

    fn apply_effects(&self, effects: Vec<DeferredEffect>, recycler: &mut dyn Recycler) {
        for effect in effects {
            match effect {
                DeferredEffect::Recycle(view) => recycler.recycle(view),
                DeferredEffect::Selected(event) => {
                    let listeners: Vec<SelectionListener> = self
                        .listeners
                        .iter()
                        .map(|(_, listener)| Rc::clone(listener))
                        .collect();
                    for listener in listeners {
                        listener(&event);
                    }
                }
            }
        }
    }

    fn keep(&self) -> Option<usize> {
        self.navigator.selected_position()
    }

    fn emit_selection(&mut self) {
        let event = self.navigator.event();
        if self.last_emitted == Some(event) {
            return;
        }
        self.last_emitted = Some(event);
        self.engine.phase.defer(DeferredEffect::Selected(event));
    }

    fn check_item_count(&mut self, item_count: usize) {
        match self.expected_count {
            Some(expected) if expected != item_count => {
                log::warn!(
                    "adapter has {} items but {} were expected; \
                     treating it as a data set change",
                    item_count,
                    expected
                );
                self.notify_data_changed(DataChange::DataSetChanged);
            }
            _ => {}
        }
    }

    /// Runs a layout first when one is owed.
    fn prepare(&mut self, adapter: &dyn GridAdapter, recycler: &mut dyn Recycler) -> Result<()> {
        self.check_item_count(adapter.item_count());
        if self.needs_layout || self.pending_restore.is_some() {
            self.layout_pass(adapter, recycler)?;
        }
        Ok(())
    }

    fn layout_pass(&mut self, adapter: &dyn GridAdapter, recycler: &mut dyn Recycler) -> Result<()> {
        let item_count = adapter.item_count();
        self.check_item_count(item_count);

        if item_count == 0 {
            let start = self.engine.scroll_offset() + self.engine.padding_before();
            self.engine.layout_from(0, start, None, adapter, recycler)?;
            self.engine.set_scroll_offset(0.0);
            self.cross_scroll_offset = 0.0;
            self.scroller.stop();
            self.anchor = None;
            self.seek = None;
            if self.navigator.selected_position().is_some() {
                self.navigator.clear();
                self.emit_selection();
            }
            self.alignment.main.invalidate_edges();
            self.finish_layout(item_count);
            return Ok(());
        }

        if let Some(saved) = self.pending_restore.take() {
            return self.restore_pass(saved, adapter, recycler);
        }

        self.resolve_selection(adapter);
        let full = self.needs_layout || self.engine.items().is_empty();
        let corrective = if full {
            let origin = self.relayout_origin(adapter);
            self.engine.relayout(origin, self.keep(), adapter, recycler)?
        } else {
            self.engine.scroll_by(0.0, self.keep(), adapter, recycler)?
        };
        if corrective {
            self.corrective_pass(adapter, recycler)?;
        }
        self.update_edges(item_count);
        self.ensure_selection();

        if full {
            if let Some(selected) = self.navigator.selected_position() {
                if self.engine.find(selected).is_none() {
                    self.jump_to(selected, None, adapter, recycler)?;
                }
            }
            self.align_selection(false, adapter, recycler)?;
        }
        self.finish_layout(item_count);
        Ok(())
    }

    fn restore_pass(
        &mut self,
        saved: SavedState,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        let item_count = adapter.item_count();
        let near = self.nearest_range.range();
        self.engine.child_states.stage_restore(saved.child_states);
        self.navigator.restore(SelectionRecord {
            position: saved.selected_position,
            sub_position: saved.selected_sub_position,
            stable_id: saved.selected_id,
            pending_delta: 0,
            needs_remap: saved.selected_id.is_some(),
        });
        self.navigator.resolve(adapter, near.clone());
        self.navigator.settle();

        let anchor = saved
            .anchor_id
            .and_then(|id| adapter.index_of_id_near(id, near))
            .or(saved.anchor_position.map(|position| position.min(item_count - 1)))
            .or(self.navigator.selected_position())
            .unwrap_or(0);
        let scroll = self.engine.scroll_offset();
        self.engine
            .remember_lanes(anchor, &saved.anchor_lanes, item_count)?;
        let lane_starts: Option<Vec<f32>> = (saved.lane_offsets.len() == self.config().lane_count)
            .then(|| saved.lane_offsets.iter().map(|offset| scroll + offset).collect());
        let origin = LayoutOrigin {
            anchor,
            anchor_start: scroll + saved.anchor_offset,
            lane_starts,
        };
        let corrective = self
            .engine
            .relayout(origin, self.keep(), adapter, recycler)?;
        if corrective {
            self.corrective_pass(adapter, recycler)?;
        }
        let dropped = self.engine.child_states.discard_pending();
        if dropped > 0 {
            log::debug!("dropped {} restored child states nobody claimed", dropped);
        }
        self.anchor = None;
        self.update_edges(item_count);
        self.ensure_selection();
        self.emit_selection();
        if let Some(item) = self.navigator.selected_position().and_then(|p| self.engine.find(p)) {
            self.cross_scroll_offset = self.alignment.cross_scroll_for(item);
        }
        log::debug!(
            "restored at {} ({:.1}), selection {:?}",
            anchor,
            saved.anchor_offset,
            self.navigator.selected_position()
        );
        self.finish_layout(item_count);
        Ok(())
    }

    /// Single relayout from the current first item, run nested inside the
    /// pass that found placeholders.
    fn corrective_pass(
        &mut self,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        let phase = self.engine.phase.enter();
        log::warn!("running a corrective layout pass ({:?})", phase);
        let result = match self.engine.current_origin() {
            Some(origin) => self
                .engine
                .relayout(origin, self.keep(), adapter, recycler)
                .map(|_| ()),
            None => Ok(()),
        };
        let effects = self.engine.phase.exit();
        self.apply_effects(effects, recycler);
        result
    }

    fn finish_layout(&mut self, item_count: usize) {
        self.needs_layout = false;
        self.item_count = item_count;
        self.expected_count = Some(item_count);
        self.refresh_prefetch(item_count);
    }

    fn refresh_prefetch(&mut self, item_count: usize) {
        let (Some(first), Some(last)) = (self.engine.first_attached(), self.engine.last_attached())
        else {
            self.prefetch.clear();
            return;
        };
        self.nearest_range.update(first);
        self.engine.trim_caches(self.nearest_range.range());
        let config = self.engine.config();
        let per_chunk = match self.engine.strategy_kind() {
            LaneStrategyKind::Grid => config.lane_count,
            LaneStrategyKind::Linear | LaneStrategyKind::Staggered => 1,
        };
        self.prefetch.update(
            first,
            last,
            item_count,
            self.scroll_direction,
            per_chunk,
            &config.prefetch,
        );
    }

    fn resolve_selection(&mut self, adapter: &dyn GridAdapter) {
        let item_count = adapter.item_count();
        let record = self.navigator.selection();
        let out_of_range = record.position.is_some_and(|position| position >= item_count);
        if record.is_pending() || out_of_range {
            self.navigator.resolve(adapter, self.nearest_range.range());
            self.emit_selection();
        }
    }

    /// Selected item if attached, else the first visible one.
    fn capture_anchor(&self) -> Option<LayoutAnchor> {
        let scroll = self.engine.scroll_offset();
        let item = self
            .navigator
            .selected_position()
            .and_then(|position| self.engine.find(position))
            .or_else(|| self.engine.items().iter().find(|item| item.main_end() > scroll))
            .or_else(|| self.engine.items().front())?;
        Some(LayoutAnchor {
            record: SelectionRecord {
                position: Some(item.position),
                stable_id: item.stable_id,
                ..SelectionRecord::default()
            },
            offset: item.main_start - scroll,
        })
    }

    /// Anchor tracked through data changes, else the attached items as
    /// they are.
    fn relayout_origin(&mut self, adapter: &dyn GridAdapter) -> LayoutOrigin {
        let scroll = self.engine.scroll_offset();
        if let Some(mut anchor) = self.anchor.take() {
            if let Some(position) = anchor.record.resolve(adapter, self.nearest_range.range()) {
                return LayoutOrigin::line(position, scroll + anchor.offset);
            }
        }
        self.engine
            .current_origin()
            .unwrap_or_else(|| LayoutOrigin::line(0, scroll + self.engine.padding_before()))
    }

    /// Selects the first focusable item in view when nothing is selected.
    fn ensure_selection(&mut self) {
        if self.navigator.selected_position().is_some() {
            return;
        }
        let scroll = self.engine.scroll_offset();
        let items = self.engine.items();
        let pick = items
            .iter()
            .find(|item| item.focusable && item.main_end() > scroll)
            .or_else(|| items.iter().find(|item| item.focusable))
            .map(|item| (item.position, item.stable_id));
        if let Some((position, stable_id)) = pick {
            self.navigator.select(position, 0, stable_id);
            self.emit_selection();
        }
    }

    /// Feeds the attached ends to both alignment axes.
    fn update_edges(&mut self, item_count: usize) {
        let items = self.engine.items();
        let (Some(front), Some(back)) = (items.front(), items.back()) else {
            self.alignment.main.invalidate_edges();
            return;
        };
        let (min_edge, min_align) = if front.position == 0 {
            let edge = items.iter().map(|item| item.main_start).fold(f32::INFINITY, f32::min);
            (Some(edge), Some(self.alignment.alignment_point(front, 0)))
        } else {
            (None, None)
        };
        let (max_edge, max_align) = if back.position + 1 >= item_count {
            let edge = items
                .iter()
                .map(|item| item.main_end())
                .fold(f32::NEG_INFINITY, f32::max);
            let last_sub = back.sub_positions.saturating_sub(1);
            (Some(edge), Some(self.alignment.alignment_point(back, last_sub)))
        } else {
            (None, None)
        };
        self.alignment
            .main
            .update_edges(min_edge, min_align, max_edge, max_align);

        let lane_size = self.engine.lane_size();
        let cross_min = self.engine.cross_start(0);
        let cross_max = cross_min + self.engine.cross_size(self.engine.config().lane_count);
        self.alignment.cross.update_edges(
            Some(cross_min),
            Some(cross_min + lane_size / 2.0),
            Some(cross_max),
            Some(cross_max - lane_size / 2.0),
        );
    }

    fn selection_target(&self) -> Option<f32> {
        let record = self.navigator.selection();
        let item = self.engine.find(record.position?)?;
        Some(
            self.alignment
                .scroll_for(item, record.sub_position, self.engine.scroll_offset()),
        )
    }

    /// Moves the window and refreshes everything that depends on it.
    fn scroll_engine(
        &mut self,
        delta: f32,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        if delta == 0.0 {
            return Ok(());
        }
        self.scroll_direction = delta.signum();
        let corrective = self.engine.scroll_by(delta, self.keep(), adapter, recycler)?;
        if corrective {
            self.corrective_pass(adapter, recycler)?;
        }
        let item_count = adapter.item_count();
        self.update_edges(item_count);
        self.refresh_prefetch(item_count);
        Ok(())
    }

    /// Puts the selection on the keyline, or starts animating toward it.
    fn align_selection(
        &mut self,
        smooth: bool,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        let Some(item) = self.navigator.selected_position().and_then(|p| self.engine.find(p)) else {
            return Ok(());
        };
        self.cross_scroll_offset = self.alignment.cross_scroll_for(item);
        if smooth {
            if let Some(target) = self.selection_target() {
                self.scroller.set_target(target);
            }
            return Ok(());
        }
        // limits firm up as the far side fills in
        for _ in 0..MAX_ALIGN_ROUNDS {
            let Some(target) = self.selection_target() else {
                break;
            };
            let delta = target - self.engine.scroll_offset();
            if delta == 0.0 {
                break;
            }
            self.scroll_engine(delta, adapter, recycler)?;
        }
        Ok(())
    }

    /// Lays out around `position` unless it is already attached.
    fn jump_to(
        &mut self,
        position: usize,
        lane_hint: Option<usize>,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        if self.engine.find(position).is_some() {
            return Ok(());
        }
        let item_count = adapter.item_count();
        if let Some(lane) = lane_hint {
            self.engine.hint_lane(position, lane, item_count)?;
        }
        let start = self.engine.scroll_offset() + self.alignment.main.keyline();
        let corrective = self
            .engine
            .layout_from(position, start, Some(position), adapter, recycler)?;
        if corrective {
            self.corrective_pass(adapter, recycler)?;
        }
        self.update_edges(item_count);
        self.refresh_prefetch(item_count);
        Ok(())
    }

    fn select_attached(&mut self, position: usize, sub_position: usize) -> bool {
        let Some(item) = self.engine.find(position) else {
            return false;
        };
        let sub_position = sub_position.min(item.sub_positions.saturating_sub(1));
        let stable_id = item.stable_id;
        self.navigator.select(position, sub_position, stable_id);
        self.emit_selection();
        true
    }

    fn scroll_by_pass(
        &mut self,
        delta: f32,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<f32> {
        self.prepare(adapter, recycler)?;
        if self.engine.items().is_empty() {
            return Ok(0.0);
        }
        let before = self.engine.scroll_offset();
        self.scroll_engine(delta, adapter, recycler)?;
        let scroll = self.engine.scroll_offset();
        let clamped = self.alignment.main.limits().clamp(scroll);
        self.scroll_engine(clamped - scroll, adapter, recycler)?;
        Ok(self.engine.scroll_offset() - before)
    }

    fn scroll_to_pass(
        &mut self,
        request: ScrollRequest,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        self.prepare(adapter, recycler)?;
        let item_count = adapter.item_count();
        if item_count == 0 {
            return Ok(());
        }
        let position = request.position.min(item_count - 1);
        if position != request.position {
            log::debug!(
                "scroll to {} clamped to {} of {} items",
                request.position,
                position,
                item_count
            );
        }
        self.scroller.stop();
        self.seek = None;
        if self.navigator.seek_target().is_some() {
            self.navigator.settle();
        }

        if !request.smooth {
            self.jump_to(position, request.lane_hint, adapter, recycler)?;
            self.select_attached(position, request.sub_position);
            return self.align_selection(false, adapter, recycler);
        }

        if self.select_attached(position, request.sub_position) {
            return self.align_selection(true, adapter, recycler);
        }
        if let Some(lane) = request.lane_hint {
            self.engine.hint_lane(position, lane, item_count)?;
        }
        let (first, last) = (
            self.engine.first_attached().unwrap_or(0),
            self.engine.last_attached().unwrap_or(0),
        );
        let distance = if position > last {
            position - last
        } else {
            first.saturating_sub(position)
        };
        let limit = MAX_SMOOTH_SEEK_CHUNKS * self.engine.config().lane_count;
        if distance > limit {
            let anchor = if position > last {
                position - limit
            } else {
                position + limit
            };
            log::debug!("seek to {} is {} away; jumping to {} first", position, distance, anchor);
            let start = self.engine.scroll_offset() + self.engine.padding_before();
            let corrective = self.engine.layout_from(anchor, start, None, adapter, recycler)?;
            if corrective {
                self.corrective_pass(adapter, recycler)?;
            }
            self.update_edges(item_count);
        }
        self.navigator.begin_seek(position, adapter.stable_id(position));
        self.seek = Some(ScrollRequest { position, ..request });
        Ok(())
    }

    fn move_focus_pass(
        &mut self,
        direction: MoveDirection,
        smooth: bool,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<FocusOutcome> {
        self.prepare(adapter, recycler)?;
        let item_count = adapter.item_count();
        if item_count == 0 {
            return Ok(FocusOutcome::Unchanged);
        }
        let axis = self.engine.axis();
        let along_main = direction.axis() == axis;
        let forward = direction.is_forward();

        let Some(selected) = self.navigator.selected_position() else {
            self.ensure_selection();
            return Ok(match self.navigator.selected_position() {
                Some(to) => FocusOutcome::Moved { from: None, to },
                None => FocusOutcome::Unchanged,
            });
        };
        self.jump_to(selected, None, adapter, recycler)?;
        let Some(from) = self.engine.find(selected).cloned() else {
            return Ok(FocusOutcome::Unchanged);
        };

        if along_main {
            if let Some(sub_position) = self.navigator.sub_step(&from, forward) {
                self.navigator.set_sub_position(sub_position);
                self.emit_selection();
                self.align_selection(smooth, adapter, recycler)?;
                return Ok(FocusOutcome::SubPositionChanged {
                    position: selected,
                    sub_position,
                });
            }
        }

        let mut index = find_candidate(self.engine.items(), &from, direction, axis);
        if index.is_none() && along_main {
            let fill_direction = if forward {
                FillDirection::Forward
            } else {
                FillDirection::Backward
            };
            let mut remaining = self.engine.config().max_items_per_focus_request;
            while index.is_none() && remaining > 0 {
                let before = self.engine.items().len();
                let found = self
                    .engine
                    .extend_for_focus(fill_direction, remaining, adapter, recycler)?;
                let placed = self.engine.items().len() - before;
                if placed == 0 {
                    break;
                }
                remaining = remaining.saturating_sub(placed);
                index = find_candidate(self.engine.items(), &from, direction, axis);
                if found.is_none() {
                    break;
                }
            }
            self.update_edges(item_count);
        }

        let Some(index) = index else {
            return self.at_edge(direction, selected, adapter, recycler);
        };
        let target = &self.engine.items()[index];
        let (position, stable_id) = (target.position, target.stable_id);
        let sub_position = if along_main && !forward {
            target.sub_positions.saturating_sub(1)
        } else {
            0
        };
        self.navigator.select(position, sub_position, stable_id);
        self.emit_selection();
        self.align_selection(smooth, adapter, recycler)?;
        Ok(FocusOutcome::Moved {
            from: Some(selected),
            to: position,
        })
    }

    /// No candidate in `direction`: wrap, escape or stay.
    fn at_edge(
        &mut self,
        direction: MoveDirection,
        selected: usize,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<FocusOutcome> {
        let item_count = adapter.item_count();
        let forward = direction.is_forward();
        let config = self.engine.config();
        if direction.axis() != self.engine.axis() {
            return Ok(if config.focus_out_side {
                FocusOutcome::Escaped(direction)
            } else {
                FocusOutcome::Unchanged
            });
        }
        let at_end = if forward {
            self.engine.last_attached() == Some(item_count - 1)
        } else {
            self.engine.first_attached() == Some(0)
        };
        if !at_end {
            // the search budget ran out before the content did
            return Ok(FocusOutcome::Unchanged);
        }
        if config.focus_wrap {
            return self.wrap_focus(forward, selected, adapter, recycler);
        }
        let escapes = if forward {
            config.focus_out_end
        } else {
            config.focus_out_front
        };
        Ok(if escapes {
            FocusOutcome::Escaped(direction)
        } else {
            FocusOutcome::Unchanged
        })
    }

    fn wrap_focus(
        &mut self,
        forward: bool,
        selected: usize,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<FocusOutcome> {
        let target = if forward {
            0
        } else {
            adapter.item_count() - 1
        };
        self.jump_to(target, None, adapter, recycler)?;
        let items = self.engine.items();
        let pick = if forward {
            items.iter().find(|item| item.focusable)
        } else {
            items.iter().rev().find(|item| item.focusable)
        }
        .map(|item| (item.position, item.stable_id, item.sub_positions));
        match pick {
            Some((position, stable_id, sub_positions)) if position != selected => {
                let sub_position = if forward {
                    0
                } else {
                    sub_positions.saturating_sub(1)
                };
                self.navigator.select(position, sub_position, stable_id);
                self.emit_selection();
                self.align_selection(false, adapter, recycler)?;
                Ok(FocusOutcome::Moved {
                    from: Some(selected),
                    to: position,
                })
            }
            _ => Ok(FocusOutcome::Unchanged),
        }
    }

    fn tick_pass(
        &mut self,
        budget: FrameBudget,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<TickResult> {
        self.prepare(adapter, recycler)?;
        let start = self.engine.scroll_offset();
        let mut outcome = None;

        if let Some(target) = self.navigator.seek_target() {
            outcome = self.advance_seek(target, budget, adapter, recycler)?;
        } else if let Some(forward) = self.scroller.take_move() {
            let direction = MoveDirection::along(self.engine.axis(), forward);
            let moved = self.move_focus_pass(direction, true, adapter, recycler)?;
            if !moved.moved() {
                while self.scroller.take_move().is_some() {}
            }
            outcome = Some(moved);
        }

        self.step_scroller(budget, adapter, recycler)?;
        Ok(TickResult {
            offset_delta: self.engine.scroll_offset() - start,
            outcome,
            running: self.is_scrolling(),
        })
    }

    fn advance_seek(
        &mut self,
        target: usize,
        budget: FrameBudget,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<Option<FocusOutcome>> {
        let previous = self.navigator.selected_position();
        let sub_position = self.seek.map_or(0, |request| request.sub_position);
        if self.select_attached(target, sub_position) {
            self.seek = None;
            if let Some(scroll) = self.selection_target() {
                self.scroller.set_target(scroll);
            }
            return Ok(Some(FocusOutcome::Moved {
                from: previous,
                to: target,
            }));
        }

        let forward = self.engine.last_attached().map_or(true, |last| target > last);
        let step = self.scroller.max_step(budget);
        self.scroll_engine(if forward { step } else { -step }, adapter, recycler)?;
        let scroll = self.engine.scroll_offset();
        let clamped = self.alignment.main.limits().clamp(scroll);
        if clamped != scroll {
            self.scroll_engine(clamped - scroll, adapter, recycler)?;
            if self.engine.find(target).is_none() {
                log::debug!("seek to {} hit the content end", target);
                self.seek = None;
                self.navigator.settle();
            }
        }
        Ok(None)
    }

    fn step_scroller(
        &mut self,
        budget: FrameBudget,
        adapter: &dyn GridAdapter,
        recycler: &mut dyn Recycler,
    ) -> Result<()> {
        if self.scroller.target().is_none() {
            return Ok(());
        }
        // the aligned offset moves as limits become known
        if let Some(target) = self.selection_target() {
            self.scroller.set_target(target);
        }
        let step = self.scroller.step(self.engine.scroll_offset(), budget);
        self.scroll_engine(step, adapter, recycler)?;
        if self.scroller.target().is_none() {
            if let Some(target) = self.selection_target() {
                if (target - self.engine.scroll_offset()).abs() > 0.5 {
                    self.scroller.set_target(target);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/focus_grid_tests.rs"]
mod tests;
