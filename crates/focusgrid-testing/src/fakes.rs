//! In-memory adapter and recycler.
//!
//! The recycler binds view `n` to position `n`, so the same handle comes back
//! for the same position on every pass and tests can follow views by value.

use std::ops::Range;

use focusgrid_foundation::grid::{
    DataChange, GridAdapter, ItemConstraints, MeasuredView, Recycler, ViewHandle, ViewState,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// First id handed out by [`FakeAdapter::new`].
pub const FIRST_ID: u64 = 1000;

/// Adapter over a list of ids.
#[derive(Clone, Debug)]
pub struct FakeAdapter {
    ids: Vec<u64>,
    view_types: FxHashMap<u64, u32>,
    stable_ids: bool,
    next_id: u64,
}

impl FakeAdapter {
    /// `count` items with ids `FIRST_ID..`.
    pub fn new(count: usize) -> Self {
        Self {
            ids: (0..count as u64).map(|p| FIRST_ID + p).collect(),
            view_types: FxHashMap::default(),
            stable_ids: true,
            next_id: FIRST_ID + count as u64,
        }
    }

    /// Same items, but the adapter reports no stable ids.
    pub fn without_ids(count: usize) -> Self {
        Self {
            stable_ids: false,
            ..Self::new(count)
        }
    }

    pub fn id_at(&self, position: usize) -> Option<u64> {
        self.ids.get(position).copied()
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    pub fn set_view_type(&mut self, position: usize, view_type: u32) {
        if let Some(&id) = self.ids.get(position) {
            self.view_types.insert(id, view_type);
        }
    }

    /// Inserts `count` fresh items at `start`.
    pub fn insert(&mut self, start: usize, count: usize) -> DataChange {
        let fresh: Vec<u64> = (0..count as u64).map(|i| self.next_id + i).collect();
        self.next_id += count as u64;
        self.ids.splice(start..start, fresh);
        DataChange::Inserted { start, count }
    }

    pub fn remove(&mut self, range: Range<usize>) -> DataChange {
        let start = range.start;
        let count = range.len();
        self.ids.drain(range);
        DataChange::Removed { start, count }
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> DataChange {
        let id = self.ids.remove(from);
        self.ids.insert(to, id);
        DataChange::Moved { from, to }
    }

    /// Reverses the order of all items.
    pub fn reverse(&mut self) -> DataChange {
        self.ids.reverse();
        DataChange::DataSetChanged
    }

    /// Changes the item count without producing a notification.
    pub fn resize_silently(&mut self, count: usize) {
        while self.ids.len() < count {
            self.ids.push(self.next_id);
            self.next_id += 1;
        }
        self.ids.truncate(count);
    }
}

impl GridAdapter for FakeAdapter {
    fn item_count(&self) -> usize {
        self.ids.len()
    }

    fn view_type(&self, position: usize) -> u32 {
        self.id_at(position)
            .and_then(|id| self.view_types.get(&id).copied())
            .unwrap_or(0)
    }

    fn stable_id(&self, position: usize) -> Option<u64> {
        if self.stable_ids {
            self.id_at(position)
        } else {
            None
        }
    }
}

/// One call received by [`FakeRecycler`], in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecyclerCall {
    Obtain(usize),
    Scrap(ViewHandle),
    Recycle(ViewHandle),
}

/// Recycler that records every call it receives.
pub struct FakeRecycler {
    main_size: Box<dyn Fn(usize) -> f32>,
    pub missing: FxHashSet<usize>,
    pub unfocusable: FxHashSet<usize>,
    pub sub_positions: FxHashMap<usize, usize>,
    /// Nested state each view reports when saved.
    pub view_states: FxHashMap<usize, ViewState>,
    pub obtained: Vec<usize>,
    pub scrapped: Vec<ViewHandle>,
    pub recycled: Vec<ViewHandle>,
    pub restored: Vec<(usize, ViewState)>,
    pub calls: Vec<RecyclerCall>,
}

impl std::fmt::Debug for FakeRecycler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeRecycler")
            .field("obtained", &self.obtained.len())
            .field("scrapped", &self.scrapped.len())
            .field("recycled", &self.recycled.len())
            .finish()
    }
}

impl FakeRecycler {
    /// Every item `size` pixels long on the main axis.
    pub fn uniform(size: f32) -> Self {
        Self::with_sizes(move |_| size)
    }

    /// Main-axis size from `size_of(position)`.
    pub fn with_sizes(size_of: impl Fn(usize) -> f32 + 'static) -> Self {
        Self {
            main_size: Box::new(size_of),
            missing: FxHashSet::default(),
            unfocusable: FxHashSet::default(),
            sub_positions: FxHashMap::default(),
            view_states: FxHashMap::default(),
            obtained: Vec::new(),
            scrapped: Vec::new(),
            recycled: Vec::new(),
            restored: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn handle(position: usize) -> ViewHandle {
        ViewHandle(position as u64)
    }

    fn position(view: ViewHandle) -> usize {
        view.0 as usize
    }

    /// Forgets recorded calls.
    pub fn reset_log(&mut self) {
        self.obtained.clear();
        self.scrapped.clear();
        self.recycled.clear();
        self.restored.clear();
        self.calls.clear();
    }
}

impl Recycler for FakeRecycler {
    fn obtain_view(&mut self, position: usize) -> Option<ViewHandle> {
        self.obtained.push(position);
        self.calls.push(RecyclerCall::Obtain(position));
        if self.missing.contains(&position) {
            return None;
        }
        Some(Self::handle(position))
    }

    fn measure(&mut self, view: ViewHandle, constraints: ItemConstraints) -> MeasuredView {
        let main = (self.main_size)(Self::position(view));
        MeasuredView::new(constraints.axis.size(main, constraints.cross_size))
    }

    fn scrap(&mut self, view: ViewHandle) {
        self.scrapped.push(view);
        self.calls.push(RecyclerCall::Scrap(view));
    }

    fn recycle(&mut self, view: ViewHandle) {
        log::trace!("recycled {:?}", view);
        self.recycled.push(view);
        self.calls.push(RecyclerCall::Recycle(view));
    }

    fn is_focusable(&self, view: ViewHandle) -> bool {
        !self.unfocusable.contains(&Self::position(view))
    }

    fn sub_position_count(&self, view: ViewHandle) -> usize {
        self.sub_positions
            .get(&Self::position(view))
            .copied()
            .unwrap_or(1)
    }

    fn save_view_state(&mut self, view: ViewHandle) -> Option<ViewState> {
        self.view_states.get(&Self::position(view)).cloned()
    }

    fn restore_view_state(&mut self, view: ViewHandle, state: &ViewState) {
        self.restored.push((Self::position(view), state.clone()));
    }
}
