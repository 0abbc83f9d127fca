//! Saved state and per-child state retention.

use indexmap::IndexMap;

/// Opaque nested state of one item view.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewState(pub Vec<u8>);

/// Which child states survive recycling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChildStatePolicy {
    /// Never save child state.
    None,
    /// Save attached children only, when a snapshot is taken.
    #[default]
    OnScreen,
    /// Also keep the states of up to `n` recycled children, least recent first out.
    Limited(usize),
    /// Keep the state of every recycled child.
    All,
}

/// Everything needed to put a grid back where it was.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SavedState {
    pub selected_position: Option<usize>,
    pub selected_sub_position: usize,
    pub selected_id: Option<u64>,
    /// Item the restored layout is anchored on.
    pub anchor_position: Option<usize>,
    pub anchor_id: Option<u64>,
    /// Main-axis distance of the anchor from the viewport start.
    pub anchor_offset: f32,
    /// Distance of every lane's start line from the viewport start, for
    /// lanes that do not share one line. Empty otherwise.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lane_offsets: Vec<f32>,
    /// Lane of each attached item from the anchor on.
    #[cfg_attr(feature = "serde", serde(default))]
    pub anchor_lanes: Vec<usize>,
    pub child_states: IndexMap<u64, ViewState>,
}

/// Child states waiting to be replayed on attach.
#[derive(Debug, Default)]
pub struct ChildStateStore {
    policy: ChildStatePolicy,
    /// States of recycled children, oldest first.
    recycled: IndexMap<u64, ViewState>,
    /// States from a restore, consumed by the next pass.
    pending_restore: IndexMap<u64, ViewState>,
}

impl ChildStateStore {
    pub fn new(policy: ChildStatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ChildStatePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ChildStatePolicy) {
        self.policy = policy;
        match policy {
            ChildStatePolicy::None | ChildStatePolicy::OnScreen => self.recycled.clear(),
            ChildStatePolicy::Limited(limit) => self.evict_to(limit),
            ChildStatePolicy::All => {}
        }
    }

    /// Whether attached children are saved into snapshots.
    pub fn saves_attached(&self) -> bool {
        self.policy != ChildStatePolicy::None
    }

    /// Whether recycled children keep their state.
    pub fn keeps_recycled(&self) -> bool {
        matches!(
            self.policy,
            ChildStatePolicy::Limited(_) | ChildStatePolicy::All
        )
    }

    /// Remembers the state of a child that is being recycled.
    pub fn remember_recycled(&mut self, id: u64, state: ViewState) {
        match self.policy {
            ChildStatePolicy::None | ChildStatePolicy::OnScreen => {}
            ChildStatePolicy::Limited(limit) => {
                self.recycled.shift_remove(&id);
                self.recycled.insert(id, state);
                self.evict_to(limit);
            }
            ChildStatePolicy::All => {
                self.recycled.shift_remove(&id);
                self.recycled.insert(id, state);
            }
        }
    }

    /// State to replay on a child that is being attached.
    pub fn take_for_attach(&mut self, id: u64) -> Option<ViewState> {
        self.pending_restore
            .shift_remove(&id)
            .or_else(|| self.recycled.shift_remove(&id))
    }

    pub fn stage_restore(&mut self, states: IndexMap<u64, ViewState>) {
        self.pending_restore = states;
    }

    /// Drops restored states nobody claimed. Returns how many were dropped.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending_restore.len();
        self.pending_restore.clear();
        dropped
    }

    pub fn recycled_states(&self) -> &IndexMap<u64, ViewState> {
        &self.recycled
    }

    fn evict_to(&mut self, limit: usize) {
        while self.recycled.len() > limit {
            self.recycled.shift_remove_index(0);
        }
    }
}
