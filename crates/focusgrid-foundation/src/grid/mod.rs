//! Focus-navigable recyclable grid.
//!
//! The engine is split the same way a lazy list is: an item provider
//! contract ([`GridAdapter`]), a view source ([`Recycler`]), a measuring fill
//! loop ([`FillEngine`]) and the state that survives between passes
//! (selection, lane locations, saved child state).

mod adapter;
mod alignment;
mod fill;
mod focus;
mod focus_grid;
mod item;
mod lane_strategy;
mod lane_table;
mod layout_state;
mod nearest_range;
mod persistence;
mod prefetch;
mod recycler;
mod smooth_scroller;
mod span;
mod viewport;

pub use adapter::{DataChange, GridAdapter};
pub use alignment::{
    AlignmentEngine, AxisAlignment, ItemAlignment, ScrollLimits, ScrollStrategy, WindowAlignment,
};
pub use fill::{FillEngine, LayoutOrigin};
pub use focus::{
    find_candidate, FocusNavigator, FocusOutcome, FocusState, SelectionEvent, SelectionRecord,
};
pub use focus_grid::{
    FocusGrid, KeyDispatch, ListenerId, ScrollRequest, SelectionListener, TickResult,
};
pub use item::{AttachedItem, GridLayoutInfo};
pub use lane_strategy::{
    create_strategy, Chunk, ChunkItem, GridLanes, LaneStrategy, LaneStrategyKind, LinearLanes,
    StaggeredLanes,
};
pub use lane_table::{LaneEdge, LaneLocation, LaneTable};
pub use layout_state::{DeferredEffect, FillDirection, LayoutPhase, LayoutState, PhaseTracker};
pub use nearest_range::NearestRangeState;
pub use persistence::{ChildStatePolicy, ChildStateStore, SavedState, ViewState};
pub use prefetch::{PrefetchScheduler, PrefetchStrategy};
pub use recycler::{ItemConstraints, MeasuredView, Recycler, ViewHandle};
pub use smooth_scroller::{FrameBudget, PendingMoves, SmoothScroller};
pub use span::{DefaultSpanSizeLookup, GridCell, SpanResolver, SpanSizeLookup};
pub use viewport::ViewportHandler;
