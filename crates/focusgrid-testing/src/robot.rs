//! Robot harness for grid tests
//!
//! [`GridRobot`] owns a grid together with its fake adapter and recycler so
//! a test reads as a sequence of remote presses and frames:
//!
//! ```
//! use focusgrid_foundation::GridConfig;
//! use focusgrid_geometry::{KeyCode, Size};
//! use focusgrid_testing::GridRobot;
//!
//! let mut robot = GridRobot::uniform(GridConfig::grid(3), Size::new(600.0, 1000.0), 30, 100.0);
//! robot.press(KeyCode::ArrowDown);
//! robot.settle();
//! assert_eq!(robot.selected(), Some(3));
//! ```

use focusgrid_foundation::grid::{
    AttachedItem, DataChange, FocusGrid, FocusOutcome, FrameBudget, KeyDispatch, ScrollRequest,
    TickResult,
};
use focusgrid_foundation::GridConfig;
use focusgrid_geometry::{KeyCode, KeyEvent, MoveDirection, Rect, Size};

use crate::fakes::{FakeAdapter, FakeRecycler};

/// Frames [`GridRobot::settle`] runs before giving up.
pub const MAX_SETTLE_FRAMES: usize = 600;

pub struct GridRobot {
    pub grid: FocusGrid,
    pub adapter: FakeAdapter,
    pub recycler: FakeRecycler,
}

impl GridRobot {
    /// Grid of `count` items of `item_size`, laid out once.
    pub fn uniform(config: GridConfig, viewport: Size, count: usize, item_size: f32) -> Self {
        Self::new(
            config,
            viewport,
            FakeAdapter::new(count),
            FakeRecycler::uniform(item_size),
        )
    }

    /// Grid over the given fakes, laid out once.
    pub fn new(
        config: GridConfig,
        viewport: Size,
        adapter: FakeAdapter,
        recycler: FakeRecycler,
    ) -> Self {
        let mut grid = FocusGrid::new(config).expect("invalid grid config");
        grid.set_viewport(viewport);
        let mut robot = Self {
            grid,
            adapter,
            recycler,
        };
        robot.layout();
        robot
    }

    pub fn layout(&mut self) -> &mut Self {
        self.grid
            .layout(&self.adapter, &mut self.recycler)
            .expect("layout failed");
        self
    }

    pub fn press(&mut self, key: KeyCode) -> KeyDispatch {
        self.grid.dispatch_key(
            KeyEvent::key_down(key),
            &self.adapter,
            &mut self.recycler,
        )
    }

    pub fn move_focus(&mut self, direction: MoveDirection) -> FocusOutcome {
        self.grid
            .move_focus(direction, &self.adapter, &mut self.recycler)
    }

    pub fn scroll_to(&mut self, request: ScrollRequest) -> &mut Self {
        self.grid
            .scroll_to_position(request, &self.adapter, &mut self.recycler)
            .expect("scroll to position failed");
        self
    }

    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        self.grid
            .scroll_by(delta, &self.adapter, &mut self.recycler)
            .expect("scroll failed")
    }

    /// One frame of `millis` milliseconds.
    pub fn tick(&mut self, millis: u64) -> TickResult {
        self.grid
            .tick(
                FrameBudget::from_millis(millis),
                &self.adapter,
                &mut self.recycler,
            )
            .expect("tick failed")
    }

    /// Runs 16 ms frames until nothing is queued or animating. Returns the
    /// outcomes of the moves performed on the way.
    pub fn settle(&mut self) -> Vec<FocusOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..MAX_SETTLE_FRAMES {
            let frame = self.tick(16);
            outcomes.extend(frame.outcome);
            if !frame.running {
                return outcomes;
            }
        }
        panic!("grid still scrolling after {} frames", MAX_SETTLE_FRAMES);
    }

    /// Applies `edit` to the adapter, notifies the grid and lays out.
    pub fn change(&mut self, edit: impl FnOnce(&mut FakeAdapter) -> DataChange) -> &mut Self {
        let change = edit(&mut self.adapter);
        self.grid.notify_data_changed(change);
        self.layout()
    }

    pub fn selected(&self) -> Option<usize> {
        self.grid.selected_position()
    }

    pub fn attached(&self) -> Vec<usize> {
        self.grid
            .attached_items()
            .iter()
            .map(|item| item.position)
            .collect()
    }

    pub fn attached_ids(&self) -> Vec<Option<u64>> {
        self.grid
            .attached_items()
            .iter()
            .map(|item| item.stable_id)
            .collect()
    }

    pub fn item(&self, position: usize) -> Option<&AttachedItem> {
        self.grid.attached_item(position)
    }

    /// Bounds of `position` in viewport coordinates.
    pub fn bounds(&self, position: usize) -> Option<Rect> {
        let axis = self.grid.config().orientation;
        self.item(position).map(|item| {
            item.bounds(
                axis,
                self.grid.scroll_offset(),
                self.grid.cross_scroll_offset(),
            )
        })
    }

    /// Number of attached items whose first lane is each lane.
    pub fn lane_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.grid.config().lane_count];
        for item in self.grid.attached_items() {
            counts[item.lane] += 1;
        }
        counts
    }
}
