//! Recyclable, focus-navigable grid engine for remote-control driven UIs.
//!
//! The engine keeps a bounded window of item views laid out inside a
//! logically unbounded collection, moves a single selection with d-pad
//! input and keeps the selection on an alignment keyline while scrolling.
//!
//! # Architecture
//!
//! - [`grid::SpanResolver`] - cached span sizes, invalidated by generation
//! - [`grid::LaneTable`] - per-lane edges and remembered lane locations
//! - [`grid::LaneStrategy`] - linear, row-aligned grid or staggered placement
//! - [`grid::FillEngine`] - the shared fill / prune loop
//! - [`grid::AlignmentEngine`] - keyline and scroll limit math
//! - [`grid::FocusNavigator`] - directional focus state machine
//! - [`grid::SmoothScroller`] - pending-move pivot scrolling
//! - [`grid::SavedState`] - save and restore keyed by stable id
//! - [`grid::FocusGrid`] - the facade a host drives
//!
//! # Example
//!
//! ```rust,ignore
//! use focusgrid_foundation::{grid::FocusGrid, GridConfig};
//!
//! let mut grid = FocusGrid::new(GridConfig::grid(4))?;
//! grid.set_viewport(Size::new(1920.0, 1080.0));
//! grid.layout(&adapter, &mut recycler)?;
//! grid.dispatch_key(KeyEvent::key_down(KeyCode::ArrowDown), &adapter, &mut recycler);
//! grid.tick(FrameBudget::frame(), &adapter, &mut recycler)?;
//! ```

pub mod config;
pub mod error;
pub mod grid;

pub use config::*;
pub use error::{GridError, Result};
pub use focusgrid_geometry as geometry;
