//! Pure data for focusgrid layouts: axes, geometry and directional input.
//!
//! Nothing in this crate knows about adapters or recyclers. The engine in
//! `focusgrid-foundation` expresses every placement through these types.

mod axis;
mod direction;
mod geometry;

pub use axis::*;
pub use direction::*;
pub use geometry::*;

pub mod prelude {
    pub use crate::axis::Axis;
    pub use crate::direction::{KeyCode, KeyEvent, KeyEventType, MoveDirection};
    pub use crate::geometry::{EdgeInsets, Point, Rect, Size};
}
