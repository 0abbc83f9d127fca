//! Testing utilities for focusgrid
//!
//! Fakes for the two host contracts ([`FakeAdapter`], [`FakeRecycler`]) and
//! a [`GridRobot`] that drives a grid with them the way a remote would.

pub mod fakes;
pub mod robot;
pub mod robot_assertions;

pub use fakes::*;
pub use robot::*;

pub mod prelude {
    pub use crate::fakes::*;
    pub use crate::robot::*;
    pub use crate::robot_assertions;
}
