//! Directional input for remote-control style navigation.
//!
//! Remote controls deliver discrete key presses, never continuous axes, so a
//! key event here is either one of the four directions, a confirm press, or
//! something the grid does not handle.

use crate::axis::Axis;

/// One of the four directions a d-pad can move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDirection {
    /// The screen axis this direction moves along.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            MoveDirection::Up | MoveDirection::Down => Axis::Vertical,
            MoveDirection::Left | MoveDirection::Right => Axis::Horizontal,
        }
    }

    /// True for directions that move toward larger coordinates.
    #[inline]
    pub fn is_forward(self) -> bool {
        matches!(self, MoveDirection::Down | MoveDirection::Right)
    }

    /// Returns the direction pointing the other way.
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            MoveDirection::Up => MoveDirection::Down,
            MoveDirection::Down => MoveDirection::Up,
            MoveDirection::Left => MoveDirection::Right,
            MoveDirection::Right => MoveDirection::Left,
        }
    }

    /// The forward or backward direction along `axis`.
    pub fn along(axis: Axis, forward: bool) -> Self {
        match (axis, forward) {
            (Axis::Vertical, true) => MoveDirection::Down,
            (Axis::Vertical, false) => MoveDirection::Up,
            (Axis::Horizontal, true) => MoveDirection::Right,
            (Axis::Horizontal, false) => MoveDirection::Left,
        }
    }
}

/// Type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    /// Key was pressed down.
    KeyDown,
    /// Key was released.
    KeyUp,
}

/// Keys a remote control can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Confirm / d-pad centre. Never consumed by the grid.
    Enter,
    Back,
    PageUp,
    PageDown,
    /// Key not recognized or not mapped.
    Unknown,
}

/// A key press or release from the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_code: KeyCode,
    pub event_type: KeyEventType,
    /// Number of auto-repeats while the key is held; zero for the first press.
    pub repeat_count: u32,
}

impl KeyEvent {
    pub fn new(key_code: KeyCode, event_type: KeyEventType) -> Self {
        Self {
            key_code,
            event_type,
            repeat_count: 0,
        }
    }

    /// Creates a key down event with the given key code.
    pub fn key_down(key_code: KeyCode) -> Self {
        Self::new(key_code, KeyEventType::KeyDown)
    }

    /// Creates an auto-repeated key down event.
    pub fn repeated(key_code: KeyCode, repeat_count: u32) -> Self {
        Self {
            repeat_count,
            ..Self::key_down(key_code)
        }
    }

    /// Returns true if this is a key down event.
    pub fn is_key_down(&self) -> bool {
        self.event_type == KeyEventType::KeyDown
    }

    /// The movement this key requests, if it is an arrow key.
    pub fn direction(&self) -> Option<MoveDirection> {
        match self.key_code {
            KeyCode::ArrowUp => Some(MoveDirection::Up),
            KeyCode::ArrowDown => Some(MoveDirection::Down),
            KeyCode::ArrowLeft => Some(MoveDirection::Left),
            KeyCode::ArrowRight => Some(MoveDirection::Right),
            _ => None,
        }
    }
}
