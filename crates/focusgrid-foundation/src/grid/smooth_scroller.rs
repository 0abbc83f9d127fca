//! Pivot scrolling.
//!
//! Holding a direction key produces presses faster than a bounded-speed
//! scroll can follow. Presses along the main axis are accumulated in
//! [`PendingMoves`] and consumed one per frame while the scroller walks the
//! offset toward the selection's aligned position.

use web_time::Duration;

/// Time a frame may spend scrolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameBudget {
    pub elapsed: Duration,
}

impl FrameBudget {
    pub fn new(elapsed: Duration) -> Self {
        Self { elapsed }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// One frame at 60 Hz.
    pub fn frame() -> Self {
        Self::new(Duration::from_micros(16_667))
    }
}

/// Signed count of main-axis moves not yet performed. Positive is forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingMoves {
    value: i32,
    bound: i32,
}

impl PendingMoves {
    pub fn new(bound: u32) -> Self {
        Self {
            value: 0,
            bound: bound.min(i32::MAX as u32) as i32,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value == 0
    }

    /// Adds one move. A move against the pending direction cancels one.
    pub fn push(&mut self, forward: bool) -> i32 {
        self.value = if forward {
            self.value.saturating_add(1).min(self.bound)
        } else {
            self.value.saturating_sub(1).max(-self.bound)
        };
        self.value
    }

    /// Removes one move, returning its direction.
    pub fn take_one(&mut self) -> Option<bool> {
        match self.value.signum() {
            1 => {
                self.value -= 1;
                Some(true)
            }
            -1 => {
                self.value += 1;
                Some(false)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.value = 0;
    }
}

#[derive(Clone, Debug)]
pub struct SmoothScroller {
    pending: PendingMoves,
    /// Pixels per second.
    speed: f32,
    target: Option<f32>,
}

impl SmoothScroller {
    pub fn new(speed: f32, max_pending_moves: u32) -> Self {
        Self {
            pending: PendingMoves::new(max_pending_moves),
            speed,
            target: None,
        }
    }

    pub fn pending(&self) -> PendingMoves {
        self.pending
    }

    pub fn request_move(&mut self, forward: bool) -> i32 {
        self.pending.push(forward)
    }

    pub fn take_move(&mut self) -> Option<bool> {
        self.pending.take_one()
    }

    pub fn target(&self) -> Option<f32> {
        self.target
    }

    pub fn set_target(&mut self, scroll: f32) {
        self.target = Some(scroll);
    }

    pub fn is_running(&self) -> bool {
        !self.pending.is_empty() || self.target.is_some()
    }

    /// Drops queued moves and the target.
    pub fn stop(&mut self) {
        self.pending.clear();
        self.target = None;
    }

    /// Largest offset change allowed in `budget`, never below one pixel.
    pub fn max_step(&self, budget: FrameBudget) -> f32 {
        (self.speed * budget.elapsed.as_secs_f32()).max(1.0)
    }

    /// Offset change toward the target from `current` within `budget`.
    /// Clears the target once it is reached.
    pub fn step(&mut self, current: f32, budget: FrameBudget) -> f32 {
        let Some(target) = self.target else {
            return 0.0;
        };
        let remaining = target - current;
        let max_step = self.max_step(budget);
        if remaining.abs() <= max_step {
            self.target = None;
            remaining
        } else {
            remaining.clamp(-max_step, max_step)
        }
    }
}
