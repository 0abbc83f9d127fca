use thiserror::Error;

/// Unified result type for the grid engine.
pub type Result<T> = std::result::Result<T, GridError>;

/// Configuration errors raised by the grid engine.
///
/// Only programmer errors surface here. Transient adapter races, missing
/// views and out-of-range requests are recovered inside the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("lane count must be at least 1, got {0}")]
    InvalidLaneCount(usize),
    #[error("linear layout takes exactly one lane, got {0}")]
    LinearRequiresSingleLane(usize),
    #[error("span {span} for position {position} is outside 1..={lane_count}")]
    InvalidSpan {
        position: usize,
        span: usize,
        lane_count: usize,
    },
    #[error("alignment percent {0} is outside 0..=100")]
    InvalidAlignmentPercent(f32),
    #[error("`{name}` must be finite and non-negative, got {value}")]
    InvalidSpacing { name: &'static str, value: f32 },
    #[error("position {position} measured an unusable main-axis size {size}")]
    UnsupportedLayoutParams { position: usize, size: f32 },
}
