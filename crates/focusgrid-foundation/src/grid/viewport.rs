//! Viewport extent validation.
//!
//! A grid placed in an unconstrained parent would try to attach the whole
//! adapter. The handler detects that and substitutes an estimated extent.

/// Item size assumed before anything was measured.
pub const DEFAULT_ITEM_SIZE_ESTIMATE: f32 = 48.0;

/// Largest main-axis extent still treated as a real viewport.
const MAX_REASONABLE_VIEWPORT: f32 = 100_000.0;

/// Items an estimated viewport should hold.
const UNBOUNDED_VIEWPORT_ITEM_COUNT: f32 = 20.0;

#[derive(Clone, Copy, Debug)]
pub struct ViewportHandler {
    effective_size: f32,
    is_unbounded: bool,
}

impl ViewportHandler {
    /// `viewport_size` is the raw main-axis extent; `average_item_size` and
    /// `spacing` size the estimate for unbounded viewports.
    pub fn new(viewport_size: f32, average_item_size: f32, spacing: f32) -> Self {
        let is_unbounded = !viewport_size.is_finite() || viewport_size > MAX_REASONABLE_VIEWPORT;

        let effective_size = if is_unbounded {
            let item_size = average_item_size.max(DEFAULT_ITEM_SIZE_ESTIMATE);
            let estimated = (item_size + spacing) * UNBOUNDED_VIEWPORT_ITEM_COUNT;
            log::warn!(
                "grid viewport is unbounded ({}); laying out {} instead. \
                 Give the grid a bounded size.",
                viewport_size,
                estimated
            );
            estimated
        } else {
            viewport_size.max(0.0)
        };

        Self {
            effective_size,
            is_unbounded,
        }
    }

    #[inline]
    pub fn effective_size(&self) -> f32 {
        self.effective_size
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.is_unbounded
    }
}
