//! View source contract.

use focusgrid_geometry::{Axis, EdgeInsets, Size};

use super::persistence::ViewState;

/// Opaque handle to a view owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Constraints a view is measured with.
///
/// The cross size is fixed by the lane geometry; the view picks its own
/// main-axis size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemConstraints {
    pub axis: Axis,
    pub position: usize,
    pub lane: usize,
    pub span: usize,
    pub cross_size: f32,
}

/// Measurement result for one view.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MeasuredView {
    pub size: Size,
    /// Decoration insets, included in `size`.
    pub insets: EdgeInsets,
}

impl MeasuredView {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            insets: EdgeInsets::default(),
        }
    }

    pub fn with_insets(mut self, insets: EdgeInsets) -> Self {
        self.insets = insets;
        self
    }
}

/// Supplies, measures and takes back item views.
///
/// `scrap` returns a view for reuse within the same pass; `recycle` returns
/// it to the shared pool once the engine has detached it for good.
pub trait Recycler {
    /// A view bound to `position`, or `None` when none can be produced.
    fn obtain_view(&mut self, position: usize) -> Option<ViewHandle>;

    fn measure(&mut self, view: ViewHandle, constraints: ItemConstraints) -> MeasuredView;

    fn scrap(&mut self, view: ViewHandle);

    fn recycle(&mut self, view: ViewHandle);

    fn is_focusable(&self, view: ViewHandle) -> bool {
        let _ = view;
        true
    }

    /// Number of alignment regions inside the view.
    fn sub_position_count(&self, view: ViewHandle) -> usize {
        let _ = view;
        1
    }

    fn save_view_state(&mut self, view: ViewHandle) -> Option<ViewState> {
        let _ = view;
        None
    }

    fn restore_view_state(&mut self, view: ViewHandle, state: &ViewState) {
        let _ = (view, state);
    }
}
