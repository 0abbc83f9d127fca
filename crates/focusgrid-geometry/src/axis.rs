use crate::geometry::{EdgeInsets, Size};

/// The scroll axis of a grid.
///
/// The main axis is the one items are stacked along and the one that scrolls.
/// Lanes (columns for a vertical grid, rows for a horizontal one) run along
/// the main axis and are laid side by side on the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Scrolls left to right. Lanes are rows.
    Horizontal,

    /// Scrolls top to bottom. Lanes are columns.
    #[default]
    Vertical,
}

impl Axis {
    /// Returns the opposite axis.
    #[inline]
    pub fn cross_axis(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Returns true if this is the horizontal axis.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Axis::Horizontal)
    }

    /// Returns true if this is the vertical axis.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Axis::Vertical)
    }

    /// Extent of `size` along this axis.
    #[inline]
    pub fn extent(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// Builds a size from a main-axis and a cross-axis extent.
    #[inline]
    pub fn size(self, main: f32, cross: f32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    /// Inset on the low (left/top) side along this axis.
    #[inline]
    pub fn inset_before(self, insets: EdgeInsets) -> f32 {
        match self {
            Axis::Horizontal => insets.left,
            Axis::Vertical => insets.top,
        }
    }

    /// Inset on the high (right/bottom) side along this axis.
    #[inline]
    pub fn inset_after(self, insets: EdgeInsets) -> f32 {
        match self {
            Axis::Horizontal => insets.right,
            Axis::Vertical => insets.bottom,
        }
    }

    /// Sum of both insets along this axis.
    #[inline]
    pub fn inset_sum(self, insets: EdgeInsets) -> f32 {
        self.inset_before(insets) + self.inset_after(insets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_and_size_are_inverse() {
        let size = Axis::Vertical.size(120.0, 40.0);
        assert_eq!(size, Size::new(40.0, 120.0));
        assert_eq!(Axis::Vertical.extent(size), 120.0);
        assert_eq!(Axis::Horizontal.extent(size), 40.0);
    }

    #[test]
    fn insets_follow_axis() {
        let insets = EdgeInsets::from_components(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Axis::Horizontal.inset_before(insets), 1.0);
        assert_eq!(Axis::Horizontal.inset_after(insets), 3.0);
        assert_eq!(Axis::Vertical.inset_sum(insets), 6.0);
    }
}
