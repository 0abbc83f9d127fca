//! Assertion utilities for grid tests

use focusgrid_foundation::grid::AttachedItem;
use focusgrid_geometry::Rect;

/// Assert that a value is within an expected range.
pub fn assert_approx_eq(actual: f32, expected: f32, tolerance: f32, msg: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{}: expected {} (±{}), got {} (diff: {})",
        msg,
        expected,
        tolerance,
        actual,
        diff
    );
}

/// Assert that a rectangle is approximately equal to another.
pub fn assert_rect_approx_eq(actual: Rect, expected: Rect, tolerance: f32, msg: &str) {
    assert_approx_eq(actual.x, expected.x, tolerance, &format!("{} - x", msg));
    assert_approx_eq(actual.y, expected.y, tolerance, &format!("{} - y", msg));
    assert_approx_eq(
        actual.width,
        expected.width,
        tolerance,
        &format!("{} - width", msg),
    );
    assert_approx_eq(
        actual.height,
        expected.height,
        tolerance,
        &format!("{} - height", msg),
    );
}

/// Assert that attached positions form one contiguous ascending run.
pub fn assert_contiguous(positions: &[usize], msg: &str) {
    for pair in positions.windows(2) {
        assert_eq!(
            pair[1],
            pair[0] + 1,
            "{}: gap in attached positions {:?}",
            msg,
            positions
        );
    }
}

/// Assert that no two attached items cover the same lane at once.
pub fn assert_no_overlap<'a>(items: impl IntoIterator<Item = &'a AttachedItem>, msg: &str) {
    let items: Vec<&AttachedItem> = items.into_iter().collect();
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            let share_lane = a.lane < b.lane + b.span && b.lane < a.lane + a.span;
            let overlap = a.main_start < b.main_end() && b.main_start < a.main_end();
            assert!(
                !(share_lane && overlap),
                "{}: items {} and {} overlap",
                msg,
                a.position,
                b.position
            );
        }
    }
}
