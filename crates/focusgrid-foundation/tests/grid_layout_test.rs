//! Layout tests driven through the public facade
//!
//! These run the full grid (fill, prune, alignment) against the fakes from
//! `focusgrid-testing` and check the placement invariants a host relies on:
//! lane assignment, span bounds, no overlap and stable relayouts.

use focusgrid_foundation::grid::{ScrollRequest, WindowAlignment};
use focusgrid_foundation::{GridConfig, GridError};
use focusgrid_geometry::{Axis, Rect, Size};
use focusgrid_testing::robot_assertions::{
    assert_approx_eq, assert_contiguous, assert_no_overlap, assert_rect_approx_eq,
};
use focusgrid_testing::{FakeAdapter, FakeRecycler, GridRobot};

const VIEWPORT: Size = Size::new(600.0, 1000.0);

fn lanes(robot: &GridRobot) -> Vec<usize> {
    robot
        .grid
        .attached_items()
        .iter()
        .map(|item| item.lane)
        .collect()
}

#[test]
fn equal_items_fill_lanes_round_robin() {
    for config in [GridConfig::staggered(3), GridConfig::grid(3)] {
        let robot = GridRobot::uniform(config.clone(), VIEWPORT, 7, 100.0);

        assert_eq!(robot.attached(), (0..7).collect::<Vec<_>>());
        assert_eq!(lanes(&robot), vec![0, 1, 2, 0, 1, 2, 0], "{:?}", config.strategy);
        assert_eq!(robot.lane_counts(), vec![3, 2, 2]);
        assert_approx_eq(
            robot.grid.lane_table().imbalance(),
            100.0,
            0.01,
            "lane imbalance",
        );
    }
}

#[test]
fn staggered_lanes_stay_within_one_item_of_each_other() {
    let sizes = |p: usize| (p * 37 % 150 + 50) as f32;
    let robot = GridRobot::new(
        GridConfig::staggered(3),
        Size::new(600.0, 5000.0),
        FakeAdapter::new(40),
        FakeRecycler::with_sizes(sizes),
    );

    assert_eq!(robot.attached(), (0..40).collect::<Vec<_>>());
    assert!(robot.grid.lane_table().imbalance() < 200.0);
    assert_no_overlap(robot.grid.attached_items(), "staggered");

    let counts = robot.lane_counts();
    assert!(counts.iter().all(|&count| count > 0), "{:?}", counts);
}

#[test]
fn spans_stay_inside_the_lane_count() {
    let mut robot = GridRobot::uniform(GridConfig::grid(4), VIEWPORT, 60, 100.0);
    robot.grid.set_span_lookup(|p: usize| {
        if p % 5 == 0 {
            4
        } else if p % 3 == 0 {
            2
        } else {
            1
        }
    });
    robot.layout();

    let items = robot.grid.attached_items();
    assert!(!items.is_empty());
    for item in items {
        assert!(item.lane + item.span <= 4, "item {} overflows", item.position);
        if item.position % 5 == 0 {
            assert_eq!(item.lane, 0);
            assert_eq!(item.span, 4);
        }
    }
    assert_no_overlap(items, "spanned grid");
    assert_contiguous(&robot.attached(), "spanned grid");
}

#[test]
fn span_wider_than_lanes_is_an_error() {
    let mut robot = GridRobot::uniform(GridConfig::grid(4), VIEWPORT, 10, 100.0);
    robot.grid.set_span_lookup(|_: usize| 5);

    let result = robot.grid.layout(&robot.adapter, &mut robot.recycler);

    assert!(matches!(
        result,
        Err(GridError::InvalidSpan {
            span: 5,
            lane_count: 4,
            ..
        })
    ));
}

#[test]
fn full_span_item_covers_the_cross_axis() {
    let mut robot = GridRobot::uniform(GridConfig::grid(3), VIEWPORT, 1, 100.0);
    robot.grid.set_span_lookup(|_: usize| 3);
    robot.layout();

    let bounds = robot.bounds(0).expect("item 0 attached");
    assert_rect_approx_eq(bounds, Rect::new(0.0, 0.0, 600.0, 100.0), 0.01, "full span");
}

#[test]
fn relayout_without_changes_is_stable() {
    let sizes = |p: usize| (p * 53 % 150 + 50) as f32;
    let mut robot = GridRobot::new(
        GridConfig::staggered(3),
        VIEWPORT,
        FakeAdapter::new(30),
        FakeRecycler::with_sizes(sizes),
    );
    let before = robot.grid.attached_items().clone();

    robot.grid.request_layout();
    robot.layout();

    assert_eq!(robot.grid.attached_items(), &before);
    assert_eq!(robot.selected(), Some(0));
}

#[test]
fn relayout_after_scrolling_keeps_every_lane_in_place() {
    let sizes = |p: usize| (p * 37 % 150 + 50) as f32;
    for config in [GridConfig::staggered(3), GridConfig::grid(3)] {
        let mut robot = GridRobot::new(
            config.clone(),
            VIEWPORT,
            FakeAdapter::new(200),
            FakeRecycler::with_sizes(sizes),
        );
        robot.scroll_to(ScrollRequest::to(60));
        let before = robot.grid.attached_items().clone();
        let scroll = robot.grid.scroll_offset();

        robot.grid.request_layout();
        robot.layout();

        assert_eq!(robot.grid.attached_items(), &before, "{:?}", config.strategy);
        assert_eq!(robot.grid.scroll_offset(), scroll);
        assert_eq!(robot.selected(), Some(60));
        assert_no_overlap(robot.grid.attached_items(), "relayout");
    }
}

#[test]
fn empty_adapter_lays_out_nothing() {
    let robot = GridRobot::uniform(GridConfig::staggered(2), VIEWPORT, 0, 100.0);

    assert!(robot.attached().is_empty());
    assert_eq!(robot.selected(), None);
    assert_eq!(robot.grid.scroll_offset(), 0.0);
    assert_eq!(robot.grid.prefetch_positions(), Vec::<usize>::new());
}

#[test]
fn scroll_past_the_end_selects_the_last_item() {
    let mut robot = GridRobot::uniform(GridConfig::linear(), VIEWPORT, 20, 100.0);

    robot.scroll_to(ScrollRequest::to(20));

    assert_eq!(robot.selected(), Some(19));
    let last = robot.bounds(19).expect("last item attached");
    assert_approx_eq(last.y + last.height, 1000.0, 0.01, "last item end");
}

#[test]
fn keyline_only_alignment_centers_the_item() {
    let config =
        GridConfig::linear().with_window_alignment(WindowAlignment::keyline_only(50.0));
    let mut robot = GridRobot::uniform(config, VIEWPORT, 40, 100.0);

    robot.scroll_to(ScrollRequest::to(10));

    let bounds = robot.bounds(10).expect("item 10 attached");
    assert_approx_eq(bounds.y, 450.0, 0.01, "item start");
    assert_approx_eq(bounds.height, 100.0, 0.01, "item height");
}

#[test]
fn extra_layout_space_keeps_items_past_the_viewport() {
    let config = GridConfig::linear().with_extra_layout_space(0.0, 500.0);
    let mut robot = GridRobot::uniform(config, VIEWPORT, 30, 100.0);

    robot.scroll_to(ScrollRequest::to(7));

    assert_eq!(robot.attached(), (2..18).collect::<Vec<_>>());
}

#[test]
fn horizontal_grid_places_lanes_as_rows() {
    let config = GridConfig::grid(2).with_orientation(Axis::Horizontal);
    let robot = GridRobot::uniform(config, Size::new(1000.0, 600.0), 10, 100.0);

    let second = robot.bounds(1).expect("item 1 attached");
    let third = robot.bounds(2).expect("item 2 attached");
    assert_rect_approx_eq(second, Rect::new(0.0, 300.0, 100.0, 300.0), 0.01, "item 1");
    assert_rect_approx_eq(third, Rect::new(100.0, 0.0, 100.0, 300.0), 0.01, "item 2");
}

#[test]
fn scrolling_prunes_whole_rows_and_recycles_once() {
    let mut robot = GridRobot::uniform(GridConfig::grid(3), VIEWPORT, 90, 100.0);
    robot.scroll_to(ScrollRequest::to(30));
    robot.recycler.reset_log();

    robot.scroll_by(300.0);

    let attached = robot.attached();
    assert_eq!(attached.first().map(|p| p % 3), Some(0));
    assert_eq!(attached.last().map(|p| p % 3), Some(2));
    assert_contiguous(&attached, "after scroll");
    let mut recycled: Vec<usize> = robot
        .recycler
        .recycled
        .iter()
        .map(|view| view.0 as usize)
        .collect();
    assert!(!recycled.is_empty());
    recycled.sort_unstable();
    recycled.dedup();
    assert_eq!(recycled.len(), robot.recycler.recycled.len());
    assert!(recycled.iter().all(|p| !attached.contains(p)));
}
