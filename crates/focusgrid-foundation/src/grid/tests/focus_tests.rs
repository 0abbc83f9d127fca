use super::*;
use focusgrid_geometry::EdgeInsets;

fn cell(position: usize, lane: usize, main_start: f32, main_size: f32) -> AttachedItem {
    AttachedItem {
        position,
        stable_id: Some(position as u64),
        view_type: 0,
        view: None,
        lane,
        span: 1,
        main_start,
        main_size,
        cross_start: lane as f32 * 100.0,
        cross_size: 100.0,
        insets: EdgeInsets::default(),
        sub_positions: 1,
        focusable: true,
    }
}

/// 3x3 grid of 100px cells, vertical.
fn grid() -> VecDeque<AttachedItem> {
    (0..9)
        .map(|p| cell(p, p % 3, (p / 3) as f32 * 100.0, 100.0))
        .collect()
}

fn next(items: &VecDeque<AttachedItem>, from: usize, direction: MoveDirection) -> Option<usize> {
    let from = items.iter().find(|item| item.position == from).unwrap();
    find_candidate(items, from, direction, Axis::Vertical).map(|index| items[index].position)
}

#[test]
fn grid_moves_in_four_directions() {
    let items = grid();
    assert_eq!(next(&items, 4, MoveDirection::Down), Some(7));
    assert_eq!(next(&items, 4, MoveDirection::Up), Some(1));
    assert_eq!(next(&items, 4, MoveDirection::Right), Some(5));
    assert_eq!(next(&items, 4, MoveDirection::Left), Some(3));
}

#[test]
fn edges_have_no_candidate() {
    let items = grid();
    assert_eq!(next(&items, 3, MoveDirection::Left), None);
    assert_eq!(next(&items, 8, MoveDirection::Down), None);
    assert_eq!(next(&items, 1, MoveDirection::Up), None);
}

#[test]
fn unfocusable_items_are_skipped_and_ties_go_low() {
    let mut items = grid();
    items[7].focusable = false;
    assert_eq!(next(&items, 4, MoveDirection::Down), Some(6));
}

#[test]
fn partial_last_row_falls_back_to_nearest_lane() {
    let mut items = grid();
    items.truncate(7);
    assert_eq!(next(&items, 5, MoveDirection::Down), Some(6));
}

#[test]
fn staggered_cross_move_prefers_overlapping_center() {
    let items: VecDeque<AttachedItem> = vec![
        cell(0, 0, 0.0, 300.0),
        cell(1, 1, 0.0, 100.0),
        cell(2, 1, 100.0, 100.0),
        cell(3, 1, 200.0, 100.0),
        cell(4, 0, 300.0, 100.0),
    ]
    .into();
    assert_eq!(next(&items, 0, MoveDirection::Right), Some(2));
    assert_eq!(next(&items, 1, MoveDirection::Down), Some(2));
    assert_eq!(next(&items, 3, MoveDirection::Left), Some(0));
    assert_eq!(next(&items, 3, MoveDirection::Down), Some(4));
}

#[test]
fn horizontal_grid_swaps_axes() {
    let items: VecDeque<AttachedItem> = grid();
    let from = &items[4];
    // same main/cross coordinates; Right now walks the main axis
    let index = find_candidate(&items, from, MoveDirection::Right, Axis::Horizontal).unwrap();
    assert_eq!(items[index].position, 7);
    let index = find_candidate(&items, from, MoveDirection::Down, Axis::Horizontal).unwrap();
    assert_eq!(items[index].position, 5);
}

struct Ids(Vec<u64>);

impl GridAdapter for Ids {
    fn item_count(&self) -> usize {
        self.0.len()
    }

    fn stable_id(&self, position: usize) -> Option<u64> {
        self.0.get(position).copied()
    }
}

fn record(position: usize, id: u64) -> SelectionRecord {
    SelectionRecord {
        position: Some(position),
        stable_id: Some(id),
        ..SelectionRecord::default()
    }
}

#[test]
fn insert_before_selection_shifts_it() {
    let mut selection = record(5, 105);
    selection.apply_change(DataChange::Inserted { start: 2, count: 3 });
    selection.apply_change(DataChange::Removed { start: 0, count: 1 });
    assert_eq!(selection.pending_delta, 2);
    assert!(!selection.needs_remap);

    let mut ids: Vec<u64> = (0..20).map(|i| 900 + i).collect();
    ids[7] = 105;
    let adapter = Ids(ids);
    assert_eq!(selection.resolve(&adapter, 0..20), Some(7));
    assert_eq!(selection.position, Some(7));
    assert!(!selection.is_pending());
}

#[test]
fn removed_selection_follows_id_or_clamps() {
    let mut selection = record(4, 104);
    selection.apply_change(DataChange::Removed { start: 3, count: 2 });
    assert!(selection.needs_remap);

    // id gone: the item now at the removal start takes over
    let adapter = Ids(vec![100, 101, 102, 105, 106]);
    assert_eq!(selection.resolve(&adapter, 0..5), Some(3));
    assert_eq!(selection.stable_id, Some(105));
}

#[test]
fn data_set_change_remaps_through_id() {
    let mut selection = record(2, 42);
    selection.sub_position = 1;
    selection.apply_change(DataChange::DataSetChanged);
    let adapter = Ids(vec![7, 8, 9, 10, 42, 11]);
    assert_eq!(selection.resolve(&adapter, 0..6), Some(4));
    assert_eq!(selection.sub_position, 1);
}

#[test]
fn selection_without_ids_clamps() {
    let mut selection = SelectionRecord {
        position: Some(9),
        ..SelectionRecord::default()
    };
    selection.apply_change(DataChange::DataSetChanged);
    struct Plain;
    impl GridAdapter for Plain {
        fn item_count(&self) -> usize {
            4
        }
    }
    assert_eq!(selection.resolve(&Plain, 0..4), Some(3));
}

#[test]
fn data_change_while_seeking_goes_idle() {
    let mut navigator = FocusNavigator::new();
    navigator.select(2, 0, Some(2));
    navigator.begin_seek(10, Some(10));
    assert_eq!(navigator.seek_target(), Some(10));

    navigator.on_data_change(DataChange::Inserted { start: 0, count: 5 });

    assert_eq!(navigator.state(), FocusState::Idle);
    assert_eq!(navigator.selection().position, Some(10));
    assert_eq!(navigator.selection().pending_delta, 5);
    assert_eq!(navigator.selection().stable_id, Some(10));
}

#[test]
fn sub_positions_step_inside_item() {
    let mut navigator = FocusNavigator::new();
    let mut item = cell(0, 0, 0.0, 300.0);
    item.sub_positions = 3;
    navigator.select(0, 0, None);

    assert_eq!(navigator.sub_step(&item, true), Some(1));
    assert_eq!(navigator.sub_step(&item, false), None);
    navigator.set_sub_position(2);
    assert_eq!(navigator.sub_step(&item, true), None);
    assert_eq!(navigator.sub_step(&item, false), Some(1));
}
