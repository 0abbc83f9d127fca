use super::*;
use crate::grid::recycler::MeasuredView;
use rustc_hash::FxHashSet;

struct Data {
    count: usize,
}

impl GridAdapter for Data {
    fn item_count(&self) -> usize {
        self.count
    }

    fn stable_id(&self, position: usize) -> Option<u64> {
        Some(1000 + position as u64)
    }
}

/// Binds view `n` to position `n`, so handles are stable across passes.
#[derive(Default)]
struct Views {
    sizes: Vec<f32>,
    missing: FxHashSet<usize>,
    unfocusable: FxHashSet<usize>,
    scrapped: Vec<ViewHandle>,
    recycled: Vec<ViewHandle>,
}

impl Views {
    fn uniform(count: usize, size: f32) -> Self {
        Self {
            sizes: vec![size; count],
            ..Self::default()
        }
    }
}

impl Recycler for Views {
    fn obtain_view(&mut self, position: usize) -> Option<ViewHandle> {
        (!self.missing.contains(&position)).then_some(ViewHandle(position as u64))
    }

    fn measure(&mut self, _view: ViewHandle, constraints: ItemConstraints) -> MeasuredView {
        let main = self.sizes[constraints.position];
        MeasuredView::new(constraints.axis.size(main, constraints.cross_size))
    }

    fn scrap(&mut self, view: ViewHandle) {
        self.scrapped.push(view);
    }

    fn recycle(&mut self, view: ViewHandle) {
        self.recycled.push(view);
    }

    fn is_focusable(&self, view: ViewHandle) -> bool {
        !self.unfocusable.contains(&(view.0 as usize))
    }
}

fn engine(config: GridConfig) -> FillEngine {
    let mut engine = FillEngine::new(config).unwrap();
    engine.set_viewport(Size::new(600.0, 1000.0));
    engine
}

fn positions(engine: &FillEngine) -> Vec<usize> {
    engine.items().iter().map(|item| item.position).collect()
}

#[test]
fn linear_fill_stops_at_viewport_end() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 20 };
    let mut views = Views::uniform(20, 100.0);

    let corrective = engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    assert!(!corrective);
    assert_eq!(positions(&engine), (0..10).collect::<Vec<_>>());
    assert_eq!(engine.items()[9].main_start, 900.0);
    assert_eq!(engine.lane_table().end_edge(0), 1000.0);
    assert_eq!(engine.items()[0].cross_size, 600.0);
}

#[test]
fn spacing_and_padding_shift_items() {
    let config = GridConfig::grid(3)
        .with_spacing(10.0, 20.0)
        .with_padding(EdgeInsets::symmetric(30.0, 0.0));
    let mut engine = engine(config);
    let data = Data { count: 6 };
    let mut views = Views::uniform(6, 100.0);

    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    // (600 - 60 - 40) / 3
    assert_eq!(engine.lane_size(), 500.0 / 3.0);
    let fourth = &engine.items()[4];
    assert_eq!(fourth.lane, 1);
    assert_eq!(fourth.main_start, 110.0);
    assert!((fourth.cross_start - (30.0 + 500.0 / 3.0 + 20.0)).abs() < 1e-3);
}

#[test]
fn staggered_equal_items_fill_lanes_round_robin() {
    let mut engine = engine(GridConfig::staggered(3));
    let data = Data { count: 7 };
    let mut views = Views::uniform(7, 100.0);

    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    let lanes: Vec<usize> = engine.items().iter().map(|item| item.lane).collect();
    assert_eq!(lanes, vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(engine.lane_table().edge(0).last, Some(6));
    assert_eq!(engine.lane_table().end_edge(0), 300.0);
    assert_eq!(engine.lane_table().end_edge(1), 200.0);
}

#[test]
fn relayout_is_idempotent() {
    let mut engine = engine(GridConfig::staggered(3));
    let data = Data { count: 40 };
    let mut views = Views::default();
    views.sizes = (0..40).map(|i| 80.0 + (i % 5) as f32 * 30.0).collect();

    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();
    let first: Vec<AttachedItem> = engine.items().iter().cloned().collect();
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();
    let second: Vec<AttachedItem> = engine.items().iter().cloned().collect();

    assert_eq!(first, second);
    // every view came back, none went to the pool
    assert!(views.recycled.is_empty());
}

#[test]
fn staggered_relayout_after_scrolling_restarts_each_lane() {
    let mut engine = engine(GridConfig::staggered(3));
    let data = Data { count: 200 };
    let mut views = Views::default();
    views.sizes = (0..200).map(|i| (i * 37 % 150 + 50) as f32).collect();

    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();
    for _ in 0..6 {
        engine.scroll_by(700.0, None, &data, &mut views).unwrap();
    }
    let before: Vec<AttachedItem> = engine.items().iter().cloned().collect();

    let origin = engine.current_origin().unwrap();
    assert_eq!(origin.anchor, before[0].position);
    assert_eq!(origin.lane_starts.as_ref().map(Vec::len), Some(3));
    engine.relayout(origin, None, &data, &mut views).unwrap();
    let after: Vec<AttachedItem> = engine.items().iter().cloned().collect();

    assert_eq!(after, before);
}

#[test]
fn linear_origin_shares_one_line() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 30 };
    let mut views = Views::uniform(30, 100.0);

    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();
    engine.scroll_by(350.0, None, &data, &mut views).unwrap();

    assert_eq!(
        engine.current_origin(),
        Some(LayoutOrigin::line(3, 300.0))
    );
}

#[test]
fn scrolling_prunes_and_fills() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 50 };
    let mut views = Views::uniform(50, 100.0);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    engine.scroll_by(350.0, None, &data, &mut views).unwrap();

    assert_eq!(positions(&engine), (3..14).collect::<Vec<_>>());
    assert_eq!(
        views.recycled,
        vec![ViewHandle(0), ViewHandle(1), ViewHandle(2)]
    );
    assert_eq!(engine.lane_table().first_filled(), Some(3));
    assert_eq!(engine.lane_table().start_edge(0), 300.0);
}

#[test]
fn backward_fill_rebuilds_pruned_items() {
    let mut engine = engine(GridConfig::linear().with_spacing(10.0, 0.0));
    let data = Data { count: 50 };
    let mut views = Views::uniform(50, 100.0);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();
    let original = engine.items()[2].clone();

    engine.scroll_by(800.0, None, &data, &mut views).unwrap();
    assert!(engine.find(2).is_none());
    engine.scroll_by(-800.0, None, &data, &mut views).unwrap();

    assert_eq!(engine.find(2), Some(&original));
    assert_eq!(engine.first_attached(), Some(0));
}

#[test]
fn grid_prunes_whole_rows() {
    let mut engine = engine(GridConfig::grid(3));
    let data = Data { count: 60 };
    let mut views = Views::uniform(60, 100.0);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();
    assert_eq!(engine.last_attached(), Some(29));

    engine.scroll_by(250.0, None, &data, &mut views).unwrap();

    // rows 0 and 1 end at or before 200 and are gone; row 2 straddles 250
    assert_eq!(engine.first_attached(), Some(6));
    assert_eq!(engine.last_attached(), Some(38));
    assert_eq!(engine.first_attached().unwrap() % 3, 0);
}

#[test]
fn extra_layout_space_keeps_items_attached() {
    let config = GridConfig::linear().with_extra_layout_space(300.0, 200.0);
    let mut engine = engine(config);
    let data = Data { count: 50 };
    let mut views = Views::uniform(50, 100.0);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();
    assert_eq!(engine.last_attached(), Some(11));

    engine.scroll_by(500.0, None, &data, &mut views).unwrap();

    assert_eq!(engine.first_attached(), Some(1));
    assert_eq!(engine.last_attached(), Some(16));
}

#[test]
fn kept_item_is_not_pruned() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 50 };
    let mut views = Views::uniform(50, 100.0);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    engine.scroll_by(500.0, Some(1), &data, &mut views).unwrap();

    assert_eq!(engine.first_attached(), Some(1));
    assert!(!views.recycled.contains(&ViewHandle(1)));
}

#[test]
fn missing_view_becomes_placeholder() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 5 };
    let mut views = Views::uniform(5, 100.0);
    views.missing.insert(2);

    let corrective = engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    assert!(corrective);
    let placeholder = engine.find(2).unwrap();
    assert!(placeholder.is_placeholder());
    assert_eq!(placeholder.main_size, 0.0);
    assert!(!placeholder.focusable);
    assert_eq!(engine.find(3).unwrap().main_start, 200.0);
}

#[test]
fn invalid_span_fails_the_pass() {
    let mut engine = engine(GridConfig::grid(2));
    engine.set_span_lookup(Box::new(|_: usize| -> usize { 3 }));
    let data = Data { count: 5 };
    let mut views = Views::uniform(5, 100.0);

    let result = engine.layout_from(0, 0.0, None, &data, &mut views);

    assert_eq!(
        result,
        Err(GridError::InvalidSpan {
            position: 0,
            span: 3,
            lane_count: 2
        })
    );
}

#[test]
fn unusable_measurement_is_rejected() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 3 };
    let mut views = Views::uniform(3, 100.0);
    views.sizes[1] = f32::NAN;

    let result = engine.layout_from(0, 0.0, None, &data, &mut views);

    assert!(matches!(
        result,
        Err(GridError::UnsupportedLayoutParams { position: 1, .. })
    ));
}

#[test]
fn focus_extension_stops_on_first_focusable() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 50 };
    let mut views = Views::uniform(50, 100.0);
    views.unfocusable.extend([10, 11, 12]);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    let found = engine
        .extend_for_focus(FillDirection::Forward, 10, &data, &mut views)
        .unwrap();

    assert_eq!(found, Some(13));
    assert_eq!(engine.last_attached(), Some(13));
}

#[test]
fn focus_extension_respects_budget() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 50 };
    let mut views = Views::uniform(50, 100.0);
    views.unfocusable.extend(10..50);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    let found = engine
        .extend_for_focus(FillDirection::Forward, 4, &data, &mut views)
        .unwrap();

    assert_eq!(found, None);
    assert_eq!(engine.last_attached(), Some(13));
}

#[test]
fn recycling_is_deferred_inside_a_pass() {
    let mut engine = engine(GridConfig::linear());
    let data = Data { count: 50 };
    let mut views = Views::uniform(50, 100.0);
    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    engine.phase.enter();
    engine.scroll_by(350.0, None, &data, &mut views).unwrap();
    assert!(views.recycled.is_empty());
    assert_eq!(engine.phase.pending().len(), 3);

    let effects = engine.phase.exit();
    assert_eq!(
        effects,
        vec![
            DeferredEffect::Recycle(ViewHandle(0)),
            DeferredEffect::Recycle(ViewHandle(1)),
            DeferredEffect::Recycle(ViewHandle(2)),
        ]
    );
}

#[test]
fn empty_adapter_attaches_nothing() {
    let mut engine = engine(GridConfig::grid(4));
    let data = Data { count: 0 };
    let mut views = Views::default();

    engine.layout_from(0, 0.0, None, &data, &mut views).unwrap();

    assert!(engine.items().is_empty());
    assert_eq!(engine.lane_table().first_filled(), None);
}
