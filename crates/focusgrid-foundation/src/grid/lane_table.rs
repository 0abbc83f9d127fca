//! Per-lane fill bookkeeping.
//!
//! Each lane tracks the first and last position placed in it and the main
//! axis span those items cover. A lane without items still has a boundary
//! (`start == end`) so the next item placed into it lands where the previous
//! one would have been: the anchor line after a reset, or the edge of the
//! last item pruned from it.
//!
//! The table also remembers which lanes every position was placed in, so a
//! backward fill re-creates exactly the layout a forward fill produced.

use std::collections::VecDeque;
use std::ops::Range;

/// Lanes occupied by one position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneLocation {
    pub lane: usize,
    pub span: usize,
}

impl LaneLocation {
    pub fn new(lane: usize, span: usize) -> Self {
        Self { lane, span }
    }

    /// Lane indices covered by this location.
    pub fn lanes(&self) -> std::ops::Range<usize> {
        self.lane..self.lane + self.span
    }
}

/// Edge record of one lane.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneEdge {
    pub first: Option<usize>,
    pub last: Option<usize>,
    pub start: f32,
    pub end: f32,
}

impl LaneEdge {
    fn empty_at(boundary: f32) -> Self {
        Self {
            first: None,
            last: None,
            start: boundary,
            end: boundary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct LaneTable {
    lanes: Vec<LaneEdge>,
    locations: VecDeque<LaneLocation>,
    first_location: usize,
}

impl LaneTable {
    pub fn new(lane_count: usize) -> Self {
        Self {
            lanes: vec![LaneEdge::empty_at(0.0); lane_count],
            locations: VecDeque::new(),
            first_location: 0,
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lanes(&self) -> &[LaneEdge] {
        &self.lanes
    }

    pub fn edge(&self, lane: usize) -> &LaneEdge {
        &self.lanes[lane]
    }

    /// Empties every lane at `origin`. Remembered locations are kept.
    pub fn reset(&mut self, origin: f32) {
        for lane in &mut self.lanes {
            *lane = LaneEdge::empty_at(origin);
        }
    }

    /// Empties every lane at its own line from `starts`, indexed by lane.
    /// Lanes past the end of `starts` use the lowest given line.
    pub fn reset_lanes(&mut self, starts: &[f32]) {
        let lowest = starts.iter().copied().fold(f32::INFINITY, f32::min);
        let fallback = if lowest.is_finite() { lowest } else { 0.0 };
        for (lane, edge) in self.lanes.iter_mut().enumerate() {
            *edge = LaneEdge::empty_at(starts.get(lane).copied().unwrap_or(fallback));
        }
    }

    /// Start line of every lane: its first item, or its boundary when empty.
    ///
    /// Feeding these back into [`LaneTable::reset_lanes`] and refilling
    /// with the remembered locations reproduces the current placement.
    pub fn lane_starts(&self) -> Vec<f32> {
        self.lanes.iter().map(|lane| lane.start.min(lane.end)).collect()
    }

    /// Forgets every remembered location.
    pub fn clear_locations(&mut self) {
        self.locations.clear();
        self.first_location = 0;
    }

    /// Records an item occupying `location` from `main_start` for `extent`.
    pub fn assign(&mut self, position: usize, location: LaneLocation, main_start: f32, extent: f32) {
        let main_end = main_start + extent;
        for lane in location.lanes() {
            let edge = &mut self.lanes[lane];
            match (edge.first, edge.last) {
                (Some(first), Some(last)) => {
                    edge.first = Some(first.min(position));
                    edge.last = Some(last.max(position));
                    edge.start = edge.start.min(main_start);
                    edge.end = edge.end.max(main_end);
                }
                _ => {
                    edge.first = Some(position);
                    edge.last = Some(position);
                    edge.start = main_start;
                    edge.end = main_end;
                }
            }
        }
        self.record_location(position, location);
    }

    /// Sets the boundary of the lanes a detached item covered.
    ///
    /// Call before [`LaneTable::rebuild`]; lanes that still hold items get
    /// their edges from those items again.
    pub fn release(&mut self, location: LaneLocation, boundary: f32) {
        for lane in location.lanes() {
            self.lanes[lane] = LaneEdge::empty_at(boundary);
        }
    }

    /// Recomputes lane edges from the items still attached.
    pub fn rebuild<I>(&mut self, placed: I)
    where
        I: IntoIterator<Item = (usize, LaneLocation, f32, f32)>,
    {
        for lane in &mut self.lanes {
            lane.first = None;
            lane.last = None;
            lane.start = lane.start.min(lane.end);
            lane.end = lane.start;
        }
        for (position, location, main_start, extent) in placed {
            self.assign(position, location, main_start, extent);
        }
    }

    pub fn is_lane_empty(&self, lane: usize) -> bool {
        self.lanes[lane].is_empty()
    }

    pub fn filled_extent(&self, lane: usize) -> f32 {
        let edge = &self.lanes[lane];
        if edge.is_empty() {
            0.0
        } else {
            edge.end - edge.start
        }
    }

    pub fn start_edge(&self, lane: usize) -> f32 {
        self.lanes[lane].start
    }

    pub fn end_edge(&self, lane: usize) -> f32 {
        self.lanes[lane].end
    }

    /// Lowest position attached in any lane.
    pub fn first_filled(&self) -> Option<usize> {
        self.lanes.iter().filter_map(|lane| lane.first).min()
    }

    /// Highest position attached in any lane.
    pub fn last_filled(&self) -> Option<usize> {
        self.lanes.iter().filter_map(|lane| lane.last).max()
    }

    /// Where the next item appended to `lane` starts.
    pub fn next_start(&self, lane: usize, spacing: f32) -> f32 {
        let edge = &self.lanes[lane];
        if edge.is_empty() {
            edge.end
        } else {
            edge.end + spacing
        }
    }

    /// Where the next item prepended to `lane` ends.
    pub fn next_end(&self, lane: usize, spacing: f32) -> f32 {
        self.lanes[lane].start - spacing
    }

    /// Smallest and largest [`LaneTable::next_start`] over all lanes.
    pub fn next_start_bounds(&self, spacing: f32) -> (f32, f32) {
        (0..self.lanes.len())
            .map(|lane| self.next_start(lane, spacing))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Smallest and largest [`LaneTable::next_end`] over all lanes.
    pub fn next_end_bounds(&self, spacing: f32) -> (f32, f32) {
        (0..self.lanes.len())
            .map(|lane| self.next_end(lane, spacing))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// First lane of the `span`-wide window whose tallest lane ends lowest.
    ///
    /// Ties go to the lowest lane.
    pub fn pick_shortest_lane(&self, span: usize, spacing: f32) -> usize {
        let mut best = 0;
        let mut best_edge = f32::INFINITY;
        for lane in 0..=self.lanes.len().saturating_sub(span) {
            let edge = (lane..lane + span)
                .map(|l| self.next_start(l, spacing))
                .fold(f32::NEG_INFINITY, f32::max);
            if edge < best_edge {
                best = lane;
                best_edge = edge;
            }
        }
        best
    }

    /// First lane of the `span`-wide window whose lowest start is largest.
    ///
    /// Ties go to the lowest lane.
    pub fn pick_longest_lane(&self, span: usize, spacing: f32) -> usize {
        let mut best = 0;
        let mut best_edge = f32::NEG_INFINITY;
        for lane in 0..=self.lanes.len().saturating_sub(span) {
            let edge = (lane..lane + span)
                .map(|l| self.next_end(l, spacing))
                .fold(f32::INFINITY, f32::min);
            if edge > best_edge {
                best = lane;
                best_edge = edge;
            }
        }
        best
    }

    /// Largest difference between the end edges of two filled lanes.
    pub fn imbalance(&self) -> f32 {
        let mut ends = self
            .lanes
            .iter()
            .filter(|lane| !lane.is_empty())
            .map(|lane| lane.end);
        let Some(first) = ends.next() else {
            return 0.0;
        };
        let (lo, hi) = ends.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        hi - lo
    }

    /// Remembered lanes of `position`.
    pub fn location(&self, position: usize) -> Option<LaneLocation> {
        position
            .checked_sub(self.first_location)
            .and_then(|offset| self.locations.get(offset))
            .copied()
    }

    /// Remembers `location` for `position` without touching the lane edges,
    /// so the next placement of `position` reuses it.
    pub fn remember(&mut self, position: usize, location: LaneLocation) {
        self.record_location(position, location);
    }

    /// Forgets remembered locations outside `window`.
    pub fn retain_locations(&mut self, window: Range<usize>) {
        let end = self.first_location + self.locations.len();
        if window.start >= end || window.end <= self.first_location {
            self.clear_locations();
            return;
        }
        self.locations.truncate(window.end - self.first_location);
        let drop_front = window.start.saturating_sub(self.first_location);
        self.locations.drain(..drop_front);
        self.first_location += drop_front;
    }

    fn record_location(&mut self, position: usize, location: LaneLocation) {
        if self.locations.is_empty() {
            self.first_location = position;
            self.locations.push_back(location);
            return;
        }
        let end = self.first_location + self.locations.len();
        if position >= self.first_location && position < end {
            self.locations[position - self.first_location] = location;
        } else if position == end {
            self.locations.push_back(location);
        } else if position + 1 == self.first_location {
            self.locations.push_front(location);
            self.first_location = position;
        } else {
            // Not contiguous with what we know; start over from here.
            self.locations.clear();
            self.first_location = position;
            self.locations.push_back(location);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lane: usize) -> LaneLocation {
        LaneLocation::new(lane, 1)
    }

    #[test]
    fn empty_lanes_start_at_origin() {
        let mut table = LaneTable::new(3);
        table.reset(40.0);
        assert_eq!(table.next_start(1, 8.0), 40.0);
        assert_eq!(table.next_end(1, 8.0), 32.0);
        assert_eq!(table.first_filled(), None);
        assert_eq!(table.filled_extent(1), 0.0);
    }

    #[test]
    fn assign_extends_edges_and_positions() {
        let mut table = LaneTable::new(2);
        table.assign(4, loc(0), 0.0, 100.0);
        table.assign(6, loc(0), 110.0, 50.0);
        table.assign(3, loc(0), -60.0, 50.0);
        assert_eq!(table.edge(0).first, Some(3));
        assert_eq!(table.edge(0).last, Some(6));
        assert_eq!(table.start_edge(0), -60.0);
        assert_eq!(table.end_edge(0), 160.0);
        assert_eq!(table.filled_extent(0), 220.0);
        assert_eq!(table.last_filled(), Some(6));
    }

    #[test]
    fn spanning_item_updates_every_covered_lane() {
        let mut table = LaneTable::new(3);
        table.assign(0, LaneLocation::new(1, 2), 0.0, 30.0);
        assert!(table.is_lane_empty(0));
        assert_eq!(table.end_edge(1), 30.0);
        assert_eq!(table.end_edge(2), 30.0);
    }

    #[test]
    fn shortest_lane_ties_go_low() {
        let mut table = LaneTable::new(3);
        assert_eq!(table.pick_shortest_lane(1, 0.0), 0);
        table.assign(0, loc(0), 0.0, 100.0);
        assert_eq!(table.pick_shortest_lane(1, 0.0), 1);
        table.assign(1, loc(1), 0.0, 50.0);
        table.assign(2, loc(2), 0.0, 80.0);
        assert_eq!(table.pick_shortest_lane(1, 0.0), 1);
        // window [1,2] ends at 80, window [0,1] at 100
        assert_eq!(table.pick_shortest_lane(2, 0.0), 1);
    }

    #[test]
    fn longest_lane_picks_largest_start() {
        let mut table = LaneTable::new(2);
        table.assign(5, loc(0), -100.0, 100.0);
        table.assign(6, loc(1), -40.0, 40.0);
        assert_eq!(table.pick_longest_lane(1, 0.0), 1);
    }

    #[test]
    fn locations_are_contiguous() {
        let mut table = LaneTable::new(2);
        table.assign(10, loc(1), 0.0, 10.0);
        table.assign(11, loc(0), 0.0, 10.0);
        table.assign(9, loc(0), -20.0, 10.0);
        assert_eq!(table.location(9), Some(loc(0)));
        assert_eq!(table.location(10), Some(loc(1)));
        assert_eq!(table.location(12), None);

        table.assign(50, loc(1), 0.0, 10.0);
        assert_eq!(table.location(10), None);
        assert_eq!(table.location(50), Some(loc(1)));
    }

    #[test]
    fn locations_trim_to_window() {
        let mut table = LaneTable::new(2);
        for position in 10..20 {
            table.remember(position, loc(position % 2));
        }
        table.retain_locations(12..15);
        assert_eq!(table.location(11), None);
        assert_eq!(table.location(12), Some(loc(0)));
        assert_eq!(table.location(14), Some(loc(0)));
        assert_eq!(table.location(15), None);

        table.retain_locations(40..50);
        assert_eq!(table.location(13), None);
        table.remember(41, loc(1));
        assert_eq!(table.location(41), Some(loc(1)));
    }

    #[test]
    fn lanes_reset_to_their_own_starts() {
        let mut table = LaneTable::new(3);
        table.assign(5, loc(1), -55.0, 100.0);
        table.assign(6, loc(0), 58.0, 40.0);
        table.release(loc(2), -18.0);
        table.rebuild([(5, loc(1), -55.0, 100.0), (6, loc(0), 58.0, 40.0)]);
        let starts = table.lane_starts();
        assert_eq!(starts, vec![58.0, -55.0, -18.0]);

        table.reset_lanes(&starts);
        assert_eq!(table.first_filled(), None);
        assert_eq!(table.next_start(0, 8.0), 58.0);
        assert_eq!(table.next_start(1, 8.0), -55.0);
        assert_eq!(table.next_end(2, 8.0), -26.0);

        table.reset_lanes(&[10.0]);
        assert_eq!(table.next_start(2, 0.0), 10.0);
    }

    #[test]
    fn released_lane_keeps_boundary() {
        let mut table = LaneTable::new(2);
        table.assign(0, loc(0), 0.0, 100.0);
        table.assign(1, loc(1), 0.0, 300.0);
        table.assign(2, loc(0), 100.0, 100.0);

        // Detach position 1 from the front of lane 1.
        table.release(loc(1), 300.0);
        table.rebuild([(0, loc(0), 0.0, 100.0), (2, loc(0), 100.0, 100.0)]);

        assert!(table.is_lane_empty(1));
        assert_eq!(table.next_start(1, 0.0), 300.0);
        assert_eq!(table.end_edge(0), 200.0);
    }

    #[test]
    fn imbalance_measures_end_edges() {
        let mut table = LaneTable::new(3);
        table.assign(0, loc(0), 0.0, 100.0);
        table.assign(1, loc(1), 0.0, 40.0);
        assert_eq!(table.imbalance(), 60.0);
    }
}
