use gcode_format::Waypoint;
use itertools::Itertools;

/// Straight-line travel between two consecutive waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Waypoint,
    pub end: Waypoint,
}

impl Segment {
    /// Zero-length travel. Degenerate segments are kept through the whole
    /// pipeline so segment and geometry counts stay in lockstep.
    pub fn is_degenerate(&self) -> bool {
        self.start.position == self.end.position
    }

    /// The higher of the two endpoints.
    pub fn max_height(&self) -> f64 {
        self.start.position.z.max(self.end.position.z)
    }
}

/// Pairs consecutive waypoints into directed segments, in travel order.
/// Fewer than two waypoints yield no segments.
pub fn segments_between(waypoints: &[Waypoint]) -> Vec<Segment> {
    waypoints
        .iter()
        .copied()
        .tuple_windows()
        .map(|(start, end)| Segment { start, end })
        .collect()
}
