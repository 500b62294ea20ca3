use common::Pos;
use rayon::prelude::*;
use tracing::debug;

use crate::{mesh::Mesh, segments::Segment};

pub const VERTICES_PER_SEGMENT: usize = 4;
pub const FACES_PER_SEGMENT: usize = 6;

/// Cross-section parameters for the prism swept around each segment.
///
/// The cross section is always offset along the world X axis and extruded up
/// along world Z, no matter which way the segment travels. It is not
/// oriented perpendicular to the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeConfig {
    /// Half width of the rectangular cross section in mm, offset along X.
    pub half_width: f64,
    /// Height of the deposited layer in mm, extruded along Z.
    pub layer_height: f64,
}

impl Default for ExtrudeConfig {
    fn default() -> Self {
        Self {
            half_width: 0.2,
            layer_height: 0.2,
        }
    }
}

/// Extrudes every segment into four vertices and six faces, appended in
/// segment order. Segment `k` owns vertex indices `4k..4k+4` and references
/// nothing outside them, so the output is always exactly `4S` vertices and
/// `6S` faces, zero-length segments included.
pub fn extrude_segments(segments: &[Segment], config: &ExtrudeConfig) -> Mesh {
    debug!("Extruding {} segments", segments.len());

    let offset = Pos::new(config.half_width, 0.0, 0.0);
    let lift = Pos::new(0.0, 0.0, config.layer_height);

    // Per-segment geometry is independent, generate in parallel and
    // concatenate in input order.
    let prisms = segments
        .par_iter()
        .enumerate()
        .map(|(index, segment)| prism(segment, index, offset, lift))
        .collect::<Vec<_>>();

    let mut mesh = Mesh::with_capacity(
        segments.len() * VERTICES_PER_SEGMENT,
        segments.len() * FACES_PER_SEGMENT,
    );
    for (vertices, faces) in prisms {
        mesh.vertices.extend(vertices);
        mesh.faces.extend(faces);
    }

    mesh
}

fn prism(
    segment: &Segment,
    index: usize,
    offset: Pos,
    lift: Pos,
) -> ([Pos; VERTICES_PER_SEGMENT], [[u32; 3]; FACES_PER_SEGMENT]) {
    let start = segment.start.position;
    let end = segment.end.position;

    let bottom_start = start - offset;
    let bottom_end = end - offset;
    let top_end = end + offset + lift;
    let top_start = start + offset + lift;

    let b = (index * VERTICES_PER_SEGMENT) as u32;
    (
        [bottom_start, bottom_end, top_end, top_start],
        [
            [b, b + 1, b + 2],
            [b, b + 2, b + 3],
            [b, b + 3, b + 2],
            [b, b + 2, b + 1],
            [b, b + 1, b + 2],
            [b, b + 2, b + 3],
        ],
    )
}

#[cfg(test)]
mod tests {
    use common::Pos;
    use gcode_format::Waypoint;

    use super::{extrude_segments, ExtrudeConfig, FACES_PER_SEGMENT, VERTICES_PER_SEGMENT};
    use crate::segments::{segments_between, Segment};

    fn waypoint(x: f64, y: f64, z: f64) -> Waypoint {
        Waypoint {
            position: Pos::new(x, y, z),
            deposition: 0.0,
        }
    }

    fn segment(start: Waypoint, end: Waypoint) -> Segment {
        Segment { start, end }
    }

    #[test]
    fn single_segment_corners() {
        let segments = [segment(waypoint(0.0, 0.0, 0.0), waypoint(10.0, 0.0, 0.0))];
        let mesh = extrude_segments(&segments, &ExtrudeConfig::default());

        assert_eq!(
            mesh.vertices,
            vec![
                Pos::new(-0.2, 0.0, 0.0), // bottom start
                Pos::new(9.8, 0.0, 0.0),  // bottom end
                Pos::new(10.2, 0.0, 0.2), // top end
                Pos::new(0.2, 0.0, 0.2),  // top start
            ]
        );
        assert_eq!(mesh.faces.len(), FACES_PER_SEGMENT);
    }

    #[test]
    fn counts_scale_with_segments() {
        let waypoints = [
            waypoint(10.0, 0.0, 0.2),
            waypoint(20.0, 0.0, 0.2),
            waypoint(20.0, 10.0, 0.4),
        ];
        let segments = segments_between(&waypoints);
        let mesh = extrude_segments(&segments, &ExtrudeConfig::default());

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
    }

    #[test]
    fn faces_stay_inside_their_segment() {
        let waypoints = [
            waypoint(0.0, 0.0, 0.0),
            waypoint(1.0, 0.0, 0.0),
            waypoint(1.0, 1.0, 0.0),
            waypoint(2.0, 1.0, 0.5),
        ];
        let segments = segments_between(&waypoints);
        let mesh = extrude_segments(&segments, &ExtrudeConfig::default());

        for (k, faces) in mesh.faces.chunks(FACES_PER_SEGMENT).enumerate() {
            let base = (k * VERTICES_PER_SEGMENT) as u32;
            let mut referenced = [false; VERTICES_PER_SEGMENT];
            for face in faces {
                for &index in face {
                    assert!((base..base + 4).contains(&index));
                    referenced[(index - base) as usize] = true;
                }
            }
            assert_eq!(referenced, [true; VERTICES_PER_SEGMENT]);
        }
    }

    #[test]
    fn degenerate_segment_still_emits_geometry() {
        let point = waypoint(1.0, 2.0, 3.0);
        let mesh = extrude_segments(&[segment(point, point)], &ExtrudeConfig::default());

        assert_eq!(mesh.vertex_count(), VERTICES_PER_SEGMENT);
        assert_eq!(mesh.face_count(), FACES_PER_SEGMENT);
        assert_eq!(mesh.vertices[0], mesh.vertices[1]);
        assert_eq!(mesh.vertices[2], mesh.vertices[3]);
    }

    #[test]
    fn no_segments_no_geometry() {
        let mesh = extrude_segments(&[], &ExtrudeConfig::default());

        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn output_is_deterministic() {
        let waypoints = (0..64)
            .map(|i| waypoint(i as f64, (i % 7) as f64, (i / 8) as f64 * 0.2))
            .collect::<Vec<_>>();
        let segments = segments_between(&waypoints);

        let config = ExtrudeConfig::default();
        assert_eq!(
            extrude_segments(&segments, &config),
            extrude_segments(&segments, &config)
        );
    }
}
