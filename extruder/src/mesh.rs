use std::collections::HashMap;

use common::Pos;

/// A triangle mesh accumulated from per-segment prisms. Faces index into
/// `vertices`; every index is valid by construction since faces are only
/// ever emitted against vertices appended in the same step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Pos>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Unit normal of the given face, or the zero vector when the face has
    /// no area.
    pub fn normal(&self, index: usize) -> Pos {
        let [a, b, c] = self.faces[index];
        let v = &self.vertices;
        let edge1 = v[c as usize] - v[b as usize];
        let edge2 = v[a as usize] - v[b as usize];
        edge1
            .cross(&edge2)
            .try_normalize(1e-12)
            .unwrap_or_else(Pos::zeros)
    }

    /// Get the minimum and maximum of each component of every vertex.
    /// These points define the bounding box of the mesh.
    pub fn bounds(&self) -> (Pos, Pos) {
        self.vertices.iter().fold(
            (
                Pos::new(f64::MAX, f64::MAX, f64::MAX),
                Pos::new(f64::MIN, f64::MIN, f64::MIN),
            ),
            |(min, max), v| {
                (
                    Pos::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z)),
                    Pos::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z)),
                )
            },
        )
    }

    /// A mesh is manifold when every edge is shared by exactly two faces.
    /// The fixed-axis extrusion emits coincident faces, so its output
    /// generally reports false; this is a diagnostic, not a guarantee.
    pub fn is_manifold(&self) -> bool {
        let mut edges = HashMap::<_, u8>::new();

        for [a, b, c] in &self.faces {
            for (a, b) in [(a, b), (b, c), (c, a)] {
                *edges.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }

        edges.values().all(|&count| count == 2)
    }
}
