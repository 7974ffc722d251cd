use crate::{mesh::Mesh, plane::Plane, Pos};

pub mod segments_1d;
pub use segments_1d::Segments1D;

/// Where on the mesh an intersection point lies. Two triangles sharing an
/// edge (or a vertex) produce points with equal provenance, which is what
/// lets their segments be joined into a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    /// Exactly on a mesh vertex.
    Vertex(u32),
    /// Somewhere along the edge between two vertices, smallest id first.
    Edge(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionPoint {
    pub position: Pos,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: IntersectionPoint,
    pub end: IntersectionPoint,
}

/// Result of cutting one triangle with a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    None,
    /// A single vertex touches the plane, the rest of the triangle is on one
    /// side of it.
    Touch(IntersectionPoint),
    Segment(Segment),
    /// The whole triangle lies in the plane.
    Coplanar,
}

impl Provenance {
    pub fn edge(a: u32, b: u32) -> Self {
        Provenance::Edge(a.min(b), a.max(b))
    }
}

impl Segment {
    /// Both ends come from the same vertex or edge.
    pub fn is_degenerate(&self) -> bool {
        self.start.provenance == self.end.provenance
    }
}

impl Intersection {
    pub fn segment(self) -> Option<Segment> {
        match self {
            Intersection::Segment(segment) => Some(segment),
            _ => None,
        }
    }
}

/// Intersects a plane with face `face` of the mesh.
pub fn intersect_face(mesh: &Mesh, face: usize, plane: &Plane, epsilon: f32) -> Intersection {
    intersect_triangle(mesh.face_verts(face), *mesh.face(face), plane, epsilon)
}

/// Intersects a plane with a triangle. `ids` are the mesh vertex ids of the
/// corners and are only used to tag the resulting points. Vertices within
/// `epsilon` of the plane are treated as lying on it.
pub fn intersect_triangle(
    verts: [Pos; 3],
    ids: [u32; 3],
    plane: &Plane,
    epsilon: f32,
) -> Intersection {
    // By taking the signed distance of every vertex we can check if each edge
    // of the triangle is crossing the plane by one end being above it and the
    // other below. Vertices close enough to the plane count as being on it.
    let dist = verts.map(|x| plane.signed_distance(&x));
    let side = dist.map(|d| {
        if d > epsilon {
            1
        } else if d < -epsilon {
            -1
        } else {
            0
        }
    });

    if side == [0, 0, 0] {
        return Intersection::Coplanar;
    }

    // At most two points can come out of this. Three would need all vertices
    // on the plane (coplanar) or a crossing edge next to two on-plane
    // vertices, which can't happen with only three vertices.
    let mut out = [None; 2];
    let mut n = 0;
    let mut push = |point: IntersectionPoint| {
        if n < out.len() {
            out[n] = Some(point);
            n += 1;
        }
    };

    for i in 0..3 {
        let j = (i + 1) % 3;

        if side[i] == 0 {
            push(IntersectionPoint {
                position: verts[i],
                provenance: Provenance::Vertex(ids[i]),
            });
        }

        if side[i] * side[j] < 0 {
            // Always interpolate from the lower vertex id so both triangles
            // sharing this edge compute the exact same point.
            let (a, b) = if ids[i] <= ids[j] { (i, j) } else { (j, i) };
            let t = -dist[a] / (dist[b] - dist[a]);
            push(IntersectionPoint {
                position: verts[a] + t * (verts[b] - verts[a]),
                provenance: Provenance::edge(ids[i], ids[j]),
            });
        }
    }

    match out {
        [Some(start), Some(end)] => Intersection::Segment(Segment { start, end }),
        [Some(point), None] => Intersection::Touch(point),
        _ => Intersection::None,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const IDS: [u32; 3] = [10, 11, 12];

    fn triangle(z: [f32; 3]) -> [Pos; 3] {
        [
            Pos::new(0.0, 0.0, z[0]),
            Pos::new(1.0, 0.0, z[1]),
            Pos::new(0.0, 1.0, z[2]),
        ]
    }

    fn slice(z: [f32; 3], height: f32) -> Intersection {
        intersect_triangle(triangle(z), IDS, &Plane::horizontal(height), 1e-6)
    }

    #[test]
    fn crossing_two_edges() {
        let Intersection::Segment(segment) = slice([0.0, 1.0, 1.0], 0.5) else {
            panic!("expected a segment");
        };

        assert_eq!(segment.start.provenance, Provenance::Edge(10, 11));
        assert_eq!(segment.end.provenance, Provenance::Edge(10, 12));
        assert_relative_eq!(segment.start.position, Pos::new(0.5, 0.0, 0.5));
        assert_relative_eq!(segment.end.position, Pos::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn clear_miss() {
        assert_eq!(slice([0.0, 1.0, 1.0], 2.0), Intersection::None);
        assert_eq!(slice([0.0, 1.0, 1.0], -0.5), Intersection::None);
    }

    #[test]
    fn vertex_on_plane_with_opposite_edge_crossing() {
        let Intersection::Segment(segment) = slice([0.0, 1.0, -1.0], 0.0) else {
            panic!("expected a segment");
        };

        assert_eq!(segment.start.provenance, Provenance::Vertex(10));
        assert_eq!(segment.end.provenance, Provenance::Edge(11, 12));
        assert_relative_eq!(segment.end.position, Pos::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn single_vertex_touch() {
        let Intersection::Touch(point) = slice([0.0, 1.0, 2.0], 0.0) else {
            panic!("expected a touching point");
        };
        assert_eq!(point.provenance, Provenance::Vertex(10));
    }

    #[test]
    fn edge_in_plane() {
        let Intersection::Segment(segment) = slice([0.0, 0.0, 1.0], 0.0) else {
            panic!("expected a segment");
        };

        assert_eq!(segment.start.provenance, Provenance::Vertex(10));
        assert_eq!(segment.end.provenance, Provenance::Vertex(11));
    }

    #[test]
    fn coplanar_triangle() {
        assert_eq!(slice([1.0, 1.0, 1.0], 1.0), Intersection::Coplanar);
        // Within tolerance still counts
        assert_eq!(slice([1.0, 1.0 + 1e-7, 1.0], 1.0), Intersection::Coplanar);
    }

    #[test]
    fn shared_edge_points_match() {
        let plane = Plane::new(Pos::new(0.0, 0.0, 0.3), Pos::new(0.1, 0.2, 1.0)).unwrap();
        let a = Pos::new(0.0, 0.0, 0.0);
        let b = Pos::new(0.3, 0.7, 1.0);

        let first = intersect_triangle([a, b, Pos::new(1.0, 0.0, 0.0)], [0, 1, 2], &plane, 0.0);
        let second = intersect_triangle([b, a, Pos::new(0.0, 1.0, 0.0)], [1, 0, 3], &plane, 0.0);

        let on_edge = |x: Intersection| {
            let segment = x.segment().unwrap();
            [segment.start, segment.end]
                .into_iter()
                .find(|x| x.provenance == Provenance::Edge(0, 1))
                .unwrap()
                .position
        };

        assert_eq!(on_edge(first), on_edge(second));
    }
}
