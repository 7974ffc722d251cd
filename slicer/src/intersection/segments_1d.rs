use crate::{
    intersection::{intersect_face, Segment},
    mesh::Mesh,
    plane::Plane,
    Pos,
};

/// Acceleration structure for slicing a mesh with many parallel planes. By
/// splitting the mesh into segments along the shared normal and adding
/// references to all the triangles that overlap each segment, slicing a plane
/// doesn't need to loop through every triangle in the mesh.
pub struct Segments1D {
    normal: Pos,
    start: f32,
    layer_height: f32,

    layers: Vec<Vec<usize>>,
}

impl Segments1D {
    /// Creates a new Segments structure for planes facing `normal` (which
    /// must be a unit vector). Faces within `epsilon` of a segment are added
    /// to it too.
    pub fn from_mesh(mesh: &Mesh, normal: Pos, layer_count: usize, epsilon: f32) -> Self {
        // Caching the projected vertices makes building faster.
        let heights = (mesh.vertices().iter())
            .map(|x| normal.dot(x))
            .collect::<Vec<_>>();

        let (min, max) = heights
            .iter()
            .fold((f32::MAX, f32::MIN), |(min, max), &x| (min.min(x), max.max(x)));

        let layer_count = layer_count.max(1);
        let layer_height = (max - min) / layer_count as f32;
        let mut out = Self {
            normal,
            start: min,
            layer_height,
            layers: vec![Vec::new(); layer_count + 1],
        };

        // Adds the index of each face into all of the segments it covers,
        // with an extra segment of slack on each side to absorb rounding.
        for (face, indices) in mesh.faces().iter().enumerate() {
            let [a, b, c] = indices.map(|x| heights.get(x as usize).copied().unwrap_or(0.0));
            let min_layer = out.layer(a.min(b).min(c) - epsilon).saturating_sub(1);
            let max_layer = out.layer(a.max(b).max(c) + epsilon) + 1;

            for layer in out.layers.iter_mut().take(max_layer + 1).skip(min_layer) {
                layer.push(face);
            }
        }

        out
    }

    pub fn normal(&self) -> Pos {
        self.normal
    }

    /// Checks if this structure can be used to slice with the given plane.
    pub fn supports(&self, plane: &Plane) -> bool {
        (plane.normal() - self.normal).magnitude() <= 1e-6
    }

    /// Faces that could intersect the plane, in ascending order.
    pub fn candidates(&self, plane: &Plane) -> &[usize] {
        let height = self.normal.dot(&plane.origin());
        &self.layers[self.layer(height)]
    }

    /// Intersects a plane with the mesh this Segments instance was built
    /// with. The output is exactly what checking every face would give.
    pub fn intersect_plane(&self, mesh: &Mesh, plane: &Plane, epsilon: f32) -> Vec<Segment> {
        debug_assert!(self.supports(plane));

        (self.candidates(plane).iter())
            .filter_map(|&face| intersect_face(mesh, face, plane, epsilon).segment())
            .collect()
    }

    fn layer(&self, height: f32) -> usize {
        let last = self.layers.len() - 1;
        if self.layer_height.is_nan() || self.layer_height <= 0.0 || height.is_nan() {
            return 0;
        }

        let layer = ((height - self.start) / self.layer_height).floor();
        layer.clamp(0.0, last as f32) as usize
    }
}
