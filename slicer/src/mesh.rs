use std::{
    collections::HashMap,
    io::{BufReader, Read, Seek},
    sync::Arc,
};

use nalgebra::Vector3;
use tracing::trace;

use crate::{
    error::{Error, Precondition, Result},
    Pos,
};

/// A mesh made of vertices and triangular faces. The buffers are shared, so
/// cloning a mesh is cheap and a clone can never observe a later edit.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    inner: Arc<MeshInner>,
}

#[derive(Debug, Default)]
struct MeshInner {
    vertices: Box<[Pos]>,
    faces: Box<[[u32; 3]]>,
}

impl Mesh {
    /// Creates a new mesh from the given vertices and faces. Face indices are
    /// not checked here, see [`Mesh::validate`].
    pub fn new(vertices: Vec<Pos>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            inner: Arc::new(MeshInner {
                vertices: vertices.into_boxed_slice(),
                faces: faces.into_boxed_slice(),
            }),
        }
    }

    /// Creates a mesh from arbitrary polygons, splitting each one into a
    /// triangle fan around its first vertex. Polygons with fewer than three
    /// vertices are skipped.
    pub fn from_polygons(vertices: Vec<Pos>, polygons: &[Vec<u32>]) -> Self {
        let mut faces = Vec::with_capacity(polygons.len() * 2);
        for (idx, polygon) in polygons.iter().enumerate() {
            if polygon.len() < 3 {
                trace!("Skipping polygon {idx} with {} vertices", polygon.len());
                continue;
            }

            let first = polygon[0];
            for pair in polygon[1..].windows(2) {
                faces.push([first, pair[0], pair[1]]);
            }
        }

        Self::new(vertices, faces)
    }

    pub fn vertices(&self) -> &[Pos] {
        self.inner.vertices.as_ref()
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        self.inner.faces.as_ref()
    }

    pub fn face(&self, index: usize) -> &[u32; 3] {
        &self.faces()[index]
    }

    /// Positions of the three corners of a face. Panics if the face
    /// references a vertex that doesn't exist, so only call this on a
    /// validated mesh.
    pub fn face_verts(&self, index: usize) -> [Pos; 3] {
        let vertices = self.vertices();
        self.face(index).map(|vertex| vertices[vertex as usize])
    }

    pub fn normal(&self, index: usize) -> Pos {
        let [v0, v1, v2] = self.face_verts(index);
        (v1 - v0).cross(&(v2 - v0)).normalize()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn face_count(&self) -> usize {
        self.faces().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices().is_empty() || self.faces().is_empty()
    }

    /// Checks that the mesh has something to slice and that every face index
    /// points at an existing vertex.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Precondition::EmptyMesh.into());
        }

        let vertex_count = self.vertex_count();
        for (face, indices) in self.faces().iter().enumerate() {
            if let Some(&vertex) = indices.iter().find(|&&x| x as usize >= vertex_count) {
                return Err(Precondition::FaceIndexOutOfRange {
                    face,
                    vertex,
                    vertex_count,
                }
                .into());
            }
        }

        Ok(())
    }

    /// A mesh is manifold (watertight) when every edge is shared by exactly
    /// two faces.
    pub fn is_manifold(&self) -> bool {
        let mut edges = HashMap::<_, u8>::new();

        for [a, b, c] in self.faces() {
            for (a, b) in [(a, b), (b, c), (c, a)] {
                let count = edges.entry((a.min(b), a.max(b))).or_default();
                *count = count.saturating_add(1);
            }
        }

        edges.values().all(|&count| count == 2)
    }

    /// Get the minimum and maximum of each component of every vertex in the
    /// model. These points define the bounding box of the model.
    pub fn bounds(&self) -> (Pos, Pos) {
        vertex_bounds(self.vertices())
    }

    /// Length of the bounding box diagonal, zero for a mesh without vertices.
    pub fn diagonal(&self) -> f32 {
        if self.vertices().is_empty() {
            return 0.0;
        }

        let (min, max) = self.bounds();
        (max - min).magnitude()
    }
}

/// Loads a mesh from a reader. Supported formats are `stl` (ascii or binary)
/// and `obj`.
pub fn load_mesh<T: Read + Seek>(mut reader: T, format: &str) -> Result<Mesh> {
    match format.to_ascii_lowercase().as_str() {
        "stl" => {
            let stl = stl_io::read_stl(&mut reader)?;
            let vertices = (stl.vertices.iter())
                .map(|v| Vector3::new(v[0], v[1], v[2]))
                .collect();
            let faces = (stl.faces.iter())
                .map(|face| face.vertices.map(|x| x as u32))
                .collect();
            Ok(Mesh::new(vertices, faces))
        }
        "obj" => {
            let obj: obj::Obj<obj::Position, u32> = obj::load_obj(BufReader::new(reader))
                .map_err(|err| Error::Parse(err.to_string()))?;
            let vertices = (obj.vertices.iter())
                .map(|v| Vector3::from(v.position))
                .collect();
            let faces = (obj.indices.chunks_exact(3))
                .map(|x| [x[0], x[1], x[2]])
                .collect();
            Ok(Mesh::new(vertices, faces))
        }
        _ => Err(Error::Format(format.to_owned())),
    }
}

fn vertex_bounds(vertices: &[Pos]) -> (Pos, Pos) {
    vertices.iter().fold(
        (Pos::repeat(f32::MAX), Pos::repeat(f32::MIN)),
        |(min, max), v| (min.inf(v), max.sup(v)),
    )
}
