#![allow(dead_code)]

use std::f32::consts::{PI, TAU};

use slicer::{mesh::Mesh, Pos};

/// Faces of a unit cube with vertices 0..4 at z = 0 and 4..8 at z = 1.
pub const CUBE_FACES: [[u32; 3]; 12] = [
    // bottom
    [0, 1, 2],
    [0, 2, 3],
    // top
    [4, 6, 5],
    [4, 7, 6],
    // front
    [0, 4, 1],
    [1, 4, 5],
    // back
    [2, 6, 3],
    [3, 6, 7],
    // left
    [0, 3, 4],
    [3, 7, 4],
    // right
    [1, 5, 2],
    [2, 5, 6],
];

pub fn cube_vertices(offset: Pos) -> Vec<Pos> {
    [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Pos::new(x, y, z) + offset)
    .collect()
}

pub fn cube() -> Mesh {
    Mesh::new(cube_vertices(Pos::zeros()), CUBE_FACES.to_vec())
}

/// Unit cubes at each offset, merged into one mesh.
pub fn cubes(offsets: &[Pos]) -> Mesh {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    for &offset in offsets {
        let base = vertices.len() as u32;
        vertices.extend(cube_vertices(offset));
        faces.extend(CUBE_FACES.map(|face| face.map(|x| x + base)));
    }

    Mesh::new(vertices, faces)
}

/// Watertight unit sphere made of `rings` bands of `segments` quads, with a
/// triangle fan at each pole.
pub fn sphere(rings: u32, segments: u32) -> Mesh {
    let mut vertices = vec![Pos::z()];
    for ring in 1..rings {
        let phi = PI * ring as f32 / rings as f32;
        for segment in 0..segments {
            let theta = TAU * segment as f32 / segments as f32;
            vertices.push(Pos::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            ));
        }
    }

    vertices.push(-Pos::z());
    let south = vertices.len() as u32 - 1;
    let idx = |ring: u32, segment: u32| 1 + (ring - 1) * segments + segment % segments;

    let mut faces = Vec::new();
    for segment in 0..segments {
        faces.push([0, idx(1, segment), idx(1, segment + 1)]);
        faces.push([south, idx(rings - 1, segment + 1), idx(rings - 1, segment)]);
    }

    for ring in 1..rings - 1 {
        for segment in 0..segments {
            let (a, b) = (idx(ring, segment), idx(ring, segment + 1));
            let (c, d) = (idx(ring + 1, segment), idx(ring + 1, segment + 1));
            faces.push([a, c, b]);
            faces.push([b, c, d]);
        }
    }

    Mesh::new(vertices, faces)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
