use std::io::Write;

use serde::Serialize;

use crate::{error::Result, slicer::SliceResult};

/// The results of slicing a series of planes, in plane order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    results: Vec<SliceResult>,
}

#[derive(Serialize)]
struct ExportedPlane {
    plane_index: usize,
    vertices: Vec<[f32; 3]>,
    edges: Vec<[usize; 2]>,
}

impl Sweep {
    pub fn new(results: Vec<SliceResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[SliceResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<SliceResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Writes the contours of every plane that hit the mesh as a JSON array.
    /// Each plane lists its vertices and the index pairs connecting them,
    /// every loop ending with an edge back to its first vertex.
    pub fn export_json<W: Write>(&self, writer: W) -> Result<()> {
        let planes = (self.results.iter().enumerate())
            .filter(|(_, result)| !result.is_empty())
            .map(|(plane_index, result)| {
                let mut vertices = Vec::new();
                let mut edges = Vec::new();

                for contour in result.contours.iter() {
                    let base = vertices.len();
                    let n = contour.len();
                    vertices.extend(contour.points().iter().map(|x| [x.x, x.y, x.z]));
                    edges.extend((0..n).map(|i| [base + i, base + (i + 1) % n]));
                }

                ExportedPlane {
                    plane_index,
                    vertices,
                    edges,
                }
            })
            .collect::<Vec<_>>();

        serde_json::to_writer_pretty(writer, &planes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::{contour::Contour, plane::Plane, Pos};

    use super::*;

    fn result(height: f32, contours: Vec<Contour>) -> SliceResult {
        SliceResult {
            plane: Plane::horizontal(height),
            contours,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn exports_non_empty_planes() {
        let triangle = Contour::new(vec![
            Pos::new(0.0, 0.0, 1.0),
            Pos::new(1.0, 0.0, 1.0),
            Pos::new(0.0, 1.0, 1.0),
        ]);
        let sweep = Sweep::new(vec![
            result(0.0, Vec::new()),
            result(1.0, vec![triangle.clone(), triangle]),
        ]);

        let mut out = Vec::new();
        sweep.export_json(&mut out).unwrap();
        let json: Value = serde_json::from_slice(&out).unwrap();

        let planes = json.as_array().unwrap();
        assert_eq!(planes.len(), 1);
        assert_eq!(planes[0]["plane_index"], 1);
        assert_eq!(planes[0]["vertices"].as_array().unwrap().len(), 6);
        assert_eq!(planes[0]["vertices"][1], serde_json::json!([1.0, 0.0, 1.0]));
        assert_eq!(
            planes[0]["edges"],
            serde_json::json!([[0, 1], [1, 2], [2, 0], [3, 4], [4, 5], [5, 3]])
        );
    }
}
