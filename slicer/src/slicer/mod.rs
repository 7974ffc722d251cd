use common::{config::SliceConfig, progress::Progress};
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info};

use crate::{
    contour::{Assembly, Contour, ContourAssembler, SliceWarning},
    error::Result,
    intersection::{intersect_face, Segment, Segments1D},
    mesh::Mesh,
    plane::Plane,
};

mod sweep;
pub use sweep::Sweep;

/// Used to cut a mesh with planes.
#[derive(Default)]
pub struct Slicer {
    mesh: Mesh,
    config: SliceConfig,
    progress: Progress,
}

/// The cross section of a mesh with one plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceResult {
    pub plane: Plane,
    pub contours: Vec<Contour>,
    pub warnings: Vec<SliceWarning>,
}

impl Slicer {
    /// Creates a new slicer. The mesh is only checked once it gets sliced.
    pub fn new(mesh: Mesh, config: SliceConfig) -> Self {
        Self {
            mesh,
            config,
            progress: Progress::new(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = mesh;
    }

    pub fn config(&self) -> &SliceConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SliceConfig) {
        self.config = config;
    }

    /// Gets an instance of the slicing [`Progress`] struct. It counts planes
    /// while [`Slicer::slice_planes`] or [`Slicer::slice_between`] run.
    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    /// Absolute distance under which a vertex is considered to be on a plane.
    pub fn epsilon(&self) -> f32 {
        self.config.tolerance.resolve(self.mesh.diagonal())
    }

    /// Cuts the mesh with a single plane. An empty result means the plane
    /// missed the mesh.
    pub fn slice(&self, plane: &Plane) -> Result<SliceResult> {
        self.mesh.validate()?;

        let epsilon = self.epsilon();
        let segments = self.intersect(plane, epsilon);
        Ok(self.assemble(plane, &segments, epsilon))
    }

    /// Slices every plane, returning the results in the same order. If all
    /// the planes are parallel, faces are first sorted into buckets along the
    /// shared normal so each plane only looks at faces near it.
    pub fn slice_planes(&self, planes: &[Plane]) -> Result<Vec<SliceResult>> {
        self.mesh.validate()?;

        let epsilon = self.epsilon();
        let index = self.sweep_index(planes, epsilon);
        self.progress.reset(planes.len() as u64);

        let slice = |plane: &Plane| {
            let segments = match &index {
                Some(index) => index.intersect_plane(&self.mesh, plane, epsilon),
                None => self.intersect(plane, epsilon),
            };

            let result = self.assemble(plane, &segments, epsilon);
            self.progress.add_complete(1);
            result
        };

        let results = if self.config.parallel {
            planes.par_iter().map(slice).collect::<Vec<_>>()
        } else {
            planes.iter().map(slice).collect::<Vec<_>>()
        };

        self.progress.set_finished();
        info!(
            "Sliced {} planes{}, found {} contours",
            planes.len(),
            if index.is_some() { " (bucketed)" } else { "" },
            results.iter().map(|x| x.contours.len()).sum::<usize>()
        );

        Ok(results)
    }

    /// Sweeps `count` planes from `start` to `end`, interpolating their
    /// origins and normals. When more than two planes are generated the
    /// `start` and `end` planes themselves are left out.
    pub fn slice_between(&self, start: &Plane, end: &Plane, count: usize) -> Result<Sweep> {
        let mut planes = Plane::interpolate(start, end, count)?;
        if planes.len() > 2 {
            planes.pop();
            planes.remove(0);
        }

        Ok(Sweep::new(self.slice_planes(&planes)?))
    }

    fn intersect(&self, plane: &Plane, epsilon: f32) -> Vec<Segment> {
        let faces = 0..self.mesh.face_count();
        let segment = |face| intersect_face(&self.mesh, face, plane, epsilon).segment();

        if self.config.parallel {
            faces.into_par_iter().filter_map(segment).collect()
        } else {
            faces.filter_map(segment).collect()
        }
    }

    fn assemble(&self, plane: &Plane, segments: &[Segment], epsilon: f32) -> SliceResult {
        let Assembly { contours, warnings } =
            ContourAssembler::new(epsilon, &self.config).assemble(segments);

        debug!(
            "Sliced {} faces at {:?}: {} segments, {} contours, {} warnings",
            self.mesh.face_count(),
            plane.origin(),
            segments.len(),
            contours.len(),
            warnings.len()
        );

        SliceResult {
            plane: *plane,
            contours,
            warnings,
        }
    }

    fn sweep_index(&self, planes: &[Plane], epsilon: f32) -> Option<Segments1D> {
        let normal = planes.first()?.normal();
        let parallel = planes.iter().all(|x| (x.normal() - normal).magnitude() <= 1e-6);
        (planes.len() > 1 && parallel).then(|| {
            Segments1D::from_mesh(&self.mesh, normal, self.config.sweep_buckets, epsilon)
        })
    }
}

impl SliceResult {
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}
