//! Stitching the unordered segments of one plane into closed loops.
//!
//! Every segment end is tagged with the mesh edge or vertex it lies on, so
//! segments coming from neighbouring triangles share an end. Treating those
//! tags as graph nodes and the segments as graph edges, each connected
//! component of a watertight mesh's cross section is a cycle.

use std::collections::{HashMap, HashSet};

use common::config::{OpenChainPolicy, SliceConfig};
use nalgebra::Vector2;
use tracing::{trace, warn};

use crate::{
    intersection::{IntersectionPoint, Provenance, Segment},
    plane::Plane,
    Pos,
};

/// A closed polygon. The last point connects back to the first, it is not
/// repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Pos>,
}

/// Non-fatal problems found while assembling contours.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceWarning {
    /// A chain of segments that didn't close into a loop, usually from a hole
    /// in the mesh.
    OpenChain { start: Pos, end: Pos, points: usize },
    /// A loop that collapsed to fewer than three distinct points.
    Degenerate { points: usize },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Assembly {
    pub contours: Vec<Contour>,
    pub warnings: Vec<SliceWarning>,
}

pub struct ContourAssembler {
    epsilon: f32,
    open_chains: OpenChainPolicy,
    merge_collinear: bool,
}

/// Segment graph with nodes numbered in the order they were first seen.
struct Graph {
    positions: Vec<Pos>,
    edges: Vec<[usize; 2]>,
    incident: Vec<Vec<usize>>,
}

impl Contour {
    pub fn new(points: Vec<Pos>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Pos] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Pos> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over every side of the polygon, including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = (Pos, Pos)> + '_ {
        let next = self.points.iter().cycle().skip(1);
        self.points.iter().copied().zip(next.copied())
    }

    pub fn perimeter(&self) -> f32 {
        self.edges().map(|(a, b)| (b - a).magnitude()).sum()
    }

    /// The points in the plane's own 2D coordinate system.
    pub fn to_local(&self, plane: &Plane) -> Vec<Vector2<f32>> {
        self.points.iter().map(|x| plane.project(x)).collect()
    }

    /// Area enclosed by the contour, positive if it winds counterclockwise
    /// when looking down the plane's normal.
    pub fn signed_area(&self, plane: &Plane) -> f32 {
        let local = self.to_local(plane);
        let next = local.iter().cycle().skip(1);
        let twice = (local.iter().zip(next))
            .map(|(a, b)| a.x * b.y - b.x * a.y)
            .sum::<f32>();
        twice / 2.0
    }
}

impl ContourAssembler {
    pub fn new(epsilon: f32, config: &SliceConfig) -> Self {
        Self {
            epsilon,
            open_chains: config.open_chains,
            merge_collinear: config.merge_collinear,
        }
    }

    /// Joins segments into contours. The output only depends on the order
    /// of the input, so the same segments always give the same contours.
    pub fn assemble(&self, segments: &[Segment]) -> Assembly {
        let graph = Graph::build(segments);
        let mut used = vec![false; graph.edges.len()];
        let mut out = Assembly::default();

        for seed in 0..graph.edges.len() {
            if used[seed] {
                continue;
            }

            used[seed] = true;
            let [first, second] = graph.edges[seed];

            let mut chain = vec![first, second];
            let closed = graph.walk(second, Some(first), &mut used, &mut chain);

            if !closed {
                let mut before = Vec::new();
                graph.walk(first, None, &mut used, &mut before);
                before.reverse();
                before.extend(chain);
                chain = before;
            }

            let points = chain.iter().map(|&x| graph.positions[x]).collect::<Vec<_>>();
            if !closed && !self.snap_close(&points) {
                let (start, end) = (points[0], points[points.len() - 1]);
                warn!(
                    "Discarding open contour chain of {} points from {start:?} to {end:?}",
                    points.len()
                );
                out.warnings.push(SliceWarning::OpenChain {
                    start,
                    end,
                    points: points.len(),
                });
                continue;
            }

            let cleaned = self.clean(points);
            if cleaned.len() < 3 {
                trace!("Discarding degenerate contour of {} points", cleaned.len());
                out.warnings.push(SliceWarning::Degenerate {
                    points: cleaned.len(),
                });
                continue;
            }

            out.contours.push(Contour::new(cleaned));
        }

        out
    }

    fn snap_close(&self, points: &[Pos]) -> bool {
        let (start, end) = (points[0], points[points.len() - 1]);
        self.open_chains == OpenChainPolicy::SnapClose && (end - start).magnitude() <= self.epsilon
    }

    /// Removes repeated points and, if enabled, points in the middle of a
    /// straight run. The loop is treated as closed, so the last point is
    /// also compared against the first.
    fn clean(&self, points: Vec<Pos>) -> Vec<Pos> {
        let mut out = Vec::with_capacity(points.len());
        for point in points {
            self.push_point(&mut out, point);
        }

        while out.len() >= 3 {
            let n = out.len();
            if self.coincident(out[n - 1], out[0]) || self.redundant(out[n - 2], out[n - 1], out[0])
            {
                out.pop();
            } else if self.redundant(out[n - 1], out[0], out[1]) {
                out.remove(0);
            } else {
                break;
            }
        }

        out
    }

    fn push_point(&self, out: &mut Vec<Pos>, point: Pos) {
        loop {
            let n = out.len();
            if n >= 1 && self.coincident(out[n - 1], point) {
                return;
            }

            if n >= 2 && self.redundant(out[n - 2], out[n - 1], point) {
                out.pop();
                continue;
            }

            break;
        }

        out.push(point);
    }

    fn coincident(&self, a: Pos, b: Pos) -> bool {
        (b - a).magnitude() <= self.epsilon
    }

    /// Checks if `b` can be dropped from `a -> b -> c` without changing the
    /// shape by more than epsilon.
    fn redundant(&self, a: Pos, b: Pos, c: Pos) -> bool {
        if !self.merge_collinear {
            return false;
        }

        let ac = c - a;
        let length = ac.magnitude();
        if length <= self.epsilon {
            return true;
        }

        (b - a).cross(&ac).magnitude() / length <= self.epsilon
    }
}

impl Graph {
    fn build(segments: &[Segment]) -> Self {
        let mut nodes = HashMap::<Provenance, usize>::new();
        let mut positions = Vec::new();
        let mut node = |point: &IntersectionPoint| {
            *nodes.entry(point.provenance).or_insert_with(|| {
                positions.push(point.position);
                positions.len() - 1
            })
        };

        // An edge lying in the plane is reported by both faces next to it,
        // so segments are de-duplicated on their (unordered) end nodes.
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for segment in segments.iter().filter(|x| !x.is_degenerate()) {
            let (a, b) = (node(&segment.start), node(&segment.end));
            if seen.insert((a.min(b), a.max(b))) {
                edges.push([a, b]);
            }
        }

        let mut incident = vec![Vec::new(); positions.len()];
        for (idx, &[a, b]) in edges.iter().enumerate() {
            incident[a].push(idx);
            incident[b].push(idx);
        }

        Self {
            positions,
            edges,
            incident,
        }
    }

    /// Follows unused edges from `from`, pushing every node reached onto
    /// `chain`. Returns true once it gets back to `stop`, which isn't pushed.
    fn walk(
        &self,
        from: usize,
        stop: Option<usize>,
        used: &mut [bool],
        chain: &mut Vec<usize>,
    ) -> bool {
        let mut current = from;
        loop {
            let Some(&edge) = self.incident[current].iter().find(|&&x| !used[x]) else {
                return false;
            };

            used[edge] = true;
            let [a, b] = self.edges[edge];
            current = if a == current { b } else { a };

            if Some(current) == stop {
                return true;
            }

            chain.push(current);
        }
    }
}
