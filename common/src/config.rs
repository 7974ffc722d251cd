use serde::{Deserialize, Serialize};

/// Number of buckets [`SliceConfig::sweep_buckets`] defaults to.
pub const DEFAULT_SWEEP_BUCKETS: usize = 100;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SliceConfig {
    /// How close to a plane a vertex has to be to count as lying on it. Also
    /// used when snapping open chains shut and de-duplicating contour points.
    pub tolerance: Tolerance,
    /// What to do with chains of segments that don't close into a loop.
    pub open_chains: OpenChainPolicy,
    /// Drop contour points that lie on the line between their neighbours.
    pub merge_collinear: bool,
    /// Intersect faces and planes on the rayon thread pool.
    pub parallel: bool,
    /// Bucket count of the acceleration structure used when sweeping many
    /// parallel planes through a mesh.
    pub sweep_buckets: usize,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum Tolerance {
    /// Fraction of the mesh's bounding box diagonal.
    Relative(f32),
    /// Fixed distance in model units.
    Absolute(f32),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OpenChainPolicy {
    /// Keep a chain if its two ends are within tolerance of each other,
    /// closing it. Otherwise it is discarded.
    #[default]
    SnapClose,
    /// Always discard chains that didn't close on their own.
    Discard,
}

impl Tolerance {
    /// Resolves the tolerance to an absolute distance for a mesh with the
    /// given bounding box diagonal.
    pub fn resolve(&self, diagonal: f32) -> f32 {
        match *self {
            Tolerance::Relative(fraction) => (diagonal * fraction).abs(),
            Tolerance::Absolute(distance) => distance.abs(),
        }
    }
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            open_chains: OpenChainPolicy::SnapClose,
            merge_collinear: true,
            parallel: true,
            sweep_buckets: DEFAULT_SWEEP_BUCKETS,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Relative(1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_tolerance_scales_with_diagonal() {
        let tolerance = Tolerance::default();
        assert_eq!(tolerance.resolve(0.0), 0.0);
        assert!((tolerance.resolve(2.0) - 2e-6).abs() < 1e-12);
        assert_eq!(Tolerance::Absolute(-0.25).resolve(100.0), 0.25);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: SliceConfig =
            serde_json::from_str(r#"{ "merge_collinear": false }"#).unwrap();
        assert!(!config.merge_collinear);
        assert_eq!(config.tolerance, Tolerance::Relative(1e-6));
        assert_eq!(config.open_chains, OpenChainPolicy::SnapClose);
        assert_eq!(config.sweep_buckets, DEFAULT_SWEEP_BUCKETS);

        let json = serde_json::to_string(&SliceConfig::default()).unwrap();
        let back: SliceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SliceConfig::default());
    }
}
