use std::io;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("precondition violated: {0}")]
    Precondition(#[from] Precondition),
    #[error("degenerate input: {0}")]
    Degenerate(#[from] Degenerate),
    #[error("compute backend `{backend}` failed: {message}")]
    Backend { backend: String, message: String },
    #[error("unsupported mesh format `{0}`")]
    Format(String),
    #[error("failed to parse mesh: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Inputs with the wrong shape. These are caller errors and are never
/// silently coerced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Precondition {
    #[error("mesh has no vertices or no faces")]
    EmptyMesh,
    #[error("face {face} references vertex {vertex}, but the mesh only has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        vertex: u32,
        vertex_count: usize,
    },
    #[error("matrices cannot be empty")]
    EmptyMatrix,
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("can't multiply matrices of shape {lhs:?} and {rhs:?}")]
    DimensionMismatch {
        lhs: (usize, usize),
        rhs: (usize, usize),
    },
    #[error("vector lengths must match ({0} vs {1})")]
    VectorLengthMismatch(usize, usize),
    #[error("cross product requires 3D vectors, got lengths {0} and {1}")]
    NotThreeDimensional(usize, usize),
    #[error("matrix must be square, got {0}x{1}")]
    NotSquare(usize, usize),
}

/// Inputs with a valid shape but a meaningless value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Degenerate {
    #[error("plane normal is too short to normalize (length {0})")]
    ZeroNormal(f32),
    #[error("matrix size must be positive")]
    ZeroSizeMatrix,
}

impl Error {
    pub fn precondition(&self) -> Option<&Precondition> {
        match self {
            Error::Precondition(precondition) => Some(precondition),
            _ => None,
        }
    }

    pub fn degenerate(&self) -> Option<&Degenerate> {
        match self {
            Error::Degenerate(degenerate) => Some(degenerate),
            _ => None,
        }
    }
}
