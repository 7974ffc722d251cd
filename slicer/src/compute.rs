//! Dispatching matrix products to an optional accelerated backend, with the
//! nalgebra implementation as the fallback.

use nalgebra::DMatrix;
use parking_lot::Mutex;
use tracing::warn;

use crate::{
    error::{Error, Result},
    linalg::{check_multiply, to_matrix, Matrix},
};

/// Shape of a product `(m × k) · (k × n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatMulDims {
    pub m: usize,
    pub k: usize,
    pub n: usize,
}

/// Something that can multiply row-major matrices.
pub trait MatrixBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Checks that the backend can actually run here.
    fn probe(&self) -> Result<()>;

    /// Multiplies an `m × k` by a `k × n` matrix, both flattened row by row,
    /// returning the `m × n` result in the same layout.
    fn multiply(&self, a: &[f32], b: &[f32], dims: MatMulDims) -> Result<Vec<f32>>;
}

pub struct CpuBackend;

/// Owns the backends matrix operations are run on. The accelerated backend is
/// probed the first time it is needed and the answer is kept for as long as
/// the context lives.
pub struct ComputeContext {
    accelerated: Option<Box<dyn MatrixBackend>>,
    available: Mutex<Option<bool>>,
    cpu: CpuBackend,
}

impl MatMulDims {
    fn check(&self, a: &[f32], b: &[f32]) -> bool {
        a.len() == self.m * self.k && b.len() == self.k * self.n
    }
}

impl MatrixBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn probe(&self) -> Result<()> {
        Ok(())
    }

    fn multiply(&self, a: &[f32], b: &[f32], dims: MatMulDims) -> Result<Vec<f32>> {
        if !dims.check(a, b) {
            return Err(Error::Backend {
                backend: self.name().to_owned(),
                message: format!("buffer sizes don't match {dims:?}"),
            });
        }

        let a = DMatrix::from_row_slice(dims.m, dims.k, a);
        let b = DMatrix::from_row_slice(dims.k, dims.n, b);

        // nalgebra stores column major, so the transpose's storage is the
        // row major layout of the product.
        Ok((a * b).transpose().as_slice().to_vec())
    }
}

impl ComputeContext {
    /// A context that only ever uses the cpu.
    pub fn cpu() -> Self {
        Self {
            accelerated: None,
            available: Mutex::new(Some(false)),
            cpu: CpuBackend,
        }
    }

    /// A context that prefers `backend`, falling back to the cpu if it can't
    /// be used.
    pub fn with_backend(backend: impl MatrixBackend + 'static) -> Self {
        Self {
            accelerated: Some(Box::new(backend)),
            available: Mutex::new(None),
            cpu: CpuBackend,
        }
    }

    /// Checks if the accelerated backend can be used, probing it on the first
    /// call.
    pub fn accelerated_available(&self) -> bool {
        let Some(backend) = &self.accelerated else {
            return false;
        };

        *self
            .available
            .lock()
            .get_or_insert_with(|| match backend.probe() {
                Ok(()) => true,
                Err(err) => {
                    warn!("Compute backend `{}` unavailable, using cpu: {err}", backend.name());
                    false
                }
            })
    }

    /// Name of the backend operations will be run on.
    pub fn backend_name(&self) -> &str {
        match &self.accelerated {
            Some(backend) if self.accelerated_available() => backend.name(),
            _ => self.cpu.name(),
        }
    }

    /// Multiplies two matrices. Shapes are checked before any backend is
    /// tried, and a failing accelerated backend is retried on the cpu.
    pub fn matrix_multiply(&self, a: &[Vec<f32>], b: &[Vec<f32>]) -> Result<Matrix> {
        let (lhs, rhs) = (to_matrix(a)?, to_matrix(b)?);
        check_multiply(lhs.shape(), rhs.shape())?;

        let dims = MatMulDims {
            m: lhs.nrows(),
            k: lhs.ncols(),
            n: rhs.ncols(),
        };
        let (a, b) = (a.concat(), b.concat());

        if let Some(backend) = &self.accelerated {
            if self.accelerated_available() {
                match backend.multiply(&a, &b, dims) {
                    Ok(out) if out.len() == dims.m * dims.n => return Ok(to_rows(&out, dims.n)),
                    Ok(out) => warn!(
                        "Compute backend `{}` returned {} values instead of {}, falling back to cpu",
                        backend.name(),
                        out.len(),
                        dims.m * dims.n
                    ),
                    Err(err) => warn!(
                        "Compute backend `{}` failed, falling back to cpu: {err}",
                        backend.name()
                    ),
                }
            }
        }

        let out = self.cpu.multiply(&a, &b, dims)?;
        Ok(to_rows(&out, dims.n))
    }
}

impl Default for ComputeContext {
    fn default() -> Self {
        Self::cpu()
    }
}

fn to_rows(values: &[f32], cols: usize) -> Matrix {
    values.chunks_exact(cols).map(<[f32]>::to_vec).collect()
}
