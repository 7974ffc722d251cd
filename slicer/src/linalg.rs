//! Small dense linear algebra helpers over row-major `Vec<Vec<f32>>`
//! matrices. Shapes are checked up front and the math is done by nalgebra.

use nalgebra::{DMatrix, DVector, Vector3};

use crate::error::{Degenerate, Precondition, Result};

pub type Matrix = Vec<Vec<f32>>;

pub fn matrix_multiply(a: &[Vec<f32>], b: &[Vec<f32>]) -> Result<Matrix> {
    let (lhs, rhs) = (to_matrix(a)?, to_matrix(b)?);
    check_multiply(lhs.shape(), rhs.shape())?;
    Ok(from_matrix(&(lhs * rhs)))
}

pub fn matrix_transpose(matrix: &[Vec<f32>]) -> Result<Matrix> {
    Ok(from_matrix(&to_matrix(matrix)?.transpose()))
}

pub fn matrix_determinant(matrix: &[Vec<f32>]) -> Result<f32> {
    let matrix = to_matrix(matrix)?;
    if !matrix.is_square() {
        let (rows, cols) = matrix.shape();
        return Err(Precondition::NotSquare(rows, cols).into());
    }

    Ok(matrix.determinant())
}

pub fn identity_matrix(size: usize) -> Result<Matrix> {
    if size == 0 {
        return Err(Degenerate::ZeroSizeMatrix.into());
    }

    Ok(from_matrix(&DMatrix::identity(size, size)))
}

/// Dot product of two vectors of the same length. Two empty vectors give 0.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Precondition::VectorLengthMismatch(a.len(), b.len()).into());
    }

    Ok(DVector::from_column_slice(a).dot(&DVector::from_column_slice(b)))
}

pub fn cross(a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
    if a.len() != 3 || b.len() != 3 {
        return Err(Precondition::NotThreeDimensional(a.len(), b.len()).into());
    }

    let out = Vector3::from_column_slice(a).cross(&Vector3::from_column_slice(b));
    Ok(out.as_slice().to_vec())
}

/// Checks that a `lhs` shaped matrix can be multiplied by a `rhs` shaped one.
pub(crate) fn check_multiply(lhs: (usize, usize), rhs: (usize, usize)) -> Result<()> {
    if lhs.1 != rhs.0 {
        return Err(Precondition::DimensionMismatch { lhs, rhs }.into());
    }

    Ok(())
}

/// Converts rows into a matrix, rejecting empty and ragged input.
pub(crate) fn to_matrix(rows: &[Vec<f32>]) -> Result<DMatrix<f32>> {
    let cols = rows.first().map_or(0, Vec::len);
    if cols == 0 {
        return Err(Precondition::EmptyMatrix.into());
    }

    if let Some((row, found)) = (rows.iter().enumerate())
        .map(|(idx, x)| (idx, x.len()))
        .find(|&(_, len)| len != cols)
    {
        return Err(Precondition::RaggedMatrix {
            row,
            found,
            expected: cols,
        }
        .into());
    }

    Ok(DMatrix::from_fn(rows.len(), cols, |row, col| rows[row][col]))
}

pub(crate) fn from_matrix(matrix: &DMatrix<f32>) -> Matrix {
    (matrix.row_iter())
        .map(|row| row.iter().copied().collect())
        .collect()
}
