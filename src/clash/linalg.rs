//! Dense `f64` matrix kernel for the absorbing-chain solver.
//!
//! Matrices are row-major `Vec<Vec<f64>>`. Shapes are checked up front and
//! reported as [ClashError::DimensionMismatch]; inversion never touches the
//! caller's matrix.

use crate::clash::error::{ClashError, Result};

pub type Matrix = Vec<Vec<f64>>;

/// `(rows, cols)` of a matrix. An empty matrix is `(0, 0)`.
pub fn shape(matrix: &[Vec<f64>]) -> (usize, usize) {
    (matrix.len(), matrix.first().map_or(0, Vec::len))
}

pub fn identity(size: usize) -> Matrix {
    (0..size)
        .map(|i| (0..size).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

/// Copy the block `rows × cols` out of `matrix`. Ranges must be in bounds.
pub fn submatrix(
    matrix: &[Vec<f64>],
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Matrix {
    matrix[rows]
        .iter()
        .map(|row| row[cols.clone()].to_vec())
        .collect()
}

/// Binomial probability mass function. The coefficient is accumulated as a
/// running product so large `trials` never go through factorials.
pub fn binomial_pmf(successes: i64, trials: u32, p: f64) -> f64 {
    if successes < 0 || successes > i64::from(trials) {
        return 0.0;
    }
    let k = successes as u32;
    let n = f64::from(trials);
    let mut coefficient = 1.0;
    for i in 1..=k {
        let i = f64::from(i);
        coefficient *= (n - i + 1.0) / i;
    }
    coefficient * p.powi(k as i32) * (1.0 - p).powi((trials - k) as i32)
}

pub fn matrix_subtract(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Matrix> {
    let (left, right) = (shape(a), shape(b));
    if left != right || a.iter().zip(b).any(|(ra, rb)| ra.len() != rb.len()) {
        return Err(ClashError::DimensionMismatch {
            operation: "subtract",
            left,
            right,
        });
    }
    Ok(a.iter()
        .zip(b)
        .map(|(ra, rb)| ra.iter().zip(rb).map(|(x, y)| x - y).collect())
        .collect())
}

pub fn matrix_multiply(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Matrix> {
    let (left, right) = (shape(a), shape(b));
    if left.1 != right.0 {
        return Err(ClashError::DimensionMismatch {
            operation: "multiply",
            left,
            right,
        });
    }
    let mut product = vec![vec![0.0; right.1]; left.0];
    for (out_row, a_row) in product.iter_mut().zip(a) {
        for (k, &a_ik) in a_row.iter().enumerate() {
            if a_ik == 0.0 {
                continue;
            }
            for (out, &b_kj) in out_row.iter_mut().zip(&b[k]) {
                *out += a_ik * b_kj;
            }
        }
    }
    Ok(product)
}

/// Gauss-Jordan inverse. The pivot is the first non-zero entry at or below
/// the diagonal (no partial pivoting).
pub fn matrix_inverse(square: &[Vec<f64>]) -> Result<Matrix> {
    let (rows, cols) = shape(square);
    if rows != cols || square.iter().any(|row| row.len() != cols) {
        return Err(ClashError::DimensionMismatch {
            operation: "inverse",
            left: (rows, cols),
            right: (cols, rows),
        });
    }

    let mut work = square.to_vec();
    let mut inverse = identity(rows);

    for col in 0..cols {
        let pivot_row = (col..rows)
            .find(|&row| work[row][col] != 0.0)
            .ok_or(ClashError::SingularMatrix { column: col })?;
        work.swap(col, pivot_row);
        inverse.swap(col, pivot_row);

        let pivot = work[col][col];
        for j in 0..cols {
            work[col][j] /= pivot;
            inverse[col][j] /= pivot;
        }

        let pivot_work = work[col].clone();
        let pivot_inverse = inverse[col].clone();
        for row in 0..rows {
            if row == col {
                continue;
            }
            let factor = work[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..cols {
                work[row][j] -= factor * pivot_work[j];
                inverse[row][j] -= factor * pivot_inverse[j];
            }
        }
    }

    Ok(inverse)
}
