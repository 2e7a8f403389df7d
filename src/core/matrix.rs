// src/core/matrix.rs

//! Small dense row-major matrix used for the coupling, incidence and
//! Hamiltonian matrices, and for the Hadamard transform.

use super::error::{OsqError, Result};
use num_complex::Complex;
use num_traits::Num;
use std::fmt;
use std::ops::Neg;

/// Dense row-major matrix over a numeric field (`f64` or `Complex<f64>`).
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point entries
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy + Num> Matrix<T> {
    /// All-zero `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![T::zero(); rows * cols] }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |r, c| if r == c { T::one() } else { T::zero() })
    }

    /// Builds a matrix by evaluating `f(row, col)` for every entry.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Builds a matrix from nested rows. Fails on ragged input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(OsqError::DimensionMismatch {
                    message: format!("Row {} has {} entries, expected {}", r, row.len(), n_cols),
                });
            }
            data.extend(row);
        }
        Ok(Self { rows: n_rows, cols: n_cols, data })
    }

    /// Diagonal matrix with `diag` on the main diagonal.
    pub fn diagonal(diag: &[T]) -> Self {
        Self::from_fn(diag.len(), diag.len(), |r, c| if r == c { diag[r] } else { T::zero() })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entry at (`row`, `col`). Panics when out of bounds, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(row < self.rows && col < self.cols, "matrix index ({}, {}) out of bounds", row, col);
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.rows && col < self.cols, "matrix index ({}, {}) out of bounds", row, col);
        self.data[row * self.cols + col] = value;
    }

    /// Read-only view of one row.
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Row sums, one per row.
    pub fn row_sums(&self) -> Vec<T> {
        (0..self.rows)
            .map(|r| self.row(r).iter().fold(T::zero(), |acc, &v| acc + v))
            .collect()
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self.get(c, r))
    }

    /// Applies `f` entry-wise.
    pub fn map<U: Copy + Num>(&self, f: impl Fn(T) -> U) -> Matrix<U> {
        Matrix { rows: self.rows, cols: self.cols, data: self.data.iter().map(|&v| f(v)).collect() }
    }

    /// Copy of the `rows x cols` sub-block starting at (`row0`, `col0`).
    pub fn block(&self, row0: usize, col0: usize, rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |r, c| self.get(row0 + r, col0 + c))
    }

    /// Zero-fills `self` on the bottom and right up to `rows x cols`.
    pub fn padded(&self, rows: usize, cols: usize) -> Result<Self> {
        if rows < self.rows || cols < self.cols {
            return Err(OsqError::DimensionMismatch {
                message: format!(
                    "Cannot pad a {}x{} matrix down to {}x{}",
                    self.rows, self.cols, rows, cols
                ),
            });
        }
        Ok(Self::from_fn(rows, cols, |r, c| {
            if r < self.rows && c < self.cols { self.get(r, c) } else { T::zero() }
        }))
    }

    /// Standard matrix product `self * other`.
    pub fn matmul(&self, other: &Self) -> Result<Self> {
        if self.cols != other.rows {
            return Err(OsqError::DimensionMismatch {
                message: format!(
                    "Cannot multiply {}x{} by {}x{}",
                    self.rows, self.cols, other.rows, other.cols
                ),
            });
        }
        Ok(Self::from_fn(self.rows, other.cols, |r, c| {
            (0..self.cols).fold(T::zero(), |acc, k| acc + self.get(r, k) * other.get(k, c))
        }))
    }

    /// Kronecker (tensor) product `self ⊗ other`.
    pub fn kron(&self, other: &Self) -> Self {
        Self::from_fn(self.rows * other.rows, self.cols * other.cols, |r, c| {
            self.get(r / other.rows, c / other.cols) * other.get(r % other.rows, c % other.cols)
        })
    }

    /// True when every entry is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| v.is_zero())
    }
}

impl<T: Copy + Num + Neg<Output = T>> Matrix<T> {
    /// Entry-wise negation.
    pub fn negated(&self) -> Self {
        self.map(|v| -v)
    }

    /// Assembles `[[0, top_right], [bottom_left, 0]]`. Both blocks must be
    /// square and of equal size.
    pub fn block_antidiagonal(top_right: &Self, bottom_left: &Self) -> Result<Self> {
        let n = top_right.rows;
        if !top_right.is_square() || !bottom_left.is_square() || bottom_left.rows != n {
            return Err(OsqError::DimensionMismatch {
                message: format!(
                    "Antidiagonal blocks must be equal square matrices, got {}x{} and {}x{}",
                    top_right.rows, top_right.cols, bottom_left.rows, bottom_left.cols
                ),
            });
        }
        Ok(Self::from_fn(2 * n, 2 * n, |r, c| match (r < n, c < n) {
            (true, false) => top_right.get(r, c - n),
            (false, true) => bottom_left.get(r - n, c),
            _ => T::zero(),
        }))
    }
}

impl Matrix<f64> {
    /// Checks `|A[i][j] - A[j][i]| <= tolerance` for every pair.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        self.is_square()
            && (0..self.rows).all(|r| (r + 1..self.cols).all(|c| (self.get(r, c) - self.get(c, r)).abs() <= tolerance))
    }

    /// Lifts a real matrix into the complex field.
    pub fn to_complex(&self) -> Matrix<Complex<f64>> {
        self.map(|v| Complex::new(v, 0.0))
    }
}

impl Matrix<Complex<f64>> {
    /// Conjugate transpose `A^H`.
    pub fn adjoint(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self.get(c, r).conj())
    }

    /// Checks `A = A^H` entry-wise within `tolerance`.
    pub fn is_hermitian(&self, tolerance: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        (0..self.rows).all(|r| {
            (r..self.cols).all(|c| (self.get(r, c) - self.get(c, r).conj()).norm() <= tolerance)
        })
    }

    /// Largest entry magnitude, used for diagnostics.
    pub fn max_norm(&self) -> f64 {
        self.data.iter().map(|v| v.norm()).fold(0.0, f64::max)
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            write!(f, "[")?;
            for c in 0..self.cols {
                write!(f, "{}{:.4}", if c > 0 { ", " } else { "" }, self.data[r * self.cols + c])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}
