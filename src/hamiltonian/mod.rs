// src/hamiltonian/mod.rs

//! Builds the Hamiltonian matrix that encodes a network of coupled harmonic
//! oscillators for quantum simulation.
//!
//! For `N = 2^n` oscillators with spring constants `K` and masses `M`:
//! - `F` is the discrete Laplacian of the coupling graph,
//! - `B` is the mass-weighted `sqrt(K)` incidence matrix with `F = B B^T`
//!   up to the mass scaling,
//! - `H = -[[0, B'], [B'^H, 0]]` where `B'` is `B` zero-padded to `N^2 x N^2`.

use crate::core::{Matrix, OsqError, Result};
use crate::validation::{validate_couplings, validate_masses};
use log::debug;
use num_complex::Complex;

/// Incidence matrix `B` together with its conjugate transpose.
#[derive(Debug, Clone, PartialEq)]
pub struct Incidence {
    b: Matrix<Complex<f64>>,
    b_dagger: Matrix<Complex<f64>>,
}

impl Incidence {
    /// `B`, `N x N(N+1)/2`.
    pub fn b(&self) -> &Matrix<Complex<f64>> {
        &self.b
    }

    /// `B^H`, `N(N+1)/2 x N`.
    pub fn b_dagger(&self) -> &Matrix<Complex<f64>> {
        &self.b_dagger
    }
}

/// Number of incidence columns for `n` oscillators: `n` self terms plus
/// `n(n-1)/2` pairs.
pub fn incidence_columns(n: usize) -> usize {
    n * (n + 1) / 2
}

/// `F[j][k] = Σ_l K[j][l]` on the diagonal and `-K[j][k]` off it.
pub fn coupling_matrix(k: &Matrix<f64>) -> Matrix<f64> {
    let row_sums = k.row_sums();
    Matrix::from_fn(k.rows(), k.cols(), |j, c| if j == c { row_sums[j] } else { -k.get(j, c) })
}

/// Builds `B = diag(M)^-1/2 * sqrt(K)-incidence` and `B^H`.
///
/// Columns `0..N` hold the self terms `sqrt(K[j][j])` on row `j`; the
/// remaining columns enumerate the pairs `j < k` in row-major order with
/// `sqrt(K[j][k])` on row `j` and `-sqrt(K[j][k])` on row `k`.
///
/// Fails with `InvalidMass` before any matrix is assembled when a mass is
/// not strictly positive.
pub fn incidence_matrix(k: &Matrix<f64>, masses: &[f64]) -> Result<Incidence> {
    let n = validate_couplings(k)?;
    validate_masses(masses, n)?;

    let mut sqrt_k_b = Matrix::<f64>::zeros(n, incidence_columns(n));
    let mut pair_column = n; // next free column for a |j,k> pair
    for j in 0..n {
        sqrt_k_b.set(j, j, k.get(j, j).sqrt());
        for c in j + 1..n {
            let s = k.get(j, c).sqrt();
            sqrt_k_b.set(j, pair_column, s);
            sqrt_k_b.set(c, pair_column, -s);
            pair_column += 1;
        }
    }

    let inv_sqrt_m: Vec<f64> = masses.iter().map(|m| 1.0 / m.sqrt()).collect();
    let b = Matrix::diagonal(&inv_sqrt_m).matmul(&sqrt_k_b)?.to_complex();
    let b_dagger = b.adjoint();
    Ok(Incidence { b, b_dagger })
}

/// Zero-fills `B` to the `N^2 x N^2` block used in the doubled encoding.
pub fn pad_incidence(b: &Matrix<Complex<f64>>) -> Result<Matrix<Complex<f64>>> {
    let n = b.rows();
    if b.cols() != incidence_columns(n) {
        return Err(OsqError::DimensionMismatch {
            message: format!(
                "Incidence matrix has {} columns, expected {} for {} oscillators",
                b.cols(),
                incidence_columns(n),
                n
            ),
        });
    }
    b.padded(n * n, n * n)
}

/// Assembles `H = [[0, -B'], [-B'^H, 0]]` from a (not yet padded) `B`.
pub fn hamiltonian_matrix(b: &Matrix<Complex<f64>>) -> Result<Matrix<Complex<f64>>> {
    let padded = pad_incidence(b)?;
    Matrix::block_antidiagonal(&padded.negated(), &padded.adjoint().negated())
}

/// Builder for the oscillator Hamiltonian. `K` and `M` are validated once at
/// construction and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct HamiltonianBuilder {
    num_qubits: u32,
    k: Matrix<f64>,
    masses: Vec<f64>,
}

impl HamiltonianBuilder {
    /// Creates a builder for `N = 2^num_qubits` oscillators.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `K` is not `N x N` or `masses` is not length `N`.
    /// * `InvalidCoupling` if `K` is asymmetric, negative or not finite.
    /// * `InvalidMass` if any mass is not strictly positive.
    pub fn new(num_qubits: u32, k: Matrix<f64>, masses: Vec<f64>) -> Result<Self> {
        let n = 1usize
            .checked_shl(num_qubits)
            .filter(|n| n.checked_mul(*n).and_then(|sq| sq.checked_mul(2)).is_some())
            .ok_or_else(|| OsqError::DimensionMismatch {
                message: format!("{} qubits overflow the matrix dimension", num_qubits),
            })?;
        if k.rows() != n || k.cols() != n {
            return Err(OsqError::DimensionMismatch {
                message: format!("Spring-constant matrix is {}x{}, expected {}x{}", k.rows(), k.cols(), n, n),
            });
        }
        validate_couplings(&k)?;
        validate_masses(&masses, n)?;
        Ok(Self { num_qubits, k, masses })
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of oscillators `N`.
    pub fn num_oscillators(&self) -> usize {
        self.k.rows()
    }

    /// Side length of the Hamiltonian, `2N^2`.
    pub fn dimension(&self) -> usize {
        let n = self.num_oscillators();
        2 * n * n
    }

    pub fn spring_constants(&self) -> &Matrix<f64> {
        &self.k
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// The row-sum (Laplacian) matrix `F`.
    pub fn compute_f(&self) -> Matrix<f64> {
        coupling_matrix(&self.k)
    }

    /// The incidence matrix `B` and `B^H`.
    pub fn compute_b(&self) -> Result<Incidence> {
        incidence_matrix(&self.k, &self.masses)
    }

    /// The padded block-antidiagonal Hamiltonian `H` (`2N^2 x 2N^2`).
    pub fn compute_hamiltonian(&self) -> Result<Matrix<Complex<f64>>> {
        let incidence = self.compute_b()?;
        let h = hamiltonian_matrix(incidence.b())?;
        debug!(
            "[hamiltonian] N={} B={}x{} H={}x{} max|H|={:.4}",
            self.num_oscillators(),
            incidence.b().rows(),
            incidence.b().cols(),
            h.rows(),
            h.cols(),
            h.max_norm()
        );
        Ok(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_oscillators() -> Result<HamiltonianBuilder> {
        let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
        HamiltonianBuilder::new(1, k, vec![1.0, 1.0])
    }

    #[test]
    fn test_f_is_row_sum_laplacian() -> Result<()> {
        let k = Matrix::from_rows(vec![
            vec![1.0, 2.0, 0.0, 0.0],
            vec![2.0, 0.0, 3.0, 0.0],
            vec![0.0, 3.0, 0.0, 4.0],
            vec![0.0, 0.0, 4.0, 5.0],
        ])?;
        let builder = HamiltonianBuilder::new(2, k, vec![1.0; 4])?;
        let f = builder.compute_f();
        assert_eq!(f.row(0), &[3.0, -2.0, 0.0, 0.0]);
        assert_eq!(f.row(1), &[-2.0, 5.0, -3.0, 0.0]);
        assert_eq!(f.row(3), &[0.0, 0.0, -4.0, 9.0]);
        Ok(())
    }

    #[test]
    fn test_b_column_layout() -> Result<()> {
        let k = Matrix::from_rows(vec![vec![4.0, 9.0], vec![9.0, 16.0]])?;
        let incidence = incidence_matrix(&k, &[1.0, 4.0])?;
        let b = incidence.b();
        assert_eq!((b.rows(), b.cols()), (2, 3));
        // Self terms, scaled by 1/sqrt(m).
        assert_eq!(b.get(0, 0), Complex::new(2.0, 0.0));
        assert_eq!(b.get(1, 1), Complex::new(2.0, 0.0));
        // Pair (0, 1) in column N.
        assert_eq!(b.get(0, 2), Complex::new(3.0, 0.0));
        assert_eq!(b.get(1, 2), Complex::new(-1.5, 0.0));
        assert_eq!(incidence.b_dagger(), &b.adjoint());
        Ok(())
    }

    #[test]
    fn test_hamiltonian_shape_and_blocks() -> Result<()> {
        let builder = two_oscillators()?;
        let h = builder.compute_hamiltonian()?;
        assert_eq!(h.rows(), builder.dimension());
        assert_eq!(h.rows(), 8);
        assert!(h.block(0, 0, 4, 4).is_zero());
        assert!(h.block(4, 4, 4, 4).is_zero());
        assert!(h.is_hermitian(1e-12));
        // Top-right holds -B; padding row/column stay zero.
        assert_eq!(h.get(0, 4), Complex::new(-1.0, 0.0));
        assert_eq!(h.get(1, 6), Complex::new(1.0, 0.0));
        assert!(h.block(2, 4, 2, 4).is_zero());
        assert!(h.block(0, 7, 4, 1).is_zero());
        Ok(())
    }

    #[test]
    fn test_non_positive_mass_rejected() -> Result<()> {
        let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
        let err = HamiltonianBuilder::new(1, k.clone(), vec![1.0, 0.0]).unwrap_err();
        assert!(matches!(err, OsqError::InvalidMass { index: 1, .. }));
        let err = incidence_matrix(&k, &[-2.0, 1.0]).unwrap_err();
        assert!(matches!(err, OsqError::InvalidMass { index: 0, .. }));
        Ok(())
    }

    #[test]
    fn test_wrong_k_size_rejected() -> Result<()> {
        let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
        let err = HamiltonianBuilder::new(2, k, vec![1.0; 4]).unwrap_err();
        assert!(matches!(err, OsqError::DimensionMismatch { .. }));
        Ok(())
    }
}
