// src/operations/mod.rs

//! Measurement-basis changes applied to the encoded state before readout.
//!
//! The kinetic-energy register is read out after a Hadamard on every qubit;
//! the potential-energy register is read out in the computational basis.
//! Both transforms are real, so they act on symbolic amplitudes by plain
//! linear combination of their linear forms.

use crate::core::constants::osq_constants::FRAC_1_SQRT_2;
use crate::core::{Amplitude, LinearForm, Matrix, OsqError, Result};

/// Basis in which a register is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementBasis {
    /// Read out directly, no transform.
    Computational,
    /// `H^{⊗q}` applied to the register before readout.
    Hadamard,
}

impl MeasurementBasis {
    /// The `2^q x 2^q` transform realizing this basis change.
    pub fn matrix(&self, num_qubits: u32) -> Matrix<f64> {
        match self {
            MeasurementBasis::Computational => Matrix::identity(1 << num_qubits),
            MeasurementBasis::Hadamard => hadamard_transform(num_qubits),
        }
    }
}

/// Single-qubit Hadamard `1/sqrt(2) [[1, 1], [1, -1]]`.
pub fn hadamard() -> Matrix<f64> {
    Matrix::from_fn(2, 2, |r, c| if r == 1 && c == 1 { -FRAC_1_SQRT_2 } else { FRAC_1_SQRT_2 })
}

/// q-fold tensor product `H ⊗ H ⊗ ... ⊗ H`. `q = 0` gives the 1x1 identity.
pub fn hadamard_transform(num_qubits: u32) -> Matrix<f64> {
    let h = hadamard();
    (0..num_qubits).fold(Matrix::identity(1), |acc, _| acc.kron(&h))
}

/// Symbolic matrix-vector product `U * amplitudes` for a real transform `U`.
///
/// All amplitudes must share one phase and one family of unknowns, otherwise
/// the result would not be a single linear form per entry.
pub fn apply_to_amplitudes(transform: &Matrix<f64>, amplitudes: &[Amplitude]) -> Result<Vec<Amplitude>> {
    if transform.cols() != amplitudes.len() {
        return Err(OsqError::DimensionMismatch {
            message: format!(
                "Transform of width {} applied to {} amplitudes",
                transform.cols(),
                amplitudes.len()
            ),
        });
    }
    let Some(first) = amplitudes.first() else {
        return Ok(Vec::new());
    };
    let phase = first.phase();
    let kind = first.form().kind();
    let width = first.form().len();
    if amplitudes
        .iter()
        .any(|a| a.phase() != phase || a.form().kind() != kind || a.form().len() != width)
    {
        return Err(OsqError::DimensionMismatch {
            message: "Cannot combine amplitudes with different phases or unknowns".to_string(),
        });
    }

    let transformed = (0..transform.rows())
        .map(|r| {
            let mut form = LinearForm::zero(kind, width);
            for (c, amp) in amplitudes.iter().enumerate() {
                form.add_scaled(amp.form(), transform.get(r, c));
            }
            Amplitude::new(phase, form)
        })
        .collect();
    Ok(transformed)
}

/// Applies `basis` to a whole register of `2^q` amplitudes.
pub fn apply_basis(basis: MeasurementBasis, amplitudes: &[Amplitude]) -> Result<Vec<Amplitude>> {
    let n = amplitudes.len();
    if !n.is_power_of_two() {
        return Err(OsqError::DimensionMismatch {
            message: format!("Register of {} amplitudes is not a whole number of qubits", n),
        });
    }
    apply_to_amplitudes(&basis.matrix(n.trailing_zeros()), amplitudes)
}
