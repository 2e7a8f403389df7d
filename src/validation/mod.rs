// src/validation/mod.rs

//! Input validation for oscillator networks, and postcondition checks on
//! the matrices and states the crate produces.

use crate::core::constants::osq_constants::COEFFICIENT_EPSILON;
use crate::core::{Matrix, OsqError, Result};
use num_complex::Complex;

// Default tolerance values (can be overridden by caller)
const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;
const DEFAULT_HERMITIAN_TOLERANCE: f64 = 1e-12;

// --- Input Validation ---

/// Checks that `n` oscillators can be carried by a whole number of qubits
/// and returns that qubit count.
pub fn qubit_count(n: usize) -> Result<u32> {
    if n == 0 || !n.is_power_of_two() {
        return Err(OsqError::DimensionMismatch {
            message: format!("Oscillator count {} is not a power of two", n),
        });
    }
    Ok(n.trailing_zeros())
}

/// Validates the spring-constant matrix and returns the oscillator count.
///
/// K must be square, symmetric, finite and non-negative; every entry is
/// used through its square root.
pub fn validate_couplings(k: &Matrix<f64>) -> Result<usize> {
    if !k.is_square() {
        return Err(OsqError::DimensionMismatch {
            message: format!("Spring-constant matrix is {}x{}, expected square", k.rows(), k.cols()),
        });
    }
    for r in 0..k.rows() {
        for c in 0..k.cols() {
            let v = k.get(r, c);
            if !v.is_finite() || v < 0.0 {
                return Err(OsqError::InvalidCoupling {
                    message: format!("K[{}][{}] = {} is not a finite non-negative coupling", r, c, v),
                });
            }
        }
    }
    if !k.is_symmetric(COEFFICIENT_EPSILON) {
        return Err(OsqError::InvalidCoupling {
            message: "Spring-constant matrix is not symmetric".to_string(),
        });
    }
    Ok(k.rows())
}

/// Checks `masses` has `n` strictly positive finite entries.
pub fn validate_masses(masses: &[f64], n: usize) -> Result<()> {
    if masses.len() != n {
        return Err(OsqError::DimensionMismatch {
            message: format!("Mass vector has {} entries for {} oscillators", masses.len(), n),
        });
    }
    if let Some((index, m)) = masses.iter().enumerate().find(|(_, m)| !(m.is_finite() && **m > 0.0)) {
        return Err(OsqError::InvalidMass {
            index,
            message: format!("Mass M[{}] = {} must be strictly positive", index, m),
        });
    }
    Ok(())
}

/// Checks the energy scale is a positive finite number.
pub fn validate_energy(energy: f64) -> Result<()> {
    if energy.is_finite() && energy > 0.0 {
        Ok(())
    } else {
        Err(OsqError::InvalidEnergy {
            message: format!("Energy scale E = {} must be strictly positive", energy),
        })
    }
}

/// Checks a per-oscillator vector (initial positions, velocities) has `n` entries.
pub fn validate_length(name: &str, values: &[f64], n: usize) -> Result<()> {
    if values.len() == n {
        Ok(())
    } else {
        Err(OsqError::DimensionMismatch {
            message: format!("{} has {} entries for {} oscillators", name, values.len(), n),
        })
    }
}

/// Checks every measured probability is a finite number.
///
/// Small negative values are allowed through (shot noise); the solver
/// treats them against its absolute tolerance.
pub fn validate_probabilities(name: &str, probs: &[f64]) -> Result<()> {
    match probs.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(OsqError::InvalidProbability {
            index,
            message: format!("{}[{}] = {} is not a finite probability", name, index, probs[index]),
        }),
        None => Ok(()),
    }
}

// --- Postcondition Checks ---

/// Checks `H = H^H` within tolerance.
///
/// # Arguments
/// * `h` - The matrix to check.
/// * `tolerance` - Allowed entry-wise deviation. Defaults to 1e-12.
///
/// # Returns
/// * `Ok(())` if Hermitian within tolerance.
/// * `Err(OsqError::ValidationFailed)` otherwise.
pub fn check_hermitian(h: &Matrix<Complex<f64>>, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_HERMITIAN_TOLERANCE);
    if h.is_hermitian(effective_tolerance) {
        Ok(())
    } else {
        Err(OsqError::ValidationFailed {
            message: format!(
                "{}x{} matrix is not Hermitian (tolerance {})",
                h.rows(),
                h.cols(),
                effective_tolerance
            ),
        })
    }
}

/// Checks the numeric state vector is normalized (sum of squared amplitudes ≈ 1.0).
///
/// For an encoded oscillator state this holds exactly when the energy
/// scale equals the total classical energy.
///
/// # Arguments
/// * `amplitudes` - Numeric amplitudes of the state.
/// * `tolerance` - Allowed deviation from 1.0. Defaults to 1e-9.
pub fn check_normalization(amplitudes: &[Complex<f64>], tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = amplitudes.iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(OsqError::ValidationFailed {
            message: format!(
                "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
                norm_sq, effective_tolerance
            ),
        })
    } else {
        Ok(())
    }
}
