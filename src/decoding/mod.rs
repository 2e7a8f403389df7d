// src/decoding/mod.rs

//! Inverts measured probability vectors back into classical velocities and
//! positions.
//!
//! Two independent branches read the encoded state:
//! - [`MeasurementDecoder`] handles the kinetic register, measured after a
//!   Hadamard transform, and filters its candidates against the
//!   computational-basis probabilities;
//! - [`EquationSolverPE`] handles the potential register, measured directly,
//!   and returns every candidate.
//!
//! Neither branch keeps state between calls: unknowns and equations are
//! built fresh on every call.

mod kinetic;
mod potential;
mod results;

pub use kinetic::MeasurementDecoder;
pub use potential::EquationSolverPE;
pub use results::PostProcessResult;

use crate::core::{OsqError, Result};
use crate::solver::Tolerance;
use crate::validation::validate_probabilities;
use serde::{Deserialize, Serialize};

/// Settings shared by both decoder branches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Used for solver consistency checks and for solution filtering.
    pub tolerance: Tolerance,
}

impl DecoderConfig {
    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }
}

/// First `len` entries of a measured probability vector, all finite.
fn leading<'a>(name: &str, probs: &'a [f64], len: usize) -> Result<&'a [f64]> {
    let head = probs.get(..len).ok_or_else(|| OsqError::DimensionMismatch {
        message: format!("{} has {} entries, need at least {}", name, probs.len(), len),
    })?;
    validate_probabilities(name, head)?;
    Ok(head)
}
