// src/encoding/mod.rs

//! Builds the placeholder quantum state of an oscillator network.
//!
//! The state has length `2N^2` and three segments:
//! 1. `N` kinetic-energy amplitudes `v_i * sqrt(m_i) / sqrt(2E)`,
//! 2. `N(N+1)/2` potential-energy phase terms ("mu"), enumerated over pairs
//!    `i <= j` row-major: `i * sqrt(K[i][i]) * x_i / sqrt(2E)` when `i == j`,
//!    `i * sqrt(K[i][j]) * (x_i - x_j) / sqrt(2E)` otherwise,
//! 3. `3N(N-1)/2` zero slots.
//!
//! Entries are symbolic in the unknown positions and velocities. The
//! decoders in [`crate::decoding`] invert the measured probabilities of
//! these entries.

use crate::core::{Amplitude, LinearForm, Matrix, OsqError, Phase, Result, SymbolKind};
use crate::operations::MeasurementBasis;
use crate::validation::{qubit_count, validate_couplings, validate_energy, validate_length, validate_masses};
use log::debug;
use num_complex::Complex;
use std::fmt;

/// Index pairs `(i, j)` with `i <= j` in the order the mu terms appear.
pub fn potential_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect()
}

/// End of the potential-energy segment: `N(N+3)/2`.
pub fn potential_end(n: usize) -> usize {
    n * (n + 3) / 2
}

/// Number of zero slots appended after the potential segment: `3N(N-1)/2`.
pub fn padding_len(n: usize) -> usize {
    3 * n * n.saturating_sub(1) / 2
}

/// Immutable symbolic state `psi` plus its mu segment.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedState {
    num_oscillators: usize,
    psi: Vec<Amplitude>,
    mu: Vec<Amplitude>,
}

impl EncodedState {
    pub fn num_oscillators(&self) -> usize {
        self.num_oscillators
    }

    /// The whole state, `2N^2` entries.
    pub fn psi(&self) -> &[Amplitude] {
        &self.psi
    }

    /// The potential-energy phase terms, `N(N+1)/2` entries.
    pub fn mu(&self) -> &[Amplitude] {
        &self.mu
    }

    /// First `N` entries of `psi`.
    pub fn kinetic(&self) -> &[Amplitude] {
        &self.psi[..self.num_oscillators]
    }

    /// Entries `N..N(N+3)/2` of `psi`; identical to `mu`.
    pub fn potential(&self) -> &[Amplitude] {
        &self.psi[self.num_oscillators..potential_end(self.num_oscillators)]
    }

    /// Numeric amplitudes for the given positions and velocities.
    pub fn evaluate(&self, positions: &[f64], velocities: &[f64]) -> Vec<Complex<f64>> {
        self.psi
            .iter()
            .map(|amp| match amp.form().kind() {
                SymbolKind::Position => amp.evaluate(positions),
                SymbolKind::Velocity => amp.evaluate(velocities),
            })
            .collect()
    }
}

impl fmt::Display for EncodedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "psi[")?;
        for (i, amp) in self.psi.iter().enumerate() {
            write!(f, "{}{}", if i > 0 { ", " } else { "" }, amp)?;
        }
        write!(f, "]")
    }
}

/// Builds the symbolic state from the spring constants, masses and energy
/// scale. Pure: the same inputs always give the same state.
pub fn encode_state(energy: f64, k: &Matrix<f64>, masses: &[f64]) -> Result<EncodedState> {
    validate_energy(energy)?;
    let n = validate_couplings(k)?;
    qubit_count(n)?;
    validate_masses(masses, n)?;

    let sqrt_2e = (2.0 * energy).sqrt();

    let mu: Vec<Amplitude> = potential_pairs(n)
        .into_iter()
        .map(|(i, j)| {
            let s = k.get(i, j).sqrt() / sqrt_2e;
            let mut form = LinearForm::unit(SymbolKind::Position, n, i, s);
            if j != i {
                form.add_scaled(&LinearForm::unit(SymbolKind::Position, n, j, 1.0), -s);
            }
            Amplitude::new(Phase::Imaginary, form)
        })
        .collect();

    let mut psi: Vec<Amplitude> = masses
        .iter()
        .enumerate()
        .map(|(i, m)| Amplitude::new(Phase::Real, LinearForm::unit(SymbolKind::Velocity, n, i, m.sqrt() / sqrt_2e)))
        .collect();
    psi.extend(mu.iter().cloned());
    psi.extend((0..padding_len(n)).map(|_| Amplitude::zero(SymbolKind::Velocity, n)));

    debug!(
        "[encoding] N={} kinetic={} mu={} padding={} total={}",
        n,
        n,
        mu.len(),
        padding_len(n),
        psi.len()
    );
    Ok(EncodedState { num_oscillators: n, psi, mu })
}

/// Exact probability vectors a noiseless backend would report for the
/// initial conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct IdealProbabilities {
    /// `|psi_k|^2` in the computational basis.
    pub out_probs_comp: Vec<f64>,
    /// Probabilities after `H^{⊗q}` on the low `q = log2 N` qubits; the
    /// first `N` entries belong to the kinetic register.
    pub out_probs_x: Vec<f64>,
}

/// Encodes an oscillator network and keeps the initial conditions for
/// bookkeeping. Everything is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEncoder {
    energy: f64,
    k: Matrix<f64>,
    masses: Vec<f64>,
    x_ini: Vec<f64>,
    x_dot_ini: Vec<f64>,
    state: EncodedState,
}

impl StateEncoder {
    /// # Errors
    /// * `InvalidEnergy` if `energy` is not strictly positive.
    /// * `DimensionMismatch` if `N` is not a power of two or the input
    ///   lengths disagree.
    /// * `InvalidCoupling` / `InvalidMass` for bad `K` / `M`.
    pub fn new(energy: f64, k: Matrix<f64>, masses: Vec<f64>, x_ini: Vec<f64>, x_dot_ini: Vec<f64>) -> Result<Self> {
        let state = encode_state(energy, &k, &masses)?;
        let n = state.num_oscillators();
        validate_length("x_ini", &x_ini, n)?;
        validate_length("x_dot_ini", &x_dot_ini, n)?;
        Ok(Self { energy, k, masses, x_ini, x_dot_ini, state })
    }

    pub fn state(&self) -> &EncodedState {
        &self.state
    }

    pub fn num_oscillators(&self) -> usize {
        self.state.num_oscillators()
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn spring_constants(&self) -> &Matrix<f64> {
        &self.k
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn x_ini(&self) -> &[f64] {
        &self.x_ini
    }

    pub fn x_dot_ini(&self) -> &[f64] {
        &self.x_dot_ini
    }

    /// `psi` evaluated at the initial conditions.
    pub fn evaluate(&self) -> Vec<Complex<f64>> {
        self.state.evaluate(&self.x_ini, &self.x_dot_ini)
    }

    /// Classical energy of the initial conditions:
    /// `Σ m_i v_i^2 / 2 + Σ_{i<=j} K_ij (x_i - x_j)^2 / 2` with `x_j = 0` on the diagonal.
    ///
    /// `Σ |psi|^2 = total_energy / E`, so the state is normalized exactly
    /// when `E` equals this value.
    pub fn total_energy(&self) -> f64 {
        let norm_sq: f64 = self.evaluate().iter().map(|c| c.norm_sqr()).sum();
        norm_sq * self.energy
    }

    /// Probability vectors for the initial conditions, in the same layout
    /// the decoders expect from a measurement backend.
    pub fn ideal_probabilities(&self) -> Result<IdealProbabilities> {
        let amplitudes = self.evaluate();
        let out_probs_comp: Vec<f64> = amplitudes.iter().map(|c| c.norm_sqr()).collect();

        let n = self.num_oscillators();
        let h = MeasurementBasis::Hadamard.matrix(qubit_count(n)?).to_complex();
        let mut out_probs_x = Vec::with_capacity(amplitudes.len());
        for chunk in amplitudes.chunks(n) {
            if chunk.len() != n {
                return Err(OsqError::DimensionMismatch {
                    message: format!("State length {} is not a multiple of {}", amplitudes.len(), n),
                });
            }
            let column = Matrix::from_fn(n, 1, |r, _| chunk[r]);
            let rotated = h.matmul(&column)?;
            out_probs_x.extend((0..n).map(|r| rotated.get(r, 0).norm_sqr()));
        }
        Ok(IdealProbabilities { out_probs_comp, out_probs_x })
    }
}
