// src/decoding/kinetic.rs

use super::{DecoderConfig, PostProcessResult, leading};
use crate::core::{OsqError, Result, SquaredForm, Symbol, SymbolKind};
use crate::encoding::StateEncoder;
use crate::operations::{MeasurementBasis, apply_basis};
use crate::solver::{Equation, Solution, solve_squared};
use log::{debug, trace, warn};

/// Kinetic-branch decoder: recovers velocities from the Hadamard-basis
/// probabilities of the kinetic register.
///
/// Squaring amplitudes loses their signs, so the equation system generally
/// has several real solutions. [`eliminate_solution`](Self::eliminate_solution)
/// keeps only those that also reproduce the computational-basis
/// probabilities.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementDecoder<'a> {
    encoder: &'a StateEncoder,
    config: DecoderConfig,
}

impl<'a> MeasurementDecoder<'a> {
    pub fn new(encoder: &'a StateEncoder) -> Self {
        Self::with_config(encoder, DecoderConfig::default())
    }

    pub fn with_config(encoder: &'a StateEncoder, config: DecoderConfig) -> Self {
        Self { encoder, config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Symbolic readout probabilities of the kinetic register: the kinetic
    /// amplitudes sent through `H^{⊗q}`, `q = log2 N`, then squared.
    pub fn x_measure_equations(&self) -> Result<Vec<SquaredForm>> {
        let rotated = apply_basis(MeasurementBasis::Hadamard, self.encoder.state().kinetic())?;
        Ok(rotated.iter().map(|amp| amp.squared()).collect())
    }

    /// Probabilities implied by a solved velocity vector in the computational
    /// basis: `m_i v_i^2 / 2E` (`v_i^2 / 2` for unit masses and `E = 1`).
    /// `None` when a velocity is left free.
    pub fn implied_probabilities(&self, solution: &Solution) -> Option<Vec<f64>> {
        let n = self.encoder.num_oscillators();
        let two_e = 2.0 * self.encoder.energy();
        let velocities = solution.values_for(&Symbol::family(SymbolKind::Velocity, n))?;
        Some(
            velocities
                .iter()
                .zip(self.encoder.masses())
                .map(|(v, m)| m * v * v / two_e)
                .collect(),
        )
    }

    /// Keeps the candidates whose implied computational-basis probabilities
    /// match `out_probs_comp` (first `N` entries) within the configured
    /// tolerance. Filtering an already filtered list returns it unchanged.
    ///
    /// The implied probability of oscillator `i` is `m_i v_i^2 / 2E`, the
    /// squared kinetic amplitude itself, rather than a bare `v_i^2 / 2`. The
    /// two coincide only for unit masses and `E = 1`; for any other network
    /// the bare form would reject the true velocities.
    pub fn eliminate_solution(&self, out_probs_comp: &[f64], solutions: Vec<Solution>) -> Result<Vec<Solution>> {
        let expected = leading("out_probs_comp", out_probs_comp, self.encoder.num_oscillators())?;
        let tolerance = self.config.tolerance;
        Ok(solutions
            .into_iter()
            .filter(|candidate| {
                let keep = self
                    .implied_probabilities(candidate)
                    .is_some_and(|implied| tolerance.all_close(expected, &implied));
                trace!("[kinetic] candidate {} kept={}", candidate, keep);
                keep
            })
            .collect())
    }

    /// Solves the kinetic register for the velocities.
    ///
    /// # Arguments
    /// * `out_probs_x` - Hadamard-basis probabilities; the first `N` entries are used.
    /// * `out_probs_comp` - Computational-basis probabilities; the first `N`
    ///   entries are used to filter candidates.
    ///
    /// # Returns
    /// * `Ok(PostProcessResult)` with one equation per kinetic slot and the
    ///   filtered candidates. More than one candidate may survive (the
    ///   global sign of the velocities is not observable here); see
    ///   [`PostProcessResult::unique_solution`].
    /// * `Err(OsqError::NoSolution)` if the system has no real solution or
    ///   filtering removes every candidate.
    pub fn post_process_ke(&self, out_probs_x: &[f64], out_probs_comp: &[f64]) -> Result<PostProcessResult> {
        let n = self.encoder.num_oscillators();
        let probs_x = leading("out_probs_x", out_probs_x, n)?;
        let probs_comp = leading("out_probs_comp", out_probs_comp, n)?;

        let equations: Vec<Equation> = self
            .x_measure_equations()?
            .into_iter()
            .zip(probs_x)
            .map(|(lhs, &measured)| Equation::new(lhs, measured))
            .collect();

        let unknowns = Symbol::family(SymbolKind::Velocity, n);
        let candidates = solve_squared(&equations, &unknowns, &self.config.tolerance)?;
        if candidates.is_empty() {
            return Err(OsqError::NoSolution {
                message: "Kinetic equations have no real solution".to_string(),
            });
        }
        let found = candidates.len();
        let solutions = self.eliminate_solution(probs_comp, candidates)?;
        debug!("[kinetic] N={} candidates={} kept={}", n, found, solutions.len());
        if solutions.is_empty() {
            return Err(OsqError::NoSolution {
                message: format!("None of {} kinetic candidates matches out_probs_comp", found),
            });
        }
        if solutions.len() > 1 {
            warn!("[kinetic] {} velocity solutions survive filtering", solutions.len());
        }
        Ok(PostProcessResult::new(equations, solutions))
    }
}
