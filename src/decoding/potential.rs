// src/decoding/potential.rs

use super::{DecoderConfig, PostProcessResult, leading};
use crate::core::{OsqError, Result, Symbol, SymbolKind};
use crate::encoding::{EncodedState, potential_end};
use crate::solver::{Equation, solve_squared};
use crate::validation::validate_probabilities;
use log::debug;

/// Potential-branch decoder: recovers positions from the computational-basis
/// probabilities of the mu terms.
///
/// No second measurement is available to tell sign-flipped position sets
/// apart, so every real solution is returned.
#[derive(Debug, Clone, Copy)]
pub struct EquationSolverPE<'a> {
    state: &'a EncodedState,
    config: DecoderConfig,
}

impl<'a> EquationSolverPE<'a> {
    pub fn new(state: &'a EncodedState) -> Self {
        Self::with_config(state, DecoderConfig::default())
    }

    pub fn with_config(state: &'a EncodedState, config: DecoderConfig) -> Self {
        Self { state, config }
    }

    /// Pairs every non-zero `|mu_k|^2` with its measured probability.
    ///
    /// Terms that vanish identically (a zero entry of `K`) carry no
    /// information and produce no equation.
    pub fn eq_association(&self, out_probs_pe: &[f64]) -> Result<Vec<Equation>> {
        let mu = self.state.mu();
        if out_probs_pe.len() != mu.len() {
            return Err(OsqError::DimensionMismatch {
                message: format!(
                    "Potential probability slice has {} entries for {} mu terms",
                    out_probs_pe.len(),
                    mu.len()
                ),
            });
        }
        validate_probabilities("out_probs_pe", out_probs_pe)?;
        Ok(mu
            .iter()
            .zip(out_probs_pe)
            .map(|(term, &measured)| (term.norm_sqr(), measured))
            .filter(|(lhs, _)| !lhs.is_zero())
            .map(|(lhs, measured)| Equation::new(lhs, measured))
            .collect())
    }

    /// Solves the potential register for the positions.
    ///
    /// Uses entries `N..N(N+3)/2` of `out_probs_comp` and returns every real
    /// solution without filtering.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `out_probs_comp` is too short.
    /// * `NoSolution` if the equations have no real solution.
    pub fn post_process_pe(&self, out_probs_comp: &[f64]) -> Result<PostProcessResult> {
        let n = self.state.num_oscillators();
        let out_probs_pe = &leading("out_probs_comp", out_probs_comp, potential_end(n))?[n..];
        let equations = self.eq_association(out_probs_pe)?;

        let unknowns = Symbol::family(SymbolKind::Position, n);
        let solutions = solve_squared(&equations, &unknowns, &self.config.tolerance)?;
        debug!("[potential] N={} equations={} solutions={}", n, equations.len(), solutions.len());
        if solutions.is_empty() {
            return Err(OsqError::NoSolution {
                message: "Potential equations have no real solution".to_string(),
            });
        }
        Ok(PostProcessResult::new(equations, solutions))
    }
}
