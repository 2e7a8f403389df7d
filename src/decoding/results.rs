// src/decoding/results.rs
use crate::core::{OsqError, Result};
use crate::solver::{Equation, Solution};
use serde::Serialize;
use std::fmt;

/// Output of one post-processing call.
///
/// Serializes as `{"Equations": [...], "Solutions": [...]}`: equations as
/// their `lhs - measured` expressions, solutions as `unknown -> value` maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostProcessResult {
    /// Zero-valued expressions that were solved, kept for diagnostics.
    #[serde(rename = "Equations")]
    equations: Vec<Equation>,
    /// Candidate solution sets, in discovery order.
    #[serde(rename = "Solutions")]
    solutions: Vec<Solution>,
}

impl PostProcessResult {
    /// Creates a result from its parts. (Internal visibility)
    pub(crate) fn new(equations: Vec<Equation>, solutions: Vec<Solution>) -> Self {
        Self { equations, solutions }
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    /// Splits the result into `(equations, solutions)`.
    pub fn into_parts(self) -> (Vec<Equation>, Vec<Solution>) {
        (self.equations, self.solutions)
    }

    /// The single candidate, if there is exactly one.
    ///
    /// # Errors
    /// * `NoSolution` if there are no candidates.
    /// * `AmbiguousSolution` if more than one candidate is left; the caller
    ///   can still inspect them through [`solutions`](Self::solutions).
    pub fn unique_solution(&self) -> Result<&Solution> {
        match self.solutions.as_slice() {
            [only] => Ok(only),
            [] => Err(OsqError::NoSolution { message: "Result holds no solution".to_string() }),
            many => Err(OsqError::AmbiguousSolution {
                candidates: many.len(),
                message: "More than one solution is consistent with the measurements".to_string(),
            }),
        }
    }
}

impl fmt::Display for PostProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Post-processing Results:")?;
        writeln!(f, "  Equations:")?;
        for eq in &self.equations {
            writeln!(f, "    {} = 0", eq)?;
        }
        if self.solutions.is_empty() {
            writeln!(f, "  No solutions.")?;
        } else {
            writeln!(f, "  Solutions:")?;
            for solution in &self.solutions {
                writeln!(f, "    {}", solution)?;
            }
        }
        Ok(())
    }
}
