// src/lib.rs

//! `osq` - Oscillators to qubits
//!
//! Encodes a network of coupled classical harmonic oscillators (masses joined
//! by springs) into a Hermitian matrix for quantum simulation, and inverts
//! measured probability vectors back into the classical velocities and
//! positions.
//!
//! - [`hamiltonian`] builds `F`, `B` and the padded `2N^2 x 2N^2` Hamiltonian.
//! - [`encoding`] builds the symbolic placeholder state both decoders read.
//! - [`decoding`] solves the kinetic (velocity) and potential (position)
//!   registers from measured probabilities.
//!
//! Executing the Hamiltonian and sampling probabilities is left to an
//! external backend.

pub mod core;
pub mod operations;
pub mod hamiltonian;
pub mod encoding;
pub mod solver;
pub mod decoding;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use core::{Matrix, OsqError, Result, Symbol, SymbolKind};
pub use hamiltonian::{HamiltonianBuilder, Incidence};
pub use encoding::{EncodedState, IdealProbabilities, StateEncoder};
pub use solver::{Equation, Solution, Tolerance};
pub use decoding::{DecoderConfig, EquationSolverPE, MeasurementDecoder, PostProcessResult};
pub use validation::{check_hermitian, check_normalization};

// Example 1: Hamiltonian for two coupled oscillators
// Builds H for K = [[1, 1], [1, 1]], M = [1, 1] and checks the postconditions
// a simulation backend relies on.
/// ```
/// use osq::{HamiltonianBuilder, Matrix, OsqError, check_hermitian};
///
/// fn main() -> Result<(), OsqError> {
///     let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
///     let builder = HamiltonianBuilder::new(1, k, vec![1.0, 1.0])?;
///     let h = builder.compute_hamiltonian()?;
///
///     // 2N^2 x 2N^2 with N = 2
///     assert_eq!(h.rows(), 8);
///     check_hermitian(&h, None)?;
///     // Diagonal blocks are zero.
///     assert!(h.block(0, 0, 4, 4).is_zero());
///     assert!(h.block(4, 4, 4, 4).is_zero());
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Round trip through a noiseless backend
// Encodes the initial conditions, computes the probabilities a perfect
// measurement would give, and decodes them again.
/// ```
/// use osq::{EquationSolverPE, Matrix, MeasurementDecoder, OsqError, StateEncoder, Symbol};
///
/// fn main() -> Result<(), OsqError> {
///     let k = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]])?;
///     let encoder = StateEncoder::new(1.0, k, vec![1.0, 1.0], vec![1.0, -1.0], vec![0.0, 0.0])?;
///     let probs = encoder.ideal_probabilities()?;
///
///     let kinetic = MeasurementDecoder::new(&encoder).post_process_ke(&probs.out_probs_x, &probs.out_probs_comp)?;
///     let velocities = kinetic.unique_solution()?;
///     assert_eq!(velocities.value(&Symbol::velocity(0)), Some(0.0));
///
///     let potential = EquationSolverPE::new(encoder.state()).post_process_pe(&probs.out_probs_comp)?;
///     println!("{}", potential);
///     // x = (1, -1) and its mirror image (-1, 1) explain the data equally well.
///     assert_eq!(potential.solutions().len(), 2);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
