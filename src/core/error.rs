//! Error handling logic

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, OsqError>;

/// Failures raised while encoding an oscillator network or inverting
/// measurement statistics.
///
/// Every variant is raised at the boundary of the component that first
/// observes the problem: input validation at construction, mass validation
/// before any matrix is assembled, solver emptiness at call time.
#[derive(Debug, Clone, PartialEq, Eq, Error)] // Eq useful for testing error variants
pub enum OsqError {
    /// A mass entry is zero, negative or not finite, so `M^-1/2` is undefined.
    #[error("Invalid Mass: {message}")]
    InvalidMass {
        /// Index of the offending oscillator
        index: usize,
        /// InvalidMass failure message
        message: String,
    },

    /// The oscillator count is not a power of two, or two inputs disagree on it.
    #[error("Dimension Mismatch: {message}")]
    DimensionMismatch {
        /// DimensionMismatch failure message
        message: String,
    },

    /// The spring-constant matrix is asymmetric, negative or not finite.
    #[error("Invalid Coupling: {message}")]
    InvalidCoupling {
        /// InvalidCoupling failure message
        message: String,
    },

    /// The energy scale is not a positive finite number.
    #[error("Invalid Energy: {message}")]
    InvalidEnergy {
        /// InvalidEnergy failure message
        message: String,
    },

    /// A measured probability is NaN or infinite.
    #[error("Invalid Probability: {message}")]
    InvalidProbability {
        /// Position of the offending entry in its vector
        index: usize,
        /// InvalidProbability failure message
        message: String,
    },

    /// The equation system has no real solution, or every candidate was
    /// rejected by the consistency filter.
    #[error("No Solution: {message}")]
    NoSolution {
        /// NoSolution failure message
        message: String,
    },

    /// More than one candidate survived filtering. Advisory: the full
    /// candidate list is still available on the result.
    #[error("Ambiguous Solution ({candidates} candidates): {message}")]
    AmbiguousSolution {
        /// Number of surviving candidates
        candidates: usize,
        /// AmbiguousSolution failure message
        message: String,
    },

    /// An encoded state or matrix failed a validation check.
    #[error("Validation Failed: {message}")]
    ValidationFailed {
        /// ValidationFailed failure message
        message: String,
    },
}
