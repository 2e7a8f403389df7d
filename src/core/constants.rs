//! Numerical constants shared by the encoder and both decoders.

/// Constants fixing normalization and comparison thresholds
pub mod osq_constants {
    /// Single-qubit Hadamard normalization `1/sqrt(2)`.
    pub const FRAC_1_SQRT_2: f64 = std::f64::consts::FRAC_1_SQRT_2;
    /// Default relative tolerance for probability matching (numpy `allclose`).
    pub const DEFAULT_RTOL: f64 = 1e-5;
    /// Default absolute tolerance for probability matching (numpy `allclose`).
    pub const DEFAULT_ATOL: f64 = 1e-8;
    /// Coefficients below this magnitude are structural zeros.
    pub const COEFFICIENT_EPSILON: f64 = 1e-12;
}
