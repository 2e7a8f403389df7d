// src/core/mod.rs

//! Core data structures and types

// Declare modules within core
pub mod error;
pub mod matrix;
pub mod symbol;
pub mod state;

// Re-export public types for convenient access via `osq::core::TypeName`
pub use error::{OsqError, Result};
pub use matrix::Matrix;
pub use symbol::{Symbol, SymbolKind};
pub use state::{Amplitude, LinearForm, Phase, SquaredForm};

pub mod constants;
pub use constants::osq_constants::{DEFAULT_ATOL, DEFAULT_RTOL, FRAC_1_SQRT_2}; // Re-export
