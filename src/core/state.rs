// src/core/state.rs

//! Symbolic building blocks of the encoded oscillator state.
//!
//! Every entry of the placeholder state is a real linear form in one family
//! of unknowns (positions or velocities), optionally multiplied by the
//! imaginary unit. Squaring such an entry gives `w * L^2`, which is the only
//! shape of expression the decoders ever need to invert.

use super::constants::osq_constants::COEFFICIENT_EPSILON;
use super::symbol::{Symbol, SymbolKind};
use num_complex::Complex;
use num_traits::Zero;
use std::fmt;

/// Real linear combination `Σ c_i * s_i` over one family of unknowns.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearForm {
    kind: SymbolKind,
    coeffs: Vec<f64>,
}

impl LinearForm {
    /// The zero form over `n` unknowns of `kind`.
    pub fn zero(kind: SymbolKind, n: usize) -> Self {
        Self { kind, coeffs: vec![0.0; n] }
    }

    /// `coeff * s_index` over `n` unknowns of `kind`.
    pub fn unit(kind: SymbolKind, n: usize, index: usize, coeff: f64) -> Self {
        let mut form = Self::zero(kind, n);
        form.coeffs[index] = coeff;
        form
    }

    pub fn from_coeffs(kind: SymbolKind, coeffs: Vec<f64>) -> Self {
        Self { kind, coeffs }
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Number of unknowns the form ranges over.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// True when every coefficient is a structural zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| c.abs() <= COEFFICIENT_EPSILON)
    }

    /// `self + factor * other`. Both forms must range over the same family.
    pub fn add_scaled(&mut self, other: &Self, factor: f64) {
        debug_assert_eq!(self.kind, other.kind, "mixing position and velocity forms");
        debug_assert_eq!(self.len(), other.len(), "mixing forms of different width");
        for (c, o) in self.coeffs.iter_mut().zip(&other.coeffs) {
            *c += factor * o;
        }
    }

    /// Value of the form when unknown `i` takes `values[i]`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coeffs.iter().zip(values).map(|(c, v)| c * v).sum()
    }

    /// Non-zero terms as `(symbol, coefficient)` pairs.
    pub fn terms(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
        self.coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| c.abs() > COEFFICIENT_EPSILON)
            .map(move |(i, &c)| {
                let symbol = match self.kind {
                    SymbolKind::Position => Symbol::position(i),
                    SymbolKind::Velocity => Symbol::velocity(i),
                };
                (symbol, c)
            })
    }
}

/// Writes `c0*s0 + c1*s1 - ...`, or `0` for an empty sum.
pub(crate) fn write_terms(
    f: &mut fmt::Formatter<'_>,
    terms: impl Iterator<Item = (Symbol, f64)>,
) -> fmt::Result {
    let mut first = true;
    for (symbol, c) in terms {
        let sign = if c < 0.0 { "-" } else { "+" };
        if first {
            if c < 0.0 {
                write!(f, "-")?;
            }
        } else {
            write!(f, " {} ", sign)?;
        }
        let magnitude = c.abs();
        if (magnitude - 1.0).abs() <= COEFFICIENT_EPSILON {
            write!(f, "{}", symbol)?;
        } else {
            write!(f, "{:.6}*{}", magnitude, symbol)?;
        }
        first = false;
    }
    if first {
        write!(f, "0")?;
    }
    Ok(())
}

impl fmt::Display for LinearForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_terms(f, self.terms())
    }
}

/// Unit prefactor of an amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Prefactor `1`: kinetic-energy amplitudes.
    Real,
    /// Prefactor `i`: potential-energy phase terms.
    Imaginary,
}

impl Phase {
    pub fn as_complex(&self) -> Complex<f64> {
        match self {
            Phase::Real => Complex::new(1.0, 0.0),
            Phase::Imaginary => Complex::i(),
        }
    }
}

/// One symbolic entry of the placeholder state: `phase * form`.
#[derive(Debug, Clone, PartialEq)]
pub struct Amplitude {
    phase: Phase,
    form: LinearForm,
}

impl Amplitude {
    pub fn new(phase: Phase, form: LinearForm) -> Self {
        Self { phase, form }
    }

    /// A structural zero slot (padding).
    pub fn zero(kind: SymbolKind, n: usize) -> Self {
        Self { phase: Phase::Real, form: LinearForm::zero(kind, n) }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &LinearForm {
        &self.form
    }

    pub fn is_zero(&self) -> bool {
        self.form.is_zero()
    }

    /// `self * self` (no conjugation). `i^2 = -1` ends up in the weight.
    pub fn squared(&self) -> SquaredForm {
        let weight = match self.phase {
            Phase::Real => 1.0,
            Phase::Imaginary => -1.0,
        };
        SquaredForm::new(weight, self.form.clone())
    }

    /// `|self|^2`.
    pub fn norm_sqr(&self) -> SquaredForm {
        SquaredForm::new(1.0, self.form.clone())
    }

    /// Numeric amplitude once every unknown has a value.
    pub fn evaluate(&self, values: &[f64]) -> Complex<f64> {
        if self.form.is_empty() {
            return Complex::zero();
        }
        self.phase.as_complex() * self.form.evaluate(values)
    }
}

impl fmt::Display for Amplitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::Real => write!(f, "{}", self.form),
            Phase::Imaginary if self.form.is_zero() => write!(f, "0"),
            Phase::Imaginary => write!(f, "i*({})", self.form),
        }
    }
}

/// `weight * L^2` for a real linear form `L`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquaredForm {
    weight: f64,
    form: LinearForm,
}

impl SquaredForm {
    pub fn new(weight: f64, form: LinearForm) -> Self {
        Self { weight, form }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn form(&self) -> &LinearForm {
        &self.form
    }

    /// Identically zero: either factor vanishes.
    pub fn is_zero(&self) -> bool {
        self.weight.abs() <= COEFFICIENT_EPSILON || self.form.is_zero()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        let l = self.form.evaluate(values);
        self.weight * l * l
    }
}

impl fmt::Display for SquaredForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        if (self.weight - 1.0).abs() > COEFFICIENT_EPSILON {
            write!(f, "{:.6}*", self.weight)?;
        }
        write!(f, "({})^2", self.form)
    }
}
