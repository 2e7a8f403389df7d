// src/solver/mod.rs

//! Closed-form inversion of squared-linear equation systems.
//!
//! Every equation produced by the decoders has the shape
//! `w * L(u)^2 - p = 0` with `L` a real linear form. Each one fixes `L(u)`
//! up to sign, so the real solution set is found by extracting `sqrt(p / w)`
//! and enumerating signs, keeping the accepted linear constraints in reduced
//! row echelon form:
//!
//! - an equation whose form is a combination of already accepted rows does
//!   not branch; its implied value is only checked for consistency,
//! - an independent equation branches on `±sqrt(p / w)` (once when `p ≈ 0`),
//! - at the leaves, pivot unknowns are expressed in the free unknowns.
//!
//! Branching happens at most once per pivot, so at most `2^rank` candidates
//! are produced.

use crate::core::constants::osq_constants::{COEFFICIENT_EPSILON, DEFAULT_ATOL, DEFAULT_RTOL};
use crate::core::state::write_terms;
use crate::core::{OsqError, Result, SquaredForm, Symbol};
use log::{debug, trace};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Closeness test in the style of numpy's `allclose`:
/// `|actual - expected| <= atol + rtol * |expected|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { rtol: DEFAULT_RTOL, atol: DEFAULT_ATOL }
    }
}

impl Tolerance {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    pub fn is_close(&self, actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= self.atol + self.rtol * expected.abs()
    }

    /// Element-wise `is_close`; vectors of different length never match.
    pub fn all_close(&self, actual: &[f64], expected: &[f64]) -> bool {
        actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, e)| self.is_close(*a, *e))
    }
}

/// `lhs - measured = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    lhs: SquaredForm,
    measured: f64,
}

impl Equation {
    pub fn new(lhs: SquaredForm, measured: f64) -> Self {
        Self { lhs, measured }
    }

    pub fn lhs(&self) -> &SquaredForm {
        &self.lhs
    }

    pub fn measured(&self) -> f64 {
        self.measured
    }

    /// Value of `lhs - measured` at a point.
    pub fn residual(&self, values: &[f64]) -> f64 {
        self.lhs.evaluate(values) - self.measured
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.measured < 0.0 {
            write!(f, "{} + {}", self.lhs, -self.measured)
        } else {
            write!(f, "{} - {}", self.lhs, self.measured)
        }
    }
}

impl Serialize for Equation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `constant + Σ c_f * s_f` over free unknowns.
#[derive(Debug, Clone, PartialEq)]
pub struct Affine {
    constant: f64,
    terms: Vec<(Symbol, f64)>,
}

impl Affine {
    pub fn constant(value: f64) -> Self {
        Self { constant: value, terms: Vec::new() }
    }

    pub fn with_terms(constant: f64, terms: Vec<(Symbol, f64)>) -> Self {
        Self { constant, terms }
    }

    /// The numeric value when no free unknown is involved.
    pub fn as_constant(&self) -> Option<f64> {
        self.terms.is_empty().then_some(self.constant)
    }

    pub fn offset(&self) -> f64 {
        self.constant
    }

    pub fn terms(&self) -> &[(Symbol, f64)] {
        &self.terms
    }

    fn approx_eq(&self, other: &Self, tolerance: &Tolerance) -> bool {
        tolerance.is_close(self.constant, other.constant)
            && self.terms.len() == other.terms.len()
            && self
                .terms
                .iter()
                .zip(&other.terms)
                .all(|((sa, ca), (sb, cb))| sa == sb && tolerance.is_close(*ca, *cb))
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", self.constant);
        }
        write_terms(f, self.terms.iter().copied())?;
        if self.constant.abs() > COEFFICIENT_EPSILON {
            let sign = if self.constant < 0.0 { "-" } else { "+" };
            write!(f, " {} {}", sign, self.constant.abs())?;
        }
        Ok(())
    }
}

// Constants serialize as plain numbers, parametric values as expressions.
impl Serialize for Affine {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_constant() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.collect_str(self),
        }
    }
}

/// One solution set: unknown -> value. Free unknowns are absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Solution {
    values: BTreeMap<Symbol, Affine>,
}

impl Solution {
    pub fn from_constants(entries: impl IntoIterator<Item = (Symbol, f64)>) -> Self {
        Self { values: entries.into_iter().map(|(s, v)| (s, Affine::constant(v))).collect() }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Affine> {
        self.values.get(symbol)
    }

    /// Numeric value of `symbol`, if it is solved to a constant.
    pub fn value(&self, symbol: &Symbol) -> Option<f64> {
        self.get(symbol).and_then(Affine::as_constant)
    }

    /// Numeric values for `symbols` in order, or `None` if any is missing or
    /// parametric.
    pub fn values_for(&self, symbols: &[Symbol]) -> Option<Vec<f64>> {
        symbols.iter().map(|s| self.value(s)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Affine)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn approx_eq(&self, other: &Self, tolerance: &Tolerance) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|((sa, va), (sb, vb))| sa == sb && va.approx_eq(vb, tolerance))
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (symbol, value)) in self.values.iter().enumerate() {
            write!(f, "{}{}: {}", if i > 0 { ", " } else { "" }, symbol, value)?;
        }
        write!(f, "}}")
    }
}

/// Accepted constraint `x_pivot + Σ coeffs[c] x_c = rhs`, kept in RREF.
#[derive(Debug, Clone)]
struct Row {
    pivot: usize,
    coeffs: Vec<f64>,
    rhs: f64,
}

/// Rewrites `form` on the current solution set: `L(u) = residual · u + offset`
/// where `residual` vanishes on every pivot column.
fn reduce(rows: &[Row], coeffs: &[f64]) -> (Vec<f64>, f64) {
    let mut residual = coeffs.to_vec();
    let mut offset = 0.0;
    for row in rows {
        let factor = residual[row.pivot];
        if factor != 0.0 {
            for (r, c) in residual.iter_mut().zip(&row.coeffs) {
                *r -= factor * c;
            }
            offset += factor * row.rhs;
        }
    }
    (residual, offset)
}

/// Adds `residual · u = target` to `rows`, eliminating its pivot elsewhere.
fn accept(rows: &[Row], residual: &[f64], target: f64) -> Vec<Row> {
    let pivot = residual
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map_or(0, |(i, _)| i);
    let scale = residual[pivot];
    let new_row = Row {
        pivot,
        coeffs: residual.iter().map(|c| c / scale).collect(),
        rhs: target / scale,
    };
    let mut next: Vec<Row> = rows
        .iter()
        .map(|row| {
            let factor = row.coeffs[pivot];
            let mut row = row.clone();
            if factor != 0.0 {
                for (r, c) in row.coeffs.iter_mut().zip(&new_row.coeffs) {
                    *r -= factor * c;
                }
                row.coeffs[pivot] = 0.0;
                row.rhs -= factor * new_row.rhs;
            }
            row
        })
        .collect();
    next.push(new_row);
    next
}

struct Search<'a> {
    equations: &'a [Equation],
    unknowns: &'a [Symbol],
    tolerance: &'a Tolerance,
    found: Vec<Solution>,
}

impl Search<'_> {
    fn descend(&mut self, next: usize, rows: Vec<Row>) {
        let Some(equation) = self.equations.get(next) else {
            self.record(&rows);
            return;
        };
        let weight = equation.lhs().weight();
        let measured = equation.measured();
        let coeffs = equation.lhs().form().coeffs();
        let scale = coeffs.iter().fold(1.0f64, |acc, c| acc.max(c.abs()));
        let (residual, offset) = reduce(&rows, coeffs);

        if residual.iter().all(|r| r.abs() <= COEFFICIENT_EPSILON * scale) {
            // L(u) is already fixed to `offset`; only check consistency.
            if self.tolerance.is_close(weight * offset * offset, measured) {
                self.descend(next + 1, rows);
            } else {
                trace!("[solver] equation {} inconsistent: {} vs {}", next, weight * offset * offset, measured);
            }
            return;
        }

        let ratio = measured / weight;
        if ratio < 0.0 && measured.abs() > self.tolerance.atol {
            trace!("[solver] equation {} has no real root ({} / {})", next, measured, weight);
            return;
        }
        if measured.abs() <= self.tolerance.atol {
            self.descend(next + 1, accept(&rows, &residual, -offset));
            return;
        }
        let root = ratio.max(0.0).sqrt();
        for sign in [1.0, -1.0] {
            self.descend(next + 1, accept(&rows, &residual, sign * root - offset));
        }
    }

    fn record(&mut self, rows: &[Row]) {
        let pivots: Vec<usize> = rows.iter().map(|r| r.pivot).collect();
        let values = rows
            .iter()
            .map(|row| {
                let terms = row
                    .coeffs
                    .iter()
                    .enumerate()
                    .filter(|(c, v)| !pivots.contains(c) && v.abs() > COEFFICIENT_EPSILON)
                    .map(|(c, v)| (self.unknowns[c], -v))
                    .collect();
                (self.unknowns[row.pivot], Affine::with_terms(row.rhs, terms))
            })
            .collect();
        let solution = Solution { values };
        if !self.found.iter().any(|s| s.approx_eq(&solution, self.tolerance)) {
            self.found.push(solution);
        }
    }
}

/// All real solutions of `equations` for `unknowns`.
///
/// Column `c` of every equation's linear form is the coefficient of
/// `unknowns[c]`. An empty equation list yields one empty solution (every
/// unknown free), matching a symbolic solver's behaviour.
pub fn solve_squared(equations: &[Equation], unknowns: &[Symbol], tolerance: &Tolerance) -> Result<Vec<Solution>> {
    for (i, eq) in equations.iter().enumerate() {
        let form = eq.lhs().form();
        if form.len() != unknowns.len() || unknowns.iter().any(|u| u.kind() != form.kind()) {
            return Err(OsqError::DimensionMismatch {
                message: format!(
                    "Equation {} ranges over {} {:?} unknowns, solving for {}",
                    i,
                    form.len(),
                    form.kind(),
                    unknowns.len()
                ),
            });
        }
        if !eq.measured().is_finite() || !eq.lhs().weight().is_finite() {
            return Err(OsqError::InvalidProbability {
                index: i,
                message: format!("Equation {} is not finite: {}", i, eq),
            });
        }
        if eq.lhs().is_zero() {
            return Err(OsqError::DimensionMismatch {
                message: format!("Equation {} has an identically zero left-hand side", i),
            });
        }
    }

    let mut search = Search { equations, unknowns, tolerance, found: Vec::new() };
    search.descend(0, Vec::new());
    debug!(
        "[solver] {} equations over {} unknowns -> {} solutions",
        equations.len(),
        unknowns.len(),
        search.found.len()
    );
    Ok(search.found)
}
