// src/core/symbol.rs

use serde::{Serialize, Serializer};
use std::fmt;

/// Which classical degree of freedom an unknown stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    /// Oscillator displacement, displayed as `x{i}`.
    Position,
    /// Oscillator velocity, displayed as `v{i}`.
    Velocity,
}

/// A real-valued unknown tied to one oscillator.
///
/// Symbols are plain tagged slots: two symbols are the same unknown exactly
/// when kind and index agree, so equation lists built in separate calls
/// never share hidden state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    kind: SymbolKind,
    index: usize,
}

impl Symbol {
    /// Position unknown of oscillator `index`.
    pub fn position(index: usize) -> Self {
        Self { kind: SymbolKind::Position, index }
    }

    /// Velocity unknown of oscillator `index`.
    pub fn velocity(index: usize) -> Self {
        Self { kind: SymbolKind::Velocity, index }
    }

    /// The full family `[x0, .., x{n-1}]` or `[v0, .., v{n-1}]`.
    pub fn family(kind: SymbolKind, n: usize) -> Vec<Self> {
        (0..n).map(|index| Self { kind, index }).collect()
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SymbolKind::Position => write!(f, "x{}", self.index),
            SymbolKind::Velocity => write!(f, "v{}", self.index),
        }
    }
}

// Serialized by name so solution maps become `{"x0": .., "x1": ..}` in JSON.
impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
