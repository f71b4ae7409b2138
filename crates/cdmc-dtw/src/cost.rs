//! Local cost functions comparing one element of each sequence.

use std::fmt;

use crate::sequence::Symbol;

/// Cost of aligning element `a` of one sequence with element `b` of another.
///
/// Implementations must be non-negative and symmetric for the resulting DTW
/// distance to be a symmetric dissimilarity.
pub trait LocalCost {
    /// Element type of the sequences being compared.
    type Item;

    /// Return the cost of matching `a` with `b`.
    fn cost(&self, a: &Self::Item, b: &Self::Item) -> f64;
}

/// 0/1 cost for discrete symbols: 0 when equal, 1 otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymbolMismatch;

impl LocalCost for SymbolMismatch {
    type Item = Symbol;

    fn cost(&self, a: &Symbol, b: &Symbol) -> f64 {
        if a == b { 0.0 } else { 1.0 }
    }
}

/// `|a - b|` for real-valued samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsoluteDifference;

impl LocalCost for AbsoluteDifference {
    type Item = f64;

    fn cost(&self, a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }
}

/// `(a - b)^2` for real-valued samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredDifference;

impl LocalCost for SquaredDifference {
    type Item = f64;

    fn cost(&self, a: &f64, b: &f64) -> f64 {
        (a - b).powi(2)
    }
}

/// Adapter turning any `Fn(f64, f64) -> f64` into a [`LocalCost`].
#[derive(Clone, Copy)]
pub struct FnCost<F>(pub F);

impl<F> LocalCost for FnCost<F>
where
    F: Fn(f64, f64) -> f64,
{
    type Item = f64;

    fn cost(&self, a: &f64, b: &f64) -> f64 {
        (self.0)(*a, *b)
    }
}

impl<F> fmt::Debug for FnCost<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCost(..)")
    }
}
