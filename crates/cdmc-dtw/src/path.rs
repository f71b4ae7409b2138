//! Warping path types for DTW alignment.

use crate::cost::LocalCost;

/// A single cell of an alignment, pairing index `i` of the first sequence with
/// index `j` of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WarpingStep {
    /// Index in the first sequence.
    pub i: usize,
    /// Index in the second sequence.
    pub j: usize,
}

/// An ordered sequence of warping steps from `(0, 0)` to `(len1-1, len2-1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        Self(steps)
    }

    /// Return the warping steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the steps as plain `(i, j)` pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(usize, usize)> {
        self.0.iter().map(|s| (s.i, s.j)).collect()
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every step advances `i`, `j` or both by exactly one.
    #[must_use]
    pub fn is_monotone(&self) -> bool {
        self.0.windows(2).all(|w| {
            match (w[1].i.checked_sub(w[0].i), w[1].j.checked_sub(w[0].j)) {
                (Some(di), Some(dj)) => di <= 1 && dj <= 1 && di + dj >= 1,
                _ => false,
            }
        })
    }

    /// Sum of local costs of every cell on the path.
    ///
    /// For the plain variant this equals the DTW distance.
    #[must_use]
    pub fn cost_along<C: LocalCost>(&self, cost: &C, a: &[C::Item], b: &[C::Item]) -> f64 {
        self.0.iter().map(|s| cost.cost(&a[s.i], &b[s.j])).sum()
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
