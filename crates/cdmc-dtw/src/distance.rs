//! DTW distance newtype wrapper.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative DTW distance value.
///
/// Infinite only when the final cell of the grid is unreachable, which
/// [`Dtw`](crate::Dtw) reports as an error instead of returning.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DtwDistance(f64);

impl DtwDistance {
    /// Distance between identical sequences.
    pub const ZERO: Self = Self(0.0);

    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw distance value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<DtwDistance> for f64 {
    fn from(d: DtwDistance) -> Self {
        d.0
    }
}

impl fmt::Display for DtwDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_six_decimals() {
        assert_eq!(format!("{}", DtwDistance::new(0.5)), "0.500000");
    }

    #[test]
    fn ordering_and_conversion() {
        let a = DtwDistance::new(1.0);
        let b = DtwDistance::new(3.0);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert!(a < b);
        assert_eq!(f64::from(b), 3.0);
        assert_eq!(DtwDistance::ZERO.value(), 0.0);
    }
}
