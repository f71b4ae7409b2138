//! Band constraint types for DTW computation.

use std::ops::Range;

/// Constraint on the DTW warping window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// No constraint: every cell of the grid is reachable.
    #[default]
    Unconstrained,

    /// Band of the given radius around the length-scaled diagonal. For equal
    /// lengths cell `(i, j)` is valid only if `|i - j| <= radius`.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Return the valid column range of `row` in an `n_rows x n_cols` grid.
    ///
    /// The scaled diagonal covers columns `floor(row * m / n)` through
    /// `ceil((row + 1) * m / n) - 1` of each row; the band widens that span by
    /// `radius` on both sides. Consecutive rows always overlap or touch
    /// diagonally, so `(n_rows - 1, n_cols - 1)` stays reachable from `(0, 0)`.
    #[must_use]
    pub fn column_range(&self, row: usize, n_rows: usize, n_cols: usize) -> Range<usize> {
        match self {
            Self::Unconstrained => 0..n_cols,
            Self::SakoeChibaRadius(r) => {
                let lo = row * n_cols / n_rows;
                let hi = ((row + 1) * n_cols).div_ceil(n_rows) - 1;
                let start = lo.saturating_sub(*r);
                let end = (hi + r + 1).min(n_cols);
                start..end
            }
        }
    }

    /// Return true if cell `(row, col)` lies inside the band.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize, n_rows: usize, n_cols: usize) -> bool {
        self.column_range(row, n_rows, n_cols).contains(&col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_full_range() {
        let c = BandConstraint::Unconstrained;
        assert_eq!(c.column_range(0, 10, 10), 0..10);
        assert_eq!(c.column_range(5, 10, 7), 0..7);
    }

    #[test]
    fn square_grid_matches_classic_band() {
        let c = BandConstraint::SakoeChibaRadius(2);
        assert_eq!(c.column_range(5, 10, 10), 3..8);
        assert_eq!(c.column_range(0, 10, 10), 0..3);
        assert_eq!(c.column_range(9, 10, 10), 7..10);
    }

    #[test]
    fn radius_exceeding_size_is_full_width() {
        let c = BandConstraint::SakoeChibaRadius(20);
        assert_eq!(c.column_range(3, 5, 5), 0..5);
    }

    #[test]
    fn wide_grid_follows_scaled_diagonal() {
        // 2 rows, 6 columns: row 0 covers 0..3, row 1 covers 3..6.
        let c = BandConstraint::SakoeChibaRadius(0);
        assert_eq!(c.column_range(0, 2, 6), 0..3);
        assert_eq!(c.column_range(1, 2, 6), 3..6);
    }

    #[test]
    fn tall_grid_rows_stay_connected() {
        let c = BandConstraint::SakoeChibaRadius(0);
        let (n, m) = (7, 3);
        let mut prev_end = 1;
        for row in 0..n {
            let range = c.column_range(row, n, m);
            assert!(!range.is_empty(), "row {row} is empty");
            assert!(range.start <= prev_end, "row {row} is disconnected");
            prev_end = range.end;
        }
        assert!(c.contains(n - 1, m - 1, n, m));
        assert!(c.contains(0, 0, n, m));
    }

    #[test]
    fn default_is_unconstrained() {
        assert_eq!(BandConstraint::default(), BandConstraint::Unconstrained);
    }
}
