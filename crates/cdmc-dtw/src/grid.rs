//! Accumulated-cost grid exposed for inspection.

use std::fmt;

/// The cumulative DTW cost of every cell, with the sentinel border stripped.
///
/// `get(i, j)` is the cheapest accumulated score of any admissible path from
/// `(0, 0)` to `(i, j)`; cells outside a band are `+inf`. For the globally
/// weighted variant the stored value is the combined score.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeCost {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl CumulativeCost {
    pub(crate) fn new(rows: usize, cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self { rows, cols, values }
    }

    /// Number of rows (length of the first sequence).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (length of the second sequence).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Accumulated cost at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "cell ({i}, {j}) out of bounds");
        self.values[i * self.cols + j]
    }

    /// The bottom-right cell, i.e. the DTW distance.
    #[must_use]
    pub fn final_cost(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// One row of the grid.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.cols..(i + 1) * self.cols]
    }
}

impl fmt::Display for CumulativeCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for (j, v) in self.row(i).iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                if v.is_finite() {
                    write!(f, "{v:>6.2}")?;
                } else {
                    write!(f, "{:>6}", "inf")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
