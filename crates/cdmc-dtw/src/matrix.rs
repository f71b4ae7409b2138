//! Lower-triangular distance matrix for pairwise DTW distances.

use crate::error::MatrixError;

/// Symmetric distance matrix stored as a lower-triangular flat vector.
///
/// For `n` sequences, stores `n*(n-1)/2` distances. Access is symmetric:
/// `get(i, j) == get(j, i)`. Diagonal is always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// `data` holds `data[row*(row-1)/2 + col]` for every `row > col`.
    pub(crate) fn from_raw(n: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), n * n.saturating_sub(1) / 2);
        Self { n, data }
    }

    /// Build a matrix from a full square table of distances.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MatrixError::Empty`] | `rows` is empty |
    /// | [`MatrixError::NotSquare`] | A row's length differs from the row count |
    /// | [`MatrixError::InvalidDistance`] | An entry is negative or non-finite |
    /// | [`MatrixError::NonZeroDiagonal`] | A self-distance is not zero |
    /// | [`MatrixError::Asymmetric`] | `rows[i][j] != rows[j][i]` |
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let n = rows.len();
        if n == 0 {
            return Err(MatrixError::Empty);
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n {
                return Err(MatrixError::NotSquare {
                    row,
                    len: values.len(),
                    expected: n,
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(MatrixError::InvalidDistance { row, col, value });
                }
            }
            if values[row] != 0.0 {
                return Err(MatrixError::NonZeroDiagonal {
                    index: row,
                    value: values[row],
                });
            }
        }

        let mut data = Vec::with_capacity(n * (n - 1) / 2);
        for row in 1..n {
            for col in 0..row {
                let (lower, upper) = (rows[row][col], rows[col][row]);
                if lower != upper {
                    return Err(MatrixError::Asymmetric {
                        row: col,
                        col: row,
                        upper,
                        lower,
                    });
                }
                data.push(lower);
            }
        }
        Ok(Self { n, data })
    }

    /// Return the number of sequences in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the matrix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the distance between sequences `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n, "row index {i} out of bounds for matrix of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for matrix of size {}", self.n);
        if i == j {
            return 0.0;
        }
        let (row, col) = if i > j { (i, j) } else { (j, i) };
        self.data[row * (row - 1) / 2 + col]
    }

    /// Iterate over all unique pairs `(i, j, distance)` where `i > j`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (1..self.n).flat_map(move |i| (0..i).map(move |j| (i, j, self.data[i * (i - 1) / 2 + j])))
    }

    /// Return the distances from sequence `i` to every sequence.
    #[must_use]
    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.n).map(|j| self.get(i, j)).collect()
    }

    /// Return the full square table.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n).map(|i| self.row(i)).collect()
    }

    /// Largest off-diagonal distance, or zero for fewer than two sequences.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }
}
