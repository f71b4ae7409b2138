//! Error types for DTW computation and distance matrix construction.

/// Errors from sequence validation and DTW computation.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when an empty slice is provided as a sequence.
    #[error("sequence must be non-empty")]
    EmptySequence,

    /// Returned when one sequence of a pairwise batch is empty.
    #[error("sequence {index} of the batch is empty")]
    EmptySequenceAt {
        /// Position of the empty sequence in the batch.
        index: usize,
    },

    /// Returned when a real-valued sequence contains NaN or an infinity.
    #[error("sequence contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when the globally weighted variant is configured with a cost
    /// weight outside `(0, 1]`.
    #[error("cost weight must lie in (0, 1], got {weight}")]
    InvalidCostWeight {
        /// The rejected weight.
        weight: f64,
    },

    /// Returned when no admissible path reaches the final cell, e.g. when a
    /// custom local cost returns infinity everywhere.
    #[error("no finite-cost alignment between sequences of length {len_a} and {len_b}")]
    Unreachable {
        /// Length of the first sequence.
        len_a: usize,
        /// Length of the second sequence.
        len_b: usize,
    },
}

/// Errors from validating an externally supplied distance matrix.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// Returned when the matrix has no rows.
    #[error("distance matrix must be non-empty")]
    Empty,

    /// Returned when a row length differs from the number of rows.
    #[error("distance matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Length of that row.
        len: usize,
        /// Number of rows in the matrix.
        expected: usize,
    },

    /// Returned when an entry is negative, NaN or infinite.
    #[error("distance at ({row}, {col}) must be finite and non-negative, got {value}")]
    InvalidDistance {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The rejected value.
        value: f64,
    },

    /// Returned when a diagonal entry is not zero.
    #[error("self-distance at index {index} must be zero, got {value}")]
    NonZeroDiagonal {
        /// Diagonal index.
        index: usize,
        /// The rejected value.
        value: f64,
    },

    /// Returned when `D[i][j]` and `D[j][i]` disagree.
    #[error("distance matrix is not symmetric at ({row}, {col}): {upper} vs {lower}")]
    Asymmetric {
        /// Row index of the upper-triangle entry.
        row: usize,
        /// Column index of the upper-triangle entry.
        col: usize,
        /// Value at `(row, col)`.
        upper: f64,
        /// Value at `(col, row)`.
        lower: f64,
    },
}
