use cdmc_cluster::ClusterError;
use cdmc_dtw::DtwError;
use cdmc_model::ModelError;

/// Errors from building contingency tables and agreement scores.
#[derive(Debug, thiserror::Error)]
pub enum AgreementError {
    /// Returned when there are no labels (or no counts) to compare.
    #[error("cannot compare empty partitions")]
    Empty,

    /// Returned when the two label vectors differ in length.
    #[error("label vectors differ in length: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first label vector.
        left: usize,
        /// Length of the second label vector.
        right: usize,
    },

    /// Returned when a directly supplied count table is not rectangular.
    #[error("contingency row {row} has {len} columns, expected {expected}")]
    Ragged {
        /// Offending row.
        row: usize,
        /// Length of that row.
        len: usize,
        /// Length of the first row.
        expected: usize,
    },
}

/// Errors from the convergence loop.
#[derive(Debug, thiserror::Error)]
pub enum ConvergeError {
    /// Returned when k is zero.
    #[error("k must be at least 1, got {k}")]
    InvalidK {
        /// The invalid k value provided.
        k: usize,
    },

    /// Returned when no sequences are supplied.
    #[error("sequence collection must be non-empty")]
    EmptyDataset,

    /// Returned when the similarity threshold is not a finite value in `[0, 1]`.
    #[error("similarity threshold must lie in [0, 1], got {threshold}")]
    InvalidThreshold {
        /// The rejected threshold.
        threshold: f64,
    },

    /// Returned when an initial assignment does not cover every sequence.
    #[error("initial assignment labels {got} sequences, expected {expected}")]
    AssignmentLength {
        /// Number of sequences.
        expected: usize,
        /// Number of labels supplied.
        got: usize,
    },

    /// Returned when an initial assignment uses a label outside `[0, k)`.
    #[error("initial assignment uses label {label}, k is {k}")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// Configured number of clusters.
        k: usize,
    },

    /// Wraps a DTW error from the pairwise distance step.
    #[error("DTW error: {0}")]
    Dtw(#[from] DtwError),

    /// Wraps a clustering error from the initial partition.
    #[error("clustering error: {0}")]
    Cluster(#[from] ClusterError),

    /// Wraps a model error from per-cluster training.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
