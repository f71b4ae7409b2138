use cdmc_dtw::MatrixError;

/// Errors from hierarchical clustering and flattening.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Returned when k is zero.
    #[error("k must be at least 1, got {k}")]
    InvalidK {
        /// The invalid k value provided.
        k: usize,
    },

    /// Returned when fewer sequences are provided than the requested k.
    #[error("need at least {k} sequences to form {k} clusters, got {n_sequences}")]
    TooFewSequences {
        /// Number of sequences in the distance matrix.
        n_sequences: usize,
        /// Requested number of clusters.
        k: usize,
    },

    /// Returned when the distance matrix covers no sequences.
    #[error("distance matrix must be non-empty")]
    EmptyMatrix,

    /// Wraps a validation error of an externally supplied distance matrix.
    #[error("invalid distance matrix: {0}")]
    Matrix(#[from] MatrixError),
}
