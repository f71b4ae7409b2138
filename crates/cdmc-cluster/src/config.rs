//! Configuration builder for hierarchical clustering.

use cdmc_dtw::DistanceMatrix;
use tracing::{info, instrument};

use crate::assignment::ClusterAssignment;
use crate::dendrogram::Dendrogram;
use crate::error::ClusterError;
use crate::linkage::Linkage;

/// Configuration for agglomerative clustering followed by stack flattening.
///
/// Construct via [`HierarchicalConfig::new`], then chain `with_*` methods to
/// override defaults.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `linkage` | [`Linkage::Average`] |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchicalConfig {
    k: usize,
    linkage: Linkage,
}

impl HierarchicalConfig {
    /// Create a configuration targeting `k` clusters.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::InvalidK`] | `k` is zero |
    pub fn new(k: usize) -> Result<Self, ClusterError> {
        if k == 0 {
            return Err(ClusterError::InvalidK { k });
        }
        Ok(Self {
            k,
            linkage: Linkage::default(),
        })
    }

    /// Set the linkage strategy.
    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Return the target number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Return the linkage strategy.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Build the dendrogram without flattening it.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::EmptyMatrix`] | `matrix` covers no sequences |
    pub fn dendrogram(&self, matrix: &DistanceMatrix) -> Result<Dendrogram, ClusterError> {
        Dendrogram::build(matrix, self.linkage)
    }

    /// Cluster the sequences behind `matrix` into at most `k` groups.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::EmptyMatrix`] | `matrix` covers no sequences |
    /// | [`ClusterError::TooFewSequences`] | `k` exceeds the number of sequences |
    #[instrument(skip(self, matrix), fields(n = matrix.len(), k = self.k))]
    pub fn fit(&self, matrix: &DistanceMatrix) -> Result<ClusterAssignment, ClusterError> {
        if matrix.is_empty() {
            return Err(ClusterError::EmptyMatrix);
        }
        if self.k > matrix.len() {
            return Err(ClusterError::TooFewSequences {
                n_sequences: matrix.len(),
                k: self.k,
            });
        }
        let assignment = self.dendrogram(matrix)?.partition(self.k)?;
        info!(
            clusters = assignment.n_clusters(),
            linkage = self.linkage.name(),
            "initial partition"
        );
        Ok(assignment)
    }

    /// Validate a full square table of distances, then [`fit`](Self::fit) it.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::Matrix`] | The table is empty, not square, asymmetric, has a non-zero diagonal or an invalid entry |
    /// | [`ClusterError::TooFewSequences`] | `k` exceeds the number of sequences |
    pub fn fit_rows(&self, rows: &[Vec<f64>]) -> Result<ClusterAssignment, ClusterError> {
        let matrix = DistanceMatrix::from_rows(rows)?;
        self.fit(&matrix)
    }
}
