//! Mapping from sequence index to cluster label.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::label::ClusterLabel;

/// Cluster label of every sequence, indexed by the sequence's position in the
/// input collection.
///
/// Label numbers carry no meaning beyond identity within one assignment; use
/// [`ClusterAssignment::canonical`] to compare partitions regardless of
/// numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClusterAssignment(Vec<ClusterLabel>);

impl ClusterAssignment {
    /// Wrap a label vector.
    #[must_use]
    pub fn new(labels: Vec<ClusterLabel>) -> Self {
        Self(labels)
    }

    /// Build an assignment from raw zero-based label indices.
    #[must_use]
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().map(ClusterLabel::new).collect())
    }

    /// Return the labels as a slice.
    #[must_use]
    pub fn labels(&self) -> &[ClusterLabel] {
        &self.0
    }

    /// Return the labels as raw indices.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.0.iter().map(|l| l.index()).collect()
    }

    /// Return the label of sequence `i`, if in range.
    #[must_use]
    pub fn label(&self, i: usize) -> Option<ClusterLabel> {
        self.0.get(i).copied()
    }

    /// Return the number of labelled sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if no sequence is labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the number of distinct labels in use.
    #[must_use]
    pub fn n_clusters(&self) -> usize {
        self.0.iter().collect::<BTreeSet<_>>().len()
    }

    /// Return the number of sequences carrying each label.
    ///
    /// Entry `c` holds the count for label `c`; the vector spans
    /// `0..=max_label`, so unused labels below the maximum count as zero.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let width = self.0.iter().map(|l| l.index() + 1).max().unwrap_or(0);
        let mut sizes = vec![0usize; width];
        for label in &self.0 {
            sizes[label.index()] += 1;
        }
        sizes
    }

    /// Return the indices of all sequences assigned to `label`.
    #[must_use]
    pub fn members(&self, label: ClusterLabel) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| (l == label).then_some(i))
            .collect()
    }

    /// Relabel clusters `0, 1, 2, ...` in order of first appearance.
    ///
    /// Two assignments describe the same partition iff their canonical forms
    /// are equal.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let mut seen: Vec<ClusterLabel> = Vec::new();
        let labels = self
            .0
            .iter()
            .map(|label| {
                let index = match seen.iter().position(|s| s == label) {
                    Some(pos) => pos,
                    None => {
                        seen.push(*label);
                        seen.len() - 1
                    }
                };
                ClusterLabel::new(index)
            })
            .collect();
        Self(labels)
    }

    /// Return true if both assignments group the sequences identically.
    #[must_use]
    pub fn same_partition(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl FromIterator<ClusterLabel> for ClusterAssignment {
    fn from_iter<I: IntoIterator<Item = ClusterLabel>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
