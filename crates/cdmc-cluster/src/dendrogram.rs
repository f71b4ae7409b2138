//! Agglomerative dendrogram construction.

use cdmc_dtw::DistanceMatrix;
use tracing::{debug, instrument};

use crate::assignment::ClusterAssignment;
use crate::error::ClusterError;
use crate::flatten::{self, ClusterWrapperNode};
use crate::linkage::Linkage;

/// One node of a [`Dendrogram`] arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DendrogramNode {
    /// A single sequence, identified by its 1-based position in the input.
    Leaf {
        /// 1-based sequence id.
        id: usize,
    },
    /// The union of two child clusters.
    Merge {
        /// Linkage distance at which the children were joined.
        distance: f64,
        /// Arena index of the first child.
        left: usize,
        /// Arena index of the second child.
        right: usize,
        /// Number of leaves below this node.
        size: usize,
    },
}

impl DendrogramNode {
    /// Return true for leaves.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Merge distance, zero for leaves.
    #[must_use]
    pub fn distance(&self) -> f64 {
        match self {
            Self::Leaf { .. } => 0.0,
            Self::Merge { distance, .. } => *distance,
        }
    }

    /// Number of leaves below this node.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Merge { size, .. } => *size,
        }
    }

    /// Arena indices of the two children, if any.
    #[must_use]
    pub fn children(&self) -> Option<(usize, usize)> {
        match self {
            Self::Leaf { .. } => None,
            Self::Merge { left, right, .. } => Some((*left, *right)),
        }
    }
}

/// Binary merge tree over `n` sequences.
///
/// Nodes live in an arena: indices `0..n` hold the leaves (sequence ids
/// `1..=n`), followed by the `n - 1` merges in the order they happened. The
/// root is the last node.
#[derive(Debug, Clone)]
pub struct Dendrogram {
    nodes: Vec<DendrogramNode>,
    n_leaves: usize,
    linkage: Linkage,
}

impl Dendrogram {
    /// Build the dendrogram of a distance matrix.
    ///
    /// At every step the closest pair of active clusters is merged; equal
    /// distances go to the lexicographically smallest pair of cluster slots.
    /// Distances to the merged cluster follow the [`Linkage`] update. Runs in
    /// O(n^3) time and O(n^2) space.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::EmptyMatrix`] | `matrix` covers no sequences |
    #[instrument(skip(matrix), fields(n = matrix.len(), linkage = linkage.name()))]
    pub fn build(matrix: &DistanceMatrix, linkage: Linkage) -> Result<Self, ClusterError> {
        let n = matrix.len();
        if n == 0 {
            return Err(ClusterError::EmptyMatrix);
        }

        let mut dist: Vec<f64> = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| matrix.get(i, j))
            .collect();
        let mut nodes: Vec<DendrogramNode> = (1..=n).map(|id| DendrogramNode::Leaf { id }).collect();
        nodes.reserve(n.saturating_sub(1));
        let mut slot_node: Vec<usize> = (0..n).collect();
        let mut sizes = vec![1usize; n];
        let mut active = vec![true; n];

        for _ in 1..n {
            let mut best: Option<(usize, usize, f64)> = None;
            for i in (0..n).filter(|&i| active[i]) {
                for j in (i + 1..n).filter(|&j| active[j]) {
                    let d = dist[i * n + j];
                    if best.is_none_or(|(_, _, bd)| d < bd) {
                        best = Some((i, j, d));
                    }
                }
            }
            let Some((i, j, distance)) = best else { break };

            nodes.push(DendrogramNode::Merge {
                distance,
                left: slot_node[i],
                right: slot_node[j],
                size: sizes[i] + sizes[j],
            });

            for k in (0..n).filter(|&k| active[k] && k != i && k != j) {
                let updated = linkage.update(dist[i * n + k], dist[j * n + k], sizes[i], sizes[j]);
                dist[i * n + k] = updated;
                dist[k * n + i] = updated;
            }
            active[j] = false;
            sizes[i] += sizes[j];
            slot_node[i] = nodes.len() - 1;
        }

        debug!(nodes = nodes.len(), "dendrogram built");
        Ok(Self {
            nodes,
            n_leaves: n,
            linkage,
        })
    }

    /// Arena index of the root.
    #[must_use]
    pub fn root(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Return the node at arena index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn node(&self, index: usize) -> &DendrogramNode {
        &self.nodes[index]
    }

    /// Total number of nodes (`2n - 1`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a dendrogram holds at least one leaf.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of sequences.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Linkage used to build the tree.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Merge distances in merge order.
    #[must_use]
    pub fn merge_distances(&self) -> Vec<f64> {
        self.nodes[self.n_leaves..].iter().map(DendrogramNode::distance).collect()
    }

    /// Sorted 1-based sequence ids below `index`.
    #[must_use]
    pub fn leaves(&self, index: usize) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.nodes[index].size());
        let mut pending = vec![index];
        while let Some(current) = pending.pop() {
            match self.nodes[current] {
                DendrogramNode::Leaf { id } => ids.push(id),
                DendrogramNode::Merge { left, right, .. } => {
                    pending.push(right);
                    pending.push(left);
                }
            }
        }
        ids.sort_unstable();
        ids
    }

    /// Breadth-first level groups, bottom of the stack first.
    #[must_use]
    pub fn wrapper_stack(&self) -> Vec<ClusterWrapperNode> {
        flatten::level_stack(self)
    }

    /// Flatten the tree into at most `k` clusters with the stack procedure.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::InvalidK`] | `k` is zero |
    /// | [`ClusterError::TooFewSequences`] | `k` exceeds the number of sequences |
    pub fn partition(&self, k: usize) -> Result<ClusterAssignment, ClusterError> {
        flatten::partition(self, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[f64]) -> DistanceMatrix {
        let rows: Vec<Vec<f64>> = points
            .iter()
            .map(|a| points.iter().map(|b| (a - b).abs()).collect())
            .collect();
        DistanceMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn single_linkage_chain() {
        let d = Dendrogram::build(&line(&[0.0, 1.0, 3.0, 7.0]), Linkage::Single).unwrap();
        assert_eq!(d.len(), 7);
        assert_eq!(d.root(), 6);
        assert_eq!(d.merge_distances(), vec![1.0, 2.0, 4.0]);
        assert_eq!(d.node(4).children(), Some((0, 1)));
        assert_eq!(d.node(5).children(), Some((4, 2)));
        assert_eq!(d.node(6).children(), Some((5, 3)));
        assert_eq!(d.leaves(d.root()), vec![1, 2, 3, 4]);
        assert_eq!(d.node(d.root()).size(), 4);
    }

    #[test]
    fn complete_and_average_linkage_distances() {
        let m = line(&[0.0, 1.0, 3.0, 7.0]);
        let complete = Dendrogram::build(&m, Linkage::Complete).unwrap();
        assert_eq!(complete.merge_distances(), vec![1.0, 3.0, 7.0]);
        let average = Dendrogram::build(&m, Linkage::Average).unwrap();
        // {0,1} to 2: (3 + 2) / 2; {0,1,2} to 3: (7 + 6 + 4) / 3
        let merges = average.merge_distances();
        assert_eq!(merges[0], 1.0);
        assert!((merges[1] - 2.5).abs() < 1e-12);
        assert!((merges[2] - 17.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn ties_merge_lowest_pair_first() {
        let rows = vec![
            vec![0.0, 1.0, 5.0, 5.0],
            vec![1.0, 0.0, 5.0, 5.0],
            vec![5.0, 5.0, 0.0, 1.0],
            vec![5.0, 5.0, 1.0, 0.0],
        ];
        let d = Dendrogram::build(&DistanceMatrix::from_rows(&rows).unwrap(), Linkage::Average)
            .unwrap();
        assert_eq!(d.node(4).children(), Some((0, 1)));
        assert_eq!(d.node(5).children(), Some((2, 3)));
    }

    #[test]
    fn merge_distances_non_decreasing() {
        let m = line(&[0.0, 0.5, 2.0, 2.2, 9.0, 9.1, 4.0]);
        for linkage in [Linkage::Single, Linkage::Complete, Linkage::Average, Linkage::Weighted] {
            let merges = Dendrogram::build(&m, linkage).unwrap().merge_distances();
            assert!(merges.windows(2).all(|w| w[0] <= w[1]), "{linkage:?}: {merges:?}");
        }
    }

    #[test]
    fn single_sequence_is_a_leaf_root() {
        let d = Dendrogram::build(&line(&[3.0]), Linkage::Average).unwrap();
        assert_eq!(d.root(), 0);
        assert!(d.node(0).is_leaf());
        assert!(d.merge_distances().is_empty());
    }
}
