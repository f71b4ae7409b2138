//! Stack-based flattening of a dendrogram into `k` clusters.
//!
//! The tree is walked breadth-first from the root over a queue of sibling
//! lists. Each list's leaves become one [`ClusterWrapperNode`] pushed on a
//! stack, so the top of the stack holds the deepest groups. The stack is then
//! reduced to `k` entries by repeatedly merging its top two entries, and labels
//! are handed out in pop order.
//!
//! This is not a cut at a distance threshold: the result depends on tree
//! shape and traversal order only.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::{debug, warn};

use crate::assignment::ClusterAssignment;
use crate::dendrogram::{Dendrogram, DendrogramNode};
use crate::error::ClusterError;
use crate::label::ClusterLabel;

/// A group of sequences produced while flattening, tagged with a merge
/// distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterWrapperNode {
    distance: f64,
    ids: Vec<usize>,
}

impl ClusterWrapperNode {
    fn new(distance: f64, ids: Vec<usize>) -> Self {
        Self { distance, ids }
    }

    /// Merge distance the group is tagged with.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// 1-based sequence ids in the group.
    #[must_use]
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Take over `other`'s ids; the distance becomes the larger of the two.
    fn absorb(&mut self, other: Self) {
        self.distance = self.distance.max(other.distance);
        self.ids.extend(other.ids);
    }
}

/// Walk the tree level by level. Each sibling list's leaves form one group
/// tagged with the running merge distance as it stood when the list was
/// dequeued; the list's merge nodes then update that distance and enqueue
/// their children.
pub(crate) fn level_stack(dendrogram: &Dendrogram) -> Vec<ClusterWrapperNode> {
    let mut stack = Vec::new();
    let mut queue: VecDeque<Vec<usize>> = VecDeque::from([vec![dendrogram.root()]]);
    let mut running = 0.0;

    while let Some(siblings) = queue.pop_front() {
        // Leaves are tagged before this list's merges move the distance.
        let level_distance = running;
        let mut leaf_ids = Vec::new();
        for index in siblings {
            match *dendrogram.node(index) {
                DendrogramNode::Leaf { id } => leaf_ids.push(id),
                DendrogramNode::Merge {
                    distance,
                    left,
                    right,
                    ..
                } => {
                    running = distance;
                    queue.push_back(vec![left, right]);
                }
            }
        }
        if !leaf_ids.is_empty() {
            stack.push(ClusterWrapperNode::new(level_distance, leaf_ids));
        }
    }

    stack
}

fn reduce(stack: &mut Vec<ClusterWrapperNode>, k: usize) {
    while stack.len() > k {
        let (Some(top), Some(mut next)) = (stack.pop(), stack.pop()) else {
            break;
        };
        next.absorb(top);
        stack.push(next);
    }
}

fn emit(mut stack: Vec<ClusterWrapperNode>, n: usize) -> ClusterAssignment {
    let mut labels = vec![ClusterLabel::new(0); n];
    let mut next_label = 0;
    while let Some(group) = stack.pop() {
        for id in group.ids {
            labels[id - 1] = ClusterLabel::new(next_label);
        }
        next_label += 1;
    }
    ClusterAssignment::new(labels)
}

pub(crate) fn partition(
    dendrogram: &Dendrogram,
    k: usize,
) -> Result<ClusterAssignment, ClusterError> {
    let n = dendrogram.n_leaves();
    if k == 0 {
        return Err(ClusterError::InvalidK { k });
    }
    if k > n {
        return Err(ClusterError::TooFewSequences { n_sequences: n, k });
    }

    let mut stack = level_stack(dendrogram);
    if stack.len() < k {
        warn!(
            groups = stack.len(),
            k, "fewer level groups than requested clusters"
        );
    }
    reduce(&mut stack, k);
    debug!(groups = stack.len(), k, "dendrogram flattened");

    Ok(emit(stack, n))
}
