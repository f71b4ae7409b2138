//! Outcome of a convergence run.

use cdmc_cluster::ClusterAssignment;
use cdmc_model::SequenceModel;

use crate::engine::LoopState;

/// One pass of model fitting and reassignment.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    /// 1-based iteration number.
    pub iteration: usize,
    /// Assignment produced by this iteration.
    pub assignment: ClusterAssignment,
    /// Agreement between this assignment and its predecessor.
    pub agreement: f64,
}

/// Result of [`ConvergenceConfig::fit`](crate::ConvergenceConfig::fit).
#[derive(Debug)]
pub struct ConvergenceResult {
    pub(crate) initial: ClusterAssignment,
    pub(crate) final_assignment: ClusterAssignment,
    pub(crate) history: Vec<IterationRecord>,
    pub(crate) models: Vec<Box<dyn SequenceModel>>,
    pub(crate) state: LoopState,
    pub(crate) best_agreement: f64,
}

impl ConvergenceResult {
    /// Assignment the loop started from.
    #[must_use]
    pub fn initial(&self) -> &ClusterAssignment {
        &self.initial
    }

    /// The converged assignment, or the best one seen when the iteration cap
    /// was reached.
    #[must_use]
    pub fn final_assignment(&self) -> &ClusterAssignment {
        &self.final_assignment
    }

    /// Every iteration in order.
    #[must_use]
    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Per-cluster models that produced the final assignment; index `c`
    /// was trained on the members of cluster `c` of its predecessor.
    #[must_use]
    pub fn models(&self) -> &[Box<dyn SequenceModel>] {
        &self.models
    }

    /// Terminal state, [`LoopState::Converged`] or [`LoopState::MaxIterReached`].
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// True when the agreement threshold was reached.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.state == LoopState::Converged
    }

    /// Number of iterations run.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    /// Agreement of the final assignment with its predecessor.
    #[must_use]
    pub fn best_agreement(&self) -> f64 {
        self.best_agreement
    }
}
