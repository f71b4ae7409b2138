//! The model-refinement loop.
//!
//! Each iteration trains one model per cluster on that cluster's current
//! members, relabels every sequence with its best-scoring model and compares
//! the new assignment with the old one. The loop stops once the agreement
//! reaches the threshold, the partition stops changing, or the iteration cap
//! is hit.

use std::fmt;

use cdmc_cluster::{ClusterAssignment, ClusterLabel};
use cdmc_dtw::SymbolSequence;
use cdmc_model::{ModelConfig, ModelError, ModelType, SequenceModel};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::agreement::AgreementMetric;
use crate::result::{ConvergenceResult, IterationRecord};

/// Phase of the convergence loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Computing distances and the initial partition.
    Initializing,
    /// Refining the assignment with per-cluster models.
    Iterating,
    /// Agreement reached the similarity threshold.
    Converged,
    /// The iteration cap was hit first.
    MaxIterReached,
}

impl LoopState {
    /// Stable lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Iterating => "iterating",
            Self::Converged => "converged",
            Self::MaxIterReached => "max_iter_reached",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings the loop reads; resolved and validated by the caller.
pub(crate) struct LoopSettings {
    pub k: usize,
    pub model_type: ModelType,
    pub model_config: ModelConfig,
    pub metric: AgreementMetric,
    pub similarity_threshold: f64,
    pub max_iterations: usize,
}

/// Train `k` fresh models, model `c` on the members of cluster `c` only.
pub(crate) fn train_models(
    sequences: &[SymbolSequence],
    assignment: &ClusterAssignment,
    k: usize,
    model_type: ModelType,
    config: &ModelConfig,
) -> Result<Vec<Box<dyn SequenceModel>>, ModelError> {
    (0..k)
        .into_par_iter()
        .map(|cluster| -> Result<Box<dyn SequenceModel>, ModelError> {
            let members: Vec<&SymbolSequence> = assignment
                .members(ClusterLabel::new(cluster))
                .into_iter()
                .map(|i| &sequences[i])
                .collect();
            let mut model = model_type.build(config);
            model.train(&members)?;
            debug!(cluster, members = members.len(), model = model.name(), "model trained");
            Ok(model)
        })
        .collect()
}

/// Index of the highest-scoring model; ties go to the lowest index.
fn best_model(models: &[Box<dyn SequenceModel>], sequence: &SymbolSequence) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (index, model) in models.iter().enumerate() {
        let score = model.score(sequence);
        if index == 0 || score > best.1 {
            best = (index, score);
        }
    }
    best
}

/// Relabel every sequence with its argmax model.
pub(crate) fn reassign(
    sequences: &[SymbolSequence],
    models: &[Box<dyn SequenceModel>],
) -> ClusterAssignment {
    let labels: Vec<ClusterLabel> = sequences
        .par_iter()
        .enumerate()
        .map(|(index, sequence)| {
            let (label, score) = best_model(models, sequence);
            if score == f64::NEG_INFINITY {
                warn!(sequence = index, "every model scores -inf, using cluster 0");
            }
            ClusterLabel::new(label)
        })
        .collect();
    ClusterAssignment::new(labels)
}

/// Iterate from `initial` until agreement or the cap.
#[instrument(skip_all, fields(n = sequences.len(), k = settings.k, metric = settings.metric.name()))]
pub(crate) fn run(
    sequences: &[SymbolSequence],
    initial: ClusterAssignment,
    settings: &LoopSettings,
) -> Result<ConvergenceResult, ModelError> {
    debug!(state = %LoopState::Iterating, "entering refinement loop");
    let mut current = initial.clone();
    let mut history = Vec::new();
    let mut best_agreement = f64::NEG_INFINITY;
    let mut best_assignment = initial.clone();
    let mut best_models = Vec::new();

    for iteration in 1..=settings.max_iterations {
        let models = train_models(
            sequences,
            &current,
            settings.k,
            settings.model_type,
            &settings.model_config,
        )?;
        let next = reassign(sequences, &models);
        let agreement = settings.metric.score(&current.indices(), &next.indices());
        info!(
            iteration,
            agreement,
            clusters = next.n_clusters(),
            "iteration complete"
        );
        history.push(IterationRecord {
            iteration,
            assignment: next.clone(),
            agreement,
        });

        // Degenerate inputs score 0 even when nothing moved.
        let fixed_point = next.same_partition(&current);
        if fixed_point || agreement >= settings.similarity_threshold {
            info!(iterations = iteration, agreement, fixed_point, "converged");
            return Ok(ConvergenceResult {
                initial,
                final_assignment: next,
                history,
                models,
                state: LoopState::Converged,
                best_agreement: agreement,
            });
        }
        if agreement > best_agreement {
            best_agreement = agreement;
            best_assignment = next.clone();
            best_models = models;
        }
        current = next;
    }

    warn!(
        max_iterations = settings.max_iterations,
        best_agreement, "iteration cap reached without convergence"
    );
    Ok(ConvergenceResult {
        initial,
        final_assignment: best_assignment,
        history,
        models: best_models,
        state: LoopState::MaxIterReached,
        best_agreement,
    })
}

#[cfg(test)]
mod tests {
    use cdmc_model::MarkovChain;

    use super::*;

    fn seq(symbols: &[usize]) -> SymbolSequence {
        SymbolSequence::new(symbols.to_vec()).unwrap()
    }

    fn trained(data: &[&[usize]]) -> Box<dyn SequenceModel> {
        let owned: Vec<SymbolSequence> = data.iter().map(|s| seq(s)).collect();
        let refs: Vec<&SymbolSequence> = owned.iter().collect();
        let mut chain = MarkovChain::new(4);
        chain.train(&refs).unwrap();
        Box::new(chain)
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let models = vec![trained(&[&[0, 1, 0]]), trained(&[&[0, 1, 0]])];
        assert_eq!(best_model(&models, &seq(&[0, 1])).0, 0);
    }

    #[test]
    fn all_impossible_falls_back_to_zero() {
        let models = vec![trained(&[&[0, 1]]), trained(&[&[2, 3]])];
        let (label, score) = best_model(&models, &seq(&[3, 0]));
        assert_eq!(label, 0);
        assert_eq!(score, f64::NEG_INFINITY);
    }

    #[test]
    fn reassign_picks_argmax() {
        let models = vec![trained(&[&[0, 1, 0, 1]]), trained(&[&[2, 3, 2, 3]])];
        let data = vec![seq(&[2, 3, 2]), seq(&[1, 0, 1]), seq(&[3, 2])];
        assert_eq!(reassign(&data, &models).indices(), vec![1, 0, 1]);
    }

    #[test]
    fn models_see_only_their_members() {
        let data = vec![seq(&[0, 1, 0]), seq(&[2, 3, 2]), seq(&[1, 0, 1])];
        let assignment = ClusterAssignment::from_indices([1, 0, 1]);
        let config = ModelConfig::new(4).unwrap();
        let models = train_models(&data, &assignment, 3, ModelType::MarkovChain, &config).unwrap();
        assert_eq!(models.len(), 3);
        assert_eq!(models[0].score(&seq(&[0, 1])), f64::NEG_INFINITY);
        assert_eq!(models[1].score(&seq(&[0, 1])), 0.0);
        assert_eq!(models[1].score(&seq(&[2, 3])), f64::NEG_INFINITY);
        // cluster 2 is empty and its model untrained
        assert_eq!(models[2].score(&seq(&[2, 3])), f64::NEG_INFINITY);
    }

    #[test]
    fn state_names() {
        assert_eq!(LoopState::MaxIterReached.to_string(), "max_iter_reached");
        assert_eq!(LoopState::Converged.name(), "converged");
    }
}
