//! Accuracy regression tests for cdmc-converge.
//!
//! These tests pin the agreement metrics to hand-computed values and check
//! that the refinement loop separates two transition regimes that DTW alone
//! does not.

use cdmc_cluster::ClusterAssignment;
use cdmc_converge::{AgreementMetric, ContingencyTable, ConvergenceConfig, LoopState};
use cdmc_dtw::SymbolSequence;
use cdmc_model::ModelType;

// ---------------------------------------------------------------------------
// Helper: two regimes over the same binary alphabet
// ---------------------------------------------------------------------------

/// Sequences 0-3 alternate almost every step; sequences 4-7 move in runs of
/// two or three. Both regimes share the alphabet `{0, 1}`.
fn two_regimes() -> Vec<SymbolSequence> {
    let raw: [&[usize]; 8] = [
        &[0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
        &[1, 0, 1, 0, 1, 0, 1, 0, 1],
        &[0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1],
        &[1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1],
        &[0, 0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1],
        &[1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0],
        &[0, 0, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1],
        &[1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0],
    ];
    raw.iter()
        .map(|s| SymbolSequence::new(s.to_vec()).expect("valid test sequence"))
        .collect()
}

fn regimes_separated(assignment: &ClusterAssignment) -> bool {
    let expected = ClusterAssignment::from_indices([0, 0, 0, 0, 1, 1, 1, 1]);
    assignment.same_partition(&expected)
}

// ---------------------------------------------------------------------------
// a) golden_contingency_metrics
// ---------------------------------------------------------------------------

/// Reference values for the table `[[20, 24], [20, 72]]`.
#[test]
fn golden_contingency_metrics() {
    let table = ContingencyTable::from_counts(vec![vec![20, 24], vec![20, 72]]).unwrap();
    let expected = [
        (AgreementMetric::RandIndex, 5132.0 / 9180.0),
        (AgreementMetric::AdjustedRandIndex, 0.100_731_792_310_372_91),
        (AgreementMetric::NormalizedMutualInformation, 0.046_453_520_335_138_1),
        (AgreementMetric::Purity, 92.0 / 136.0),
    ];
    for (metric, value) in expected {
        let got = metric.score_table(&table);
        assert!((got - value).abs() < 1e-10, "{metric}: {got} vs {value}");
    }
}

// ---------------------------------------------------------------------------
// b) full_pipeline_separates_regimes
// ---------------------------------------------------------------------------

/// DTW sees the two regimes as close, so the hierarchical seed mixes them;
/// the Markov refinement separates them and then stabilises.
///
/// Reference: initial `[0,0,0,0,0,1,0,1]`, separated after iteration 1,
/// agreement 1.0 at iteration 2.
#[test]
fn full_pipeline_separates_regimes() {
    let data = two_regimes();
    let result = ConvergenceConfig::new(2).unwrap().fit(&data).unwrap();

    assert!(!regimes_separated(result.initial()), "seed already separated");
    assert!(result.converged());
    assert_eq!(result.state(), LoopState::Converged);
    assert!(result.iterations() <= 5, "took {} iterations", result.iterations());
    assert!((result.best_agreement() - 1.0).abs() < 1e-12);
    assert!(regimes_separated(result.final_assignment()));
    assert_eq!(result.models().len(), 2);
    assert_eq!(result.history().len(), result.iterations());
    assert_eq!(
        result.history().last().map(|r| &r.assignment),
        Some(result.final_assignment())
    );
}

// ---------------------------------------------------------------------------
// c) separated_seed_converges_immediately
// ---------------------------------------------------------------------------

#[test]
fn separated_seed_converges_immediately() {
    let data = two_regimes();
    let seed = ClusterAssignment::from_indices([1, 1, 1, 1, 0, 0, 0, 0]);
    let result = ConvergenceConfig::new(2).unwrap().fit_from(&data, seed.clone()).unwrap();

    assert!(result.converged());
    assert_eq!(result.iterations(), 1);
    assert_eq!(result.final_assignment(), &seed);
    assert_eq!(result.history()[0].iteration, 1);
}

// ---------------------------------------------------------------------------
// d) iteration_cap_returns_best_seen
// ---------------------------------------------------------------------------

/// One iteration is not enough to stabilise, so the loop stops at the cap and
/// reports the only assignment it produced.
#[test]
fn iteration_cap_returns_best_seen() {
    let data = two_regimes();
    let result = ConvergenceConfig::new(2)
        .unwrap()
        .with_max_iterations(1)
        .fit(&data)
        .unwrap();

    assert!(!result.converged());
    assert_eq!(result.state(), LoopState::MaxIterReached);
    assert_eq!(result.iterations(), 1);
    assert!((result.best_agreement() - 16.0 / 28.0).abs() < 1e-12);
    assert!(regimes_separated(result.final_assignment()));
}

// ---------------------------------------------------------------------------
// e) every_family_terminates_with_valid_labels
// ---------------------------------------------------------------------------

#[test]
fn every_family_terminates_with_valid_labels() {
    let data = two_regimes();
    for model_type in [ModelType::MarkovChain, ModelType::SemiMarkov, ModelType::HiddenMarkov] {
        for metric in [
            AgreementMetric::RandIndex,
            AgreementMetric::AdjustedRandIndex,
            AgreementMetric::NormalizedMutualInformation,
            AgreementMetric::Purity,
        ] {
            let config = ConvergenceConfig::new(2)
                .unwrap()
                .with_model_type(model_type)
                .with_metric(metric)
                .with_max_iterations(10);
            let result = config.fit(&data).unwrap();
            assert!((1..=10).contains(&result.iterations()), "{model_type}/{metric}");
            assert_eq!(result.final_assignment().len(), data.len());
            assert!(result.final_assignment().indices().iter().all(|&l| l < 2));
            assert_eq!(result.models().len(), 2);
        }
    }
}

// ---------------------------------------------------------------------------
// f) runs_are_deterministic
// ---------------------------------------------------------------------------

#[test]
fn runs_are_deterministic() {
    let data = two_regimes();
    let config = ConvergenceConfig::new(2)
        .unwrap()
        .with_model_type(ModelType::HiddenMarkov)
        .with_max_iterations(5);
    let a = config.fit(&data).unwrap();
    let b = config.fit(&data).unwrap();
    assert_eq!(a.final_assignment(), b.final_assignment());
    assert_eq!(a.iterations(), b.iterations());
}

// ---------------------------------------------------------------------------
// g) unchanged_partition_converges
// ---------------------------------------------------------------------------

/// A single sequence has no pairs, so the Rand index falls back to 0. The
/// partition cannot move, which still counts as convergence.
#[test]
fn single_sequence_converges() {
    assert_eq!(AgreementMetric::RandIndex.score(&[0], &[0]), 0.0);

    let data = vec![SymbolSequence::new(vec![0, 1, 0]).unwrap()];
    let result = ConvergenceConfig::new(1).unwrap().fit(&data).unwrap();

    assert_eq!(result.state(), LoopState::Converged);
    assert!(result.converged());
    assert_eq!(result.iterations(), 1);
    assert_eq!(result.final_assignment().indices(), vec![0]);
}

/// With k = 1, ARI and NMI are degenerate and score 0 on identical labels.
#[test]
fn one_cluster_converges_under_degenerate_metrics() {
    let data = two_regimes();
    for metric in [
        AgreementMetric::AdjustedRandIndex,
        AgreementMetric::NormalizedMutualInformation,
    ] {
        let result = ConvergenceConfig::new(1)
            .unwrap()
            .with_metric(metric)
            .fit(&data)
            .unwrap();

        assert_eq!(result.state(), LoopState::Converged, "{metric}");
        assert_eq!(result.iterations(), 1, "{metric}");
        assert_eq!(result.history()[0].agreement, 0.0, "{metric}");
        assert_eq!(result.final_assignment().n_clusters(), 1, "{metric}");
    }
}
