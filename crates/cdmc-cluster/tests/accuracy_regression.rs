//! Accuracy regression tests for cdmc-cluster.
//!
//! These tests run the full DTW -> dendrogram -> flatten path on symbol
//! sequences and pin down the structural guarantees of the stack reduction.

use cdmc_cluster::{ClusterAssignment, ClusterError, HierarchicalConfig, Linkage};
use cdmc_dtw::{DistanceMatrix, Dtw, SymbolSequence};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seqs(raw: &[&[usize]]) -> Vec<SymbolSequence> {
    raw.iter()
        .map(|s| SymbolSequence::new(s.to_vec()).expect("valid test sequence"))
        .collect()
}

/// Nine sequences in three constant-symbol groups of lengths 3, 4 and 2.
fn grouped_matrix() -> DistanceMatrix {
    let data = seqs(&[
        &[0, 0, 0],
        &[0, 0, 0, 0],
        &[0, 0],
        &[1, 1, 1],
        &[1, 1, 1, 1],
        &[1, 1],
        &[2, 2, 2],
        &[2, 2, 2, 2],
        &[2, 2],
    ]);
    Dtw::symbolic().pairwise(&data).expect("pairwise distances")
}

/// True when every pair grouped together by `fine` is also grouped by `coarse`.
fn coarsens(coarse: &ClusterAssignment, fine: &ClusterAssignment) -> bool {
    let (c, f) = (coarse.labels(), fine.labels());
    (0..f.len()).all(|i| (0..f.len()).all(|j| f[i] != f[j] || c[i] == c[j]))
}

// ---------------------------------------------------------------------------
// a) two_pairs_split_cleanly
// ---------------------------------------------------------------------------

/// Two balanced pairs land in a two-level stack: the last pushed pair is
/// popped first and receives label 0.
#[test]
fn two_pairs_split_cleanly() {
    let data = seqs(&[&[0, 0], &[0, 0, 0], &[1, 1], &[1, 1, 1]]);
    let matrix = Dtw::symbolic().pairwise(&data).unwrap();
    let assignment = HierarchicalConfig::new(2).unwrap().fit(&matrix).unwrap();
    assert_eq!(assignment.indices(), vec![1, 1, 0, 0]);
}

// ---------------------------------------------------------------------------
// b) reduction_is_monotone_in_k
// ---------------------------------------------------------------------------

/// The partition at `k - 1` merges groups of the partition at `k` and never
/// splits one.
#[test]
fn reduction_is_monotone_in_k() {
    let matrix = grouped_matrix();
    for linkage in [Linkage::Average, Linkage::Complete, Linkage::Single, Linkage::Weighted] {
        let dendrogram = HierarchicalConfig::new(1)
            .unwrap()
            .with_linkage(linkage)
            .dendrogram(&matrix)
            .unwrap();
        for k in 2..=matrix.len() {
            let fine = dendrogram.partition(k).unwrap();
            let coarse = dendrogram.partition(k - 1).unwrap();
            assert!(coarsens(&coarse, &fine), "{linkage:?}: k={k} not refined by k-1");
        }
    }
}

// ---------------------------------------------------------------------------
// c) labels_stay_in_range
// ---------------------------------------------------------------------------

#[test]
fn labels_stay_in_range() {
    let matrix = grouped_matrix();
    for k in 1..=matrix.len() {
        let assignment = HierarchicalConfig::new(k).unwrap().fit(&matrix).unwrap();
        assert_eq!(assignment.len(), matrix.len());
        assert!(assignment.n_clusters() <= k);
        assert!(assignment.labels().iter().all(|l| l.index() < k), "k={k}");
        // Labels are handed out densely from 0.
        assert_eq!(assignment.cluster_sizes().len(), assignment.n_clusters());
    }
}

#[test]
fn single_cluster_holds_everything() {
    let assignment = HierarchicalConfig::new(1).unwrap().fit(&grouped_matrix()).unwrap();
    assert!(assignment.indices().iter().all(|&l| l == 0));
}

// ---------------------------------------------------------------------------
// d) fit_is_deterministic
// ---------------------------------------------------------------------------

#[test]
fn fit_is_deterministic() {
    let matrix = grouped_matrix();
    let config = HierarchicalConfig::new(3).unwrap().with_linkage(Linkage::Complete);
    let first = config.fit(&matrix).unwrap();
    for _ in 0..5 {
        assert_eq!(config.fit(&matrix).unwrap(), first);
    }
}

// ---------------------------------------------------------------------------
// e) invalid_inputs_fail_fast
// ---------------------------------------------------------------------------

#[test]
fn invalid_inputs_fail_fast() {
    let empty = Dtw::symbolic().pairwise::<Vec<usize>>(&[]).unwrap();
    let config = HierarchicalConfig::new(1).unwrap();
    assert!(matches!(config.fit(&empty), Err(ClusterError::EmptyMatrix)));
    assert!(matches!(
        config.fit_rows(&[vec![0.0, 1.0]]),
        Err(ClusterError::Matrix(_))
    ));
    assert!(matches!(
        HierarchicalConfig::new(10).unwrap().fit(&grouped_matrix()),
        Err(ClusterError::TooFewSequences { n_sequences: 9, k: 10 })
    ));
}
