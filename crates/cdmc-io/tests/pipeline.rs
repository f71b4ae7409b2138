//! End-to-end integration tests: CSV -> converge -> JSON/CSV -> read back.

use std::fs;
use std::path::{Path, PathBuf};

use cdmc_converge::ConvergenceConfig;
use cdmc_io::{CsvSequenceReader, ExperimentName, IoError, ResultWriter, SequenceSource};
use cdmc_model::ModelType;
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn run_round_trip() {
    // 1. Read CSV
    let dataset = CsvSequenceReader::new(&fixture_path("two_regimes.csv"))
        .sequences()
        .expect("fixture should parse");
    assert_eq!(dataset.len(), 8);
    assert_eq!(dataset.sequences[0].len(), 10);
    assert_eq!(dataset.sequences[3].len(), 12);

    // 2. Cluster with k=2
    let result = ConvergenceConfig::new(2).unwrap().fit(&dataset.sequences).unwrap();
    assert!(result.converged());

    // 3. Write artifacts
    let dir = TempDir::new().unwrap();
    let experiment = ExperimentName::new("regimes".into()).unwrap();
    let writer = ResultWriter::new(dir.path(), experiment).unwrap();
    let json_path = writer.write_run(&dataset.ids, &result).unwrap();
    let csv_path = writer.write_assignments(&dataset.ids, result.final_assignment()).unwrap();

    // 4. Read back and verify
    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(content["experiment"], "regimes");
    assert_eq!(content["state"], "converged");
    assert_eq!(content["converged"], true);

    let assignments = content["assignments"].as_object().unwrap();
    assert_eq!(assignments.len(), 8);
    let label = |id: &str| assignments[id].as_u64().unwrap();
    for id in ["alt_2", "alt_3", "alt_4"] {
        assert_eq!(label(id), label("alt_1"), "{id} left the alternating group");
    }
    for id in ["run_2", "run_3", "run_4"] {
        assert_eq!(label(id), label("run_1"), "{id} left the run group");
    }
    assert_ne!(label("alt_1"), label("run_1"));

    let sizes: Vec<u64> = content["cluster_sizes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect();
    assert_eq!(sizes, vec![4, 4]);

    let table = fs::read_to_string(&csv_path).unwrap();
    let mut lines = table.lines();
    assert_eq!(lines.next(), Some("id,cluster"));
    assert_eq!(lines.next(), Some(format!("alt_1,{}", label("alt_1")).as_str()));
    assert_eq!(table.lines().count(), 9);
}

#[test]
fn every_model_family_runs_on_fixture() {
    let dataset = CsvSequenceReader::new(&fixture_path("two_regimes.csv"))
        .read()
        .unwrap();
    for model_type in [ModelType::MarkovChain, ModelType::SemiMarkov, ModelType::HiddenMarkov] {
        let result = ConvergenceConfig::new(2)
            .unwrap()
            .with_model_type(model_type)
            .with_max_iterations(10)
            .fit(&dataset.sequences)
            .unwrap();
        assert_eq!(result.final_assignment().len(), dataset.len(), "{model_type}");
    }
}

#[test]
fn reader_fixture_files_match_expected_errors() {
    let result = CsvSequenceReader::new(&fixture_path("empty.csv")).read();
    assert!(
        matches!(result, Err(IoError::EmptyDataset { .. })),
        "empty.csv should give EmptyDataset, got: {result:?}"
    );

    let result = CsvSequenceReader::new(&fixture_path("duplicate_ids.csv")).read();
    assert!(
        matches!(result, Err(IoError::DuplicateId { first_row: 0, second_row: 2, .. })),
        "duplicate_ids.csv should give DuplicateId, got: {result:?}"
    );

    let result = CsvSequenceReader::new(&fixture_path("bad_symbol.csv")).read();
    assert!(
        matches!(result, Err(IoError::InvalidSymbol { row_index: 1, col_index: 1, .. })),
        "bad_symbol.csv should give InvalidSymbol, got: {result:?}"
    );

    let result = CsvSequenceReader::new(&fixture_path("empty_row.csv")).read();
    assert!(
        matches!(result, Err(IoError::EmptySequence { row_index: 1, .. })),
        "empty_row.csv should give EmptySequence, got: {result:?}"
    );
}
