//! JSON and CSV writers for clustering results.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cdmc_cluster::ClusterAssignment;
use cdmc_converge::ConvergenceResult;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ExperimentName, SequenceId};

/// Writes clustering results into an output directory.
///
/// Creates the directory on construction if it does not exist. Output files
/// are named `{experiment}_run.json` and `{experiment}_assignments.csv`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Path of the JSON run artifact.
    #[must_use]
    pub fn run_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_run.json", self.experiment.as_str()))
    }

    /// Path of the per-sequence assignment table.
    #[must_use]
    pub fn assignments_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_assignments.csv", self.experiment.as_str()))
    }

    /// Write a convergence result to `{experiment}_run.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::LengthMismatch`] | `ids` and the final assignment differ in length |
    /// | [`IoError::Serialize`] | The artifact cannot be encoded |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_run(&self, ids: &[SequenceId], result: &ConvergenceResult) -> Result<PathBuf, IoError> {
        let path = self.run_path();
        let artifact = RunArtifact {
            experiment: self.experiment.as_str(),
            state: result.state().name(),
            converged: result.converged(),
            iterations: result.iterations(),
            best_agreement: result.best_agreement(),
            models: result.models().iter().map(|m| m.name()).collect(),
            cluster_sizes: result.final_assignment().cluster_sizes(),
            assignments: label_map(ids, result.final_assignment())?,
            initial: label_map(ids, result.initial())?,
            history: result
                .history()
                .iter()
                .map(|r| HistoryEntry {
                    iteration: r.iteration,
                    agreement: r.agreement,
                    n_clusters: r.assignment.n_clusters(),
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "run result written");
        Ok(path)
    }

    /// Write an `id,cluster` table to `{experiment}_assignments.csv`, in
    /// input order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::LengthMismatch`] | `ids` and `assignment` differ in length |
    /// | [`IoError::WriteCsv`] | The file cannot be created or written |
    #[instrument(skip_all)]
    pub fn write_assignments(
        &self,
        ids: &[SequenceId],
        assignment: &ClusterAssignment,
    ) -> Result<PathBuf, IoError> {
        check_lengths(ids, assignment)?;
        let path = self.assignments_path();
        let csv_error = |e: csv::Error| IoError::WriteCsv {
            path: path.clone(),
            source: e,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_error)?;
        wtr.write_record(["id", "cluster"]).map_err(csv_error)?;
        for (id, label) in ids.iter().zip(assignment.labels()) {
            let label = label.to_string();
            wtr.write_record([id.as_str(), label.as_str()])
                .map_err(csv_error)?;
        }
        wtr.flush().map_err(|e| csv_error(e.into()))?;

        info!(path = %path.display(), rows = ids.len(), "assignments written");
        Ok(path)
    }
}

fn check_lengths(ids: &[SequenceId], assignment: &ClusterAssignment) -> Result<(), IoError> {
    if ids.len() != assignment.len() {
        return Err(IoError::LengthMismatch {
            ids: ids.len(),
            labels: assignment.len(),
        });
    }
    Ok(())
}

fn label_map<'a>(
    ids: &'a [SequenceId],
    assignment: &ClusterAssignment,
) -> Result<BTreeMap<&'a str, usize>, IoError> {
    check_lengths(ids, assignment)?;
    Ok(ids
        .iter()
        .zip(assignment.labels())
        .map(|(id, label)| (id.as_str(), label.index()))
        .collect())
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct RunArtifact<'a> {
    experiment: &'a str,
    state: &'static str,
    converged: bool,
    iterations: usize,
    best_agreement: f64,
    models: Vec<&'static str>,
    cluster_sizes: Vec<usize>,
    assignments: BTreeMap<&'a str, usize>,
    initial: BTreeMap<&'a str, usize>,
    history: Vec<HistoryEntry>,
}

#[derive(Serialize)]
struct HistoryEntry {
    iteration: usize,
    agreement: f64,
    n_clusters: usize,
}

#[cfg(test)]
mod tests {
    use cdmc_converge::ConvergenceConfig;
    use cdmc_dtw::SymbolSequence;
    use tempfile::TempDir;

    use super::*;

    fn ids() -> Vec<SequenceId> {
        ["a", "b", "c", "d"]
            .iter()
            .map(|s| SequenceId::new((*s).to_string()))
            .collect()
    }

    fn result() -> ConvergenceResult {
        let data: Vec<SymbolSequence> = [[0, 1, 0, 1], [1, 0, 1, 0], [2, 2, 3, 3], [3, 3, 2, 2]]
            .iter()
            .map(|s| SymbolSequence::new(s.to_vec()).unwrap())
            .collect();
        ConvergenceConfig::new(2).unwrap().fit(&data).unwrap()
    }

    fn writer(dir: &Path) -> ResultWriter {
        ResultWriter::new(dir, ExperimentName::new("test".into()).unwrap()).unwrap()
    }

    #[test]
    fn run_json_structure() {
        let dir = TempDir::new().unwrap();
        let result = result();
        let path = writer(dir.path()).write_run(&ids(), &result).unwrap();
        assert_eq!(path, dir.path().join("test_run.json"));

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["experiment"], "test");
        assert_eq!(content["converged"], result.converged());
        assert_eq!(content["iterations"].as_u64(), Some(result.iterations() as u64));
        assert_eq!(content["models"].as_array().unwrap().len(), 2);
        assert_eq!(content["models"][0], "markov_chain");
        let assignments = content["assignments"].as_object().unwrap();
        assert_eq!(assignments.len(), 4);
        for (i, id) in ids().iter().enumerate() {
            let label = assignments[id.as_str()].as_u64().unwrap() as usize;
            assert_eq!(Some(label), result.final_assignment().indices().get(i).copied());
        }
        assert_eq!(
            content["history"].as_array().unwrap().len(),
            result.history().len()
        );
    }

    #[test]
    fn assignments_csv_in_input_order() {
        let dir = TempDir::new().unwrap();
        let assignment = ClusterAssignment::from_indices([1, 1, 0, 0]);
        let path = writer(dir.path()).write_assignments(&ids(), &assignment).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "id,cluster\na,1\nb,1\nc,0\nd,0\n");
    }

    #[test]
    fn length_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let assignment = ClusterAssignment::from_indices([0, 1]);
        let err = writer(dir.path()).write_assignments(&ids(), &assignment);
        assert!(matches!(err, Err(IoError::LengthMismatch { ids: 4, labels: 2 })));
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let w = writer(&nested);
        assert!(nested.is_dir());
        assert_eq!(w.assignments_path(), nested.join("test_assignments.csv"));
    }
}
