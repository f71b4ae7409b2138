//! Configuration builder for the full clustering pipeline.

use cdmc_cluster::{ClusterAssignment, HierarchicalConfig, Linkage};
use cdmc_dtw::{Dtw, SymbolSequence, alphabet_size};
use cdmc_model::{ModelConfig, ModelType};
use tracing::{debug, info, instrument};

use crate::agreement::AgreementMetric;
use crate::engine::{self, LoopSettings, LoopState};
use crate::error::ConvergeError;
use crate::result::ConvergenceResult;

/// Configuration for DTW-seeded, model-refined clustering.
///
/// Construct via [`ConvergenceConfig::new`], then chain `with_*` methods to
/// override defaults. The value is immutable once built and can be reused
/// across datasets.
///
/// # Defaults
///
/// | Parameter              | Default |
/// |------------------------|---------|
/// | `dtw`                  | [`Dtw::symbolic`] (plain, 0/1 cost) |
/// | `linkage`              | [`Linkage::Average`] |
/// | `model_type`           | [`ModelType::MarkovChain`] |
/// | `model_config`         | inferred from the dataset's alphabet |
/// | `metric`               | [`AgreementMetric::RandIndex`] |
/// | `similarity_threshold` | 0.99 |
/// | `max_iterations`       | 50 |
#[derive(Debug, Clone)]
pub struct ConvergenceConfig {
    k: usize,
    dtw: Dtw,
    linkage: Linkage,
    model_type: ModelType,
    model_config: Option<ModelConfig>,
    metric: AgreementMetric,
    similarity_threshold: f64,
    max_iterations: usize,
}

impl ConvergenceConfig {
    /// Create a configuration targeting `k` clusters.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConvergeError::InvalidK`] | `k` is zero |
    pub fn new(k: usize) -> Result<Self, ConvergeError> {
        if k == 0 {
            return Err(ConvergeError::InvalidK { k });
        }
        Ok(Self {
            k,
            dtw: Dtw::symbolic(),
            linkage: Linkage::default(),
            model_type: ModelType::default(),
            model_config: None,
            metric: AgreementMetric::default(),
            similarity_threshold: 0.99,
            max_iterations: 50,
        })
    }

    /// Set the DTW variant used for the initial distance matrix.
    #[must_use]
    pub fn with_dtw(mut self, dtw: Dtw) -> Self {
        self.dtw = dtw;
        self
    }

    /// Set the linkage for the initial hierarchical partition.
    #[must_use]
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Set the per-cluster model family.
    #[must_use]
    pub fn with_model_type(mut self, model_type: ModelType) -> Self {
        self.model_type = model_type;
        self
    }

    /// Fix the model parameters instead of inferring the alphabet from the
    /// data.
    #[must_use]
    pub fn with_model_config(mut self, model_config: ModelConfig) -> Self {
        self.model_config = Some(model_config);
        self
    }

    /// Set the agreement metric used as stopping criterion.
    #[must_use]
    pub fn with_metric(mut self, metric: AgreementMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the agreement at which the loop stops.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConvergeError::InvalidThreshold`] | `threshold` is not a finite value in `[0, 1]` |
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Result<Self, ConvergeError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConvergeError::InvalidThreshold { threshold });
        }
        self.similarity_threshold = threshold;
        Ok(self)
    }

    /// Set the iteration cap. Zero is raised to one.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Return the target number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Return the DTW configuration.
    #[must_use]
    pub fn dtw(&self) -> &Dtw {
        &self.dtw
    }

    /// Return the linkage.
    #[must_use]
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Return the model family.
    #[must_use]
    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    /// Return the explicit model parameters, if any.
    #[must_use]
    pub fn model_config(&self) -> Option<&ModelConfig> {
        self.model_config.as_ref()
    }

    /// Return the agreement metric.
    #[must_use]
    pub fn metric(&self) -> AgreementMetric {
        self.metric
    }

    /// Return the similarity threshold.
    #[must_use]
    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Return the iteration cap.
    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run the full pipeline: pairwise DTW, hierarchical initial partition,
    /// then model refinement.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConvergeError::EmptyDataset`] | `sequences` is empty |
    /// | [`ConvergeError::Dtw`] | A pair of sequences has no finite alignment |
    /// | [`ConvergeError::Cluster`] | `k` exceeds the number of sequences |
    /// | [`ConvergeError::Model`] | A sequence uses a symbol outside an explicit model alphabet |
    #[instrument(skip_all, fields(n = sequences.len(), k = self.k))]
    pub fn fit(&self, sequences: &[SymbolSequence]) -> Result<ConvergenceResult, ConvergeError> {
        if sequences.is_empty() {
            return Err(ConvergeError::EmptyDataset);
        }
        debug!(state = %LoopState::Initializing, "computing distance matrix");
        let matrix = self.dtw.pairwise(sequences)?;
        let initial = HierarchicalConfig::new(self.k)?
            .with_linkage(self.linkage)
            .fit(&matrix)?;
        self.fit_from(sequences, initial)
    }

    /// Refine a caller-supplied initial assignment, skipping the DTW and
    /// hierarchical steps.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConvergeError::EmptyDataset`] | `sequences` is empty |
    /// | [`ConvergeError::AssignmentLength`] | `initial` does not label every sequence |
    /// | [`ConvergeError::LabelOutOfRange`] | `initial` uses a label `>= k` |
    /// | [`ConvergeError::Model`] | A sequence uses a symbol outside an explicit model alphabet |
    pub fn fit_from(
        &self,
        sequences: &[SymbolSequence],
        initial: ClusterAssignment,
    ) -> Result<ConvergenceResult, ConvergeError> {
        if sequences.is_empty() {
            return Err(ConvergeError::EmptyDataset);
        }
        if initial.len() != sequences.len() {
            return Err(ConvergeError::AssignmentLength {
                expected: sequences.len(),
                got: initial.len(),
            });
        }
        if let Some(label) = initial.indices().into_iter().find(|&l| l >= self.k) {
            return Err(ConvergeError::LabelOutOfRange { label, k: self.k });
        }

        let model_config = match self.model_config {
            Some(config) => config,
            None => ModelConfig::new(alphabet_size(sequences))?,
        };
        let settings = LoopSettings {
            k: self.k,
            model_type: self.model_type,
            model_config,
            metric: self.metric,
            similarity_threshold: self.similarity_threshold,
            max_iterations: self.max_iterations,
        };
        let result = engine::run(sequences, initial, &settings)?;
        info!(
            state = %result.state(),
            iterations = result.iterations(),
            clusters = result.final_assignment().n_clusters(),
            model = self.model_type.name(),
            "clustering complete"
        );
        Ok(result)
    }
}
