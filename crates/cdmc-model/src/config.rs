//! Shared configuration for model construction.

use crate::error::ModelError;

/// Parameters handed to [`ModelType::build`](crate::ModelType::build).
///
/// Construct via [`ModelConfig::new`], then chain `with_*` methods to override
/// defaults. Counts below one are raised to one.
///
/// # Defaults
///
/// | Parameter      | Default | Used by |
/// |----------------|---------|---------|
/// | `n_states`     | 2       | hidden Markov |
/// | `max_iter`     | 100     | hidden Markov |
/// | `tolerance`    | 1e-4    | hidden Markov |
/// | `seed`         | 42      | hidden Markov |
/// | `max_duration` | 20      | semi-Markov |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConfig {
    n_symbols: usize,
    n_states: usize,
    max_iter: usize,
    tolerance: f64,
    seed: u64,
    max_duration: usize,
}

impl ModelConfig {
    /// Create a configuration for sequences over the alphabet `0..n_symbols`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyAlphabet`] | `n_symbols` is zero |
    pub fn new(n_symbols: usize) -> Result<Self, ModelError> {
        if n_symbols == 0 {
            return Err(ModelError::EmptyAlphabet);
        }
        Ok(Self {
            n_symbols,
            n_states: 2,
            max_iter: 100,
            tolerance: 1e-4,
            seed: 42,
            max_duration: 20,
        })
    }

    /// Set the number of hidden states.
    #[must_use]
    pub fn with_n_states(mut self, n_states: usize) -> Self {
        self.n_states = n_states.max(1);
        self
    }

    /// Set the maximum number of Baum-Welch iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the Baum-Welch convergence tolerance on the total log-likelihood.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the seed for random parameter initialisation.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the longest run length tracked individually; longer runs share the
    /// last duration bucket.
    #[must_use]
    pub fn with_max_duration(mut self, max_duration: usize) -> Self {
        self.max_duration = max_duration.max(1);
        self
    }

    /// Return the alphabet size.
    #[must_use]
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    /// Return the number of hidden states.
    #[must_use]
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Return the maximum number of Baum-Welch iterations.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the Baum-Welch tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Return the initialisation seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the number of duration buckets.
    #[must_use]
    pub fn max_duration(&self) -> usize {
        self.max_duration
    }
}
