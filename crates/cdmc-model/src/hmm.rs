//! Discrete hidden Markov model trained with multi-sequence Baum-Welch.
//!
//! All recursions run in log space. Parameters are floored at [`EPSILON`]
//! before taking logarithms, so every in-alphabet sequence has a finite score.

use cdmc_dtw::SymbolSequence;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, warn};

use crate::error::ModelError;
use crate::model::{SequenceModel, check_symbols, normalize_rows};

/// Probability floor applied before logarithms and during re-estimation.
pub const EPSILON: f64 = 1e-10;

/// Numerically stable `ln(sum(exp(x)))`.
fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + xs.iter().map(|x| (x - max).exp()).sum::<f64>().ln()
}

fn floored_ln(p: &[f64]) -> Vec<f64> {
    p.iter().map(|&v| v.max(EPSILON).ln()).collect()
}

/// Log-space copies of the parameters for one pass over the data.
struct LogParams {
    initial: Vec<f64>,
    transition: Vec<f64>,
    emission: Vec<f64>,
}

/// Expected counts accumulated over all training sequences.
struct Counts {
    initial: Vec<f64>,
    transition: Vec<f64>,
    emission: Vec<f64>,
    log_likelihood: f64,
}

/// Hidden Markov model with `n_states` latent states emitting symbols
/// `0..n_symbols`.
///
/// Matrices are stored row-major: `transition[i * n_states + j]` is
/// `P(j | i)` and `emission[i * n_symbols + s]` is `P(s | i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenMarkov {
    n_states: usize,
    n_symbols: usize,
    initial: Vec<f64>,
    transition: Vec<f64>,
    emission: Vec<f64>,
    max_iter: usize,
    tolerance: f64,
    log_likelihood: Option<f64>,
    iterations: usize,
}

impl HiddenMarkov {
    /// Randomly initialised model; the same seed always gives the same
    /// parameters.
    #[must_use]
    pub fn new(n_states: usize, n_symbols: usize, seed: u64) -> Self {
        let n_states = n_states.max(1);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut draw = |len: usize, cols: usize| {
            let mut table: Vec<f64> = (0..len).map(|_| rng.gen_range(0.5..1.5)).collect();
            normalize_rows(&mut table, cols);
            table
        };
        let initial = draw(n_states, n_states);
        let transition = draw(n_states * n_states, n_states);
        let emission = draw(n_states * n_symbols, n_symbols.max(1));

        Self {
            n_states,
            n_symbols,
            initial,
            transition,
            emission,
            max_iter: 100,
            tolerance: 1e-4,
            log_likelihood: None,
            iterations: 0,
        }
    }

    /// Model with explicit parameters.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::InvalidParameters`] | A block is empty, has the wrong length, or a row does not sum to 1 |
    pub fn from_parameters(
        initial: Vec<f64>,
        transition: Vec<f64>,
        emission: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let n_states = initial.len();
        if n_states == 0 || emission.is_empty() || emission.len() % n_states != 0 {
            return Err(ModelError::InvalidParameters {
                what: "emission",
                reason: format!("{} entries do not split into {n_states} rows", emission.len()),
            });
        }
        if transition.len() != n_states * n_states {
            return Err(ModelError::InvalidParameters {
                what: "transition",
                reason: format!("expected {} entries, got {}", n_states * n_states, transition.len()),
            });
        }
        let n_symbols = emission.len() / n_states;
        check_distribution("initial", &initial, n_states)?;
        check_distribution("transition", &transition, n_states)?;
        check_distribution("emission", &emission, n_symbols)?;

        Ok(Self {
            n_states,
            n_symbols,
            initial,
            transition,
            emission,
            max_iter: 100,
            tolerance: 1e-4,
            log_likelihood: None,
            iterations: 0,
        })
    }

    /// Set the Baum-Welch iteration cap and log-likelihood tolerance.
    #[must_use]
    pub fn with_training(mut self, max_iter: usize, tolerance: f64) -> Self {
        self.max_iter = max_iter;
        self.tolerance = tolerance;
        self
    }

    /// Return the number of hidden states.
    #[must_use]
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Return the alphabet size.
    #[must_use]
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    /// Initial state distribution.
    #[must_use]
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// `P(to | from)` between hidden states.
    ///
    /// # Panics
    ///
    /// Panics if either state is out of range.
    #[must_use]
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        assert!(from < self.n_states && to < self.n_states, "state out of range");
        self.transition[from * self.n_states + to]
    }

    /// `P(symbol | state)`, zero for symbols outside the alphabet.
    ///
    /// # Panics
    ///
    /// Panics if `state >= n_states`.
    #[must_use]
    pub fn emission(&self, state: usize, symbol: usize) -> f64 {
        assert!(state < self.n_states, "state out of range");
        if symbol >= self.n_symbols {
            return 0.0;
        }
        self.emission[state * self.n_symbols + symbol]
    }

    /// Total training log-likelihood after the last fit, if any.
    #[must_use]
    pub fn log_likelihood(&self) -> Option<f64> {
        self.log_likelihood
    }

    /// Baum-Welch iterations run by the last fit.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn log_params(&self) -> LogParams {
        LogParams {
            initial: floored_ln(&self.initial),
            transition: floored_ln(&self.transition),
            emission: floored_ln(&self.emission),
        }
    }

    /// Forward variables `alpha[t * n_states + i]` and the sequence
    /// log-likelihood.
    fn forward(&self, lp: &LogParams, obs: &[usize]) -> (Vec<f64>, f64) {
        let (n, m) = (self.n_states, self.n_symbols);
        let mut alpha = vec![f64::NEG_INFINITY; obs.len() * n];
        for i in 0..n {
            alpha[i] = lp.initial[i] + lp.emission[i * m + obs[0]];
        }
        let mut terms = vec![0.0; n];
        for t in 1..obs.len() {
            for j in 0..n {
                for (i, term) in terms.iter_mut().enumerate() {
                    *term = alpha[(t - 1) * n + i] + lp.transition[i * n + j];
                }
                alpha[t * n + j] = log_sum_exp(&terms) + lp.emission[j * m + obs[t]];
            }
        }
        let ll = log_sum_exp(&alpha[(obs.len() - 1) * n..]);
        (alpha, ll)
    }

    /// Backward variables `beta[t * n_states + i]`.
    fn backward(&self, lp: &LogParams, obs: &[usize]) -> Vec<f64> {
        let (n, m) = (self.n_states, self.n_symbols);
        let len = obs.len();
        let mut beta = vec![0.0; len * n];
        let mut terms = vec![0.0; n];
        for t in (0..len - 1).rev() {
            for i in 0..n {
                for (j, term) in terms.iter_mut().enumerate() {
                    *term = lp.transition[i * n + j]
                        + lp.emission[j * m + obs[t + 1]]
                        + beta[(t + 1) * n + j];
                }
                beta[t * n + i] = log_sum_exp(&terms);
            }
        }
        beta
    }

    /// E-step over every training sequence.
    fn expected_counts(&self, sequences: &[&SymbolSequence]) -> Counts {
        let (n, m) = (self.n_states, self.n_symbols);
        let lp = self.log_params();
        let mut counts = Counts {
            initial: vec![0.0; n],
            transition: vec![0.0; n * n],
            emission: vec![0.0; n * m],
            log_likelihood: 0.0,
        };

        for seq in sequences {
            let obs = seq.as_slice();
            let (alpha, ll) = self.forward(&lp, obs);
            let beta = self.backward(&lp, obs);
            counts.log_likelihood += ll;

            for (t, &symbol) in obs.iter().enumerate() {
                for i in 0..n {
                    let gamma = (alpha[t * n + i] + beta[t * n + i] - ll).exp();
                    if t == 0 {
                        counts.initial[i] += gamma;
                    }
                    counts.emission[i * m + symbol] += gamma;
                }
            }
            for t in 0..obs.len() - 1 {
                let next = obs[t + 1];
                for i in 0..n {
                    for j in 0..n {
                        let log_xi = alpha[t * n + i]
                            + lp.transition[i * n + j]
                            + lp.emission[j * m + next]
                            + beta[(t + 1) * n + j]
                            - ll;
                        counts.transition[i * n + j] += log_xi.exp();
                    }
                }
            }
        }
        counts
    }

    /// M-step: smoothed, row-normalised expected counts.
    fn reestimate(&mut self, counts: Counts) {
        let smooth = |mut table: Vec<f64>, cols: usize| {
            table.iter_mut().for_each(|v| *v += EPSILON);
            normalize_rows(&mut table, cols);
            table
        };
        self.initial = smooth(counts.initial, self.n_states);
        self.transition = smooth(counts.transition, self.n_states);
        self.emission = smooth(counts.emission, self.n_symbols);
    }

    fn total_log_likelihood(&self, sequences: &[&SymbolSequence]) -> f64 {
        let lp = self.log_params();
        sequences.iter().map(|s| self.forward(&lp, s.as_slice()).1).sum()
    }
}

fn check_distribution(what: &'static str, table: &[f64], cols: usize) -> Result<(), ModelError> {
    for (row, values) in table.chunks(cols).enumerate() {
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ModelError::InvalidParameters {
                what,
                reason: format!("row {row} has a negative or non-finite entry"),
            });
        }
        let total: f64 = values.iter().sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(ModelError::InvalidParameters {
                what,
                reason: format!("row {row} sums to {total}"),
            });
        }
    }
    Ok(())
}

impl SequenceModel for HiddenMarkov {
    #[instrument(skip_all, fields(n = sequences.len(), states = self.n_states))]
    fn train(&mut self, sequences: &[&SymbolSequence]) -> Result<(), ModelError> {
        check_symbols(sequences, self.n_symbols)?;
        if sequences.is_empty() {
            warn!(model = self.name(), "empty training set, model left untrained");
            return Ok(());
        }

        let mut previous = f64::NEG_INFINITY;
        self.iterations = 0;
        for _ in 0..self.max_iter {
            let counts = self.expected_counts(sequences);
            let current = counts.log_likelihood;
            self.iterations += 1;
            if previous.is_finite() && current - previous < self.tolerance {
                break;
            }
            previous = current;
            self.reestimate(counts);
        }

        let ll = self.total_log_likelihood(sequences);
        self.log_likelihood = Some(ll);
        debug!(
            iterations = self.iterations,
            log_likelihood = ll,
            "hidden markov model trained"
        );
        Ok(())
    }

    fn score(&self, sequence: &SymbolSequence) -> f64 {
        if sequence.as_slice().iter().any(|&s| s >= self.n_symbols) {
            return f64::NEG_INFINITY;
        }
        self.forward(&self.log_params(), sequence.as_slice()).1
    }

    fn name(&self) -> &'static str {
        "hidden_markov"
    }
}
