//! First-order Markov chain over observed symbols.

use cdmc_dtw::SymbolSequence;
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::model::{SequenceModel, check_symbols, normalize_rows};

/// Row-stochastic transition matrix estimated from transition counts.
///
/// Rows of symbols never left in training stay all-zero, so any transition
/// out of them scores `-inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovChain {
    n_symbols: usize,
    transitions: Vec<f64>,
}

impl MarkovChain {
    /// Untrained chain over `0..n_symbols` (all-zero matrix).
    #[must_use]
    pub fn new(n_symbols: usize) -> Self {
        Self {
            n_symbols,
            transitions: vec![0.0; n_symbols * n_symbols],
        }
    }

    /// Return the alphabet size.
    #[must_use]
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    /// `P(to | from)`, zero for symbols outside the alphabet.
    #[must_use]
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        if from >= self.n_symbols || to >= self.n_symbols {
            return 0.0;
        }
        self.transitions[from * self.n_symbols + to]
    }

    /// Row of transition probabilities out of `from`.
    ///
    /// # Panics
    ///
    /// Panics if `from >= n_symbols`.
    #[must_use]
    pub fn row(&self, from: usize) -> &[f64] {
        &self.transitions[from * self.n_symbols..(from + 1) * self.n_symbols]
    }
}

impl SequenceModel for MarkovChain {
    fn train(&mut self, sequences: &[&SymbolSequence]) -> Result<(), ModelError> {
        check_symbols(sequences, self.n_symbols)?;
        self.transitions.fill(0.0);
        if sequences.is_empty() {
            warn!(model = self.name(), "empty training set, model left untrained");
            return Ok(());
        }

        let mut n_transitions = 0usize;
        for seq in sequences {
            for (from, to) in seq.transitions() {
                self.transitions[from * self.n_symbols + to] += 1.0;
                n_transitions += 1;
            }
        }
        normalize_rows(&mut self.transitions, self.n_symbols);

        debug!(
            sequences = sequences.len(),
            transitions = n_transitions,
            "markov chain trained"
        );
        Ok(())
    }

    fn score(&self, sequence: &SymbolSequence) -> f64 {
        sequence
            .transitions()
            .map(|(from, to)| self.transition(from, to).ln())
            .sum()
    }

    fn name(&self) -> &'static str {
        "markov_chain"
    }
}
