//! Explicit-duration (semi-Markov) chain over observed symbols.

use cdmc_dtw::SymbolSequence;
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::model::{SequenceModel, check_symbols, normalize_rows, segments};

/// Semi-Markov chain: a jump chain between distinct symbols plus an empirical
/// run-length distribution per symbol.
///
/// Each sequence is run-length encoded into `(symbol, duration)` segments.
/// Durations `1..=max_duration` have their own bucket; longer runs fall into
/// the last one. Every segment, including the final one, counts as an observed
/// duration during training. When scoring, the final segment is treated as
/// right-censored and contributes its survival probability `P(D >= d)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SemiMarkov {
    n_symbols: usize,
    max_duration: usize,
    jumps: Vec<f64>,
    durations: Vec<f64>,
}

impl SemiMarkov {
    /// Untrained model over `0..n_symbols` with `max_duration` buckets.
    #[must_use]
    pub fn new(n_symbols: usize, max_duration: usize) -> Self {
        let max_duration = max_duration.max(1);
        Self {
            n_symbols,
            max_duration,
            jumps: vec![0.0; n_symbols * n_symbols],
            durations: vec![0.0; n_symbols * max_duration],
        }
    }

    /// `P(next segment is to | current segment is from)`; zero when
    /// `from == to` or either symbol is outside the alphabet.
    #[must_use]
    pub fn jump(&self, from: usize, to: usize) -> f64 {
        if from >= self.n_symbols || to >= self.n_symbols {
            return 0.0;
        }
        self.jumps[from * self.n_symbols + to]
    }

    /// Probability that a run of `symbol` lasts `duration` steps, with
    /// durations past `max_duration` sharing the last bucket.
    #[must_use]
    pub fn duration(&self, symbol: usize, duration: usize) -> f64 {
        if symbol >= self.n_symbols || duration == 0 {
            return 0.0;
        }
        self.durations[symbol * self.max_duration + self.bucket(duration)]
    }

    /// Probability that a run of `symbol` lasts at least `duration` steps.
    #[must_use]
    pub fn survival(&self, symbol: usize, duration: usize) -> f64 {
        if symbol >= self.n_symbols {
            return 0.0;
        }
        let row = &self.durations[symbol * self.max_duration..(symbol + 1) * self.max_duration];
        row[self.bucket(duration.max(1))..].iter().sum()
    }

    fn bucket(&self, duration: usize) -> usize {
        duration.min(self.max_duration) - 1
    }
}

impl SequenceModel for SemiMarkov {
    fn train(&mut self, sequences: &[&SymbolSequence]) -> Result<(), ModelError> {
        check_symbols(sequences, self.n_symbols)?;
        self.jumps.fill(0.0);
        self.durations.fill(0.0);
        if sequences.is_empty() {
            warn!(model = self.name(), "empty training set, model left untrained");
            return Ok(());
        }

        let mut n_segments = 0usize;
        for seq in sequences {
            let segs = segments(seq.as_slice());
            for &(symbol, run) in &segs {
                let bucket = self.bucket(run);
                self.durations[symbol * self.max_duration + bucket] += 1.0;
            }
            for pair in segs.windows(2) {
                self.jumps[pair[0].0 * self.n_symbols + pair[1].0] += 1.0;
            }
            n_segments += segs.len();
        }
        normalize_rows(&mut self.jumps, self.n_symbols);
        normalize_rows(&mut self.durations, self.max_duration);

        debug!(
            sequences = sequences.len(),
            segments = n_segments,
            "semi-markov model trained"
        );
        Ok(())
    }

    fn score(&self, sequence: &SymbolSequence) -> f64 {
        let segs = segments(sequence.as_slice());
        let Some((&(last_symbol, last_run), complete)) = segs.split_last() else {
            return f64::NEG_INFINITY;
        };

        let jumps: f64 = segs.windows(2).map(|p| self.jump(p[0].0, p[1].0).ln()).sum();
        let durations: f64 = complete.iter().map(|&(s, d)| self.duration(s, d).ln()).sum();
        jumps + durations + self.survival(last_symbol, last_run).ln()
    }

    fn name(&self) -> &'static str {
        "semi_markov"
    }
}
