//! The model abstraction shared by every sequence family.

use std::fmt::Debug;

use cdmc_dtw::SymbolSequence;

use crate::error::ModelError;

/// A generative model over symbol sequences.
///
/// A model is trained once on the members of one cluster and then only read
/// to score sequences, so scoring takes `&self` and may run in parallel.
pub trait SequenceModel: Debug + Send + Sync {
    /// Fit the model to `sequences`, replacing any previous fit.
    ///
    /// An empty training set leaves the model untrained and is not an error.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::SymbolOutOfRange`] | A sequence uses a symbol outside the alphabet |
    fn train(&mut self, sequences: &[&SymbolSequence]) -> Result<(), ModelError>;

    /// Log-likelihood of `sequence`; higher is a better fit. May be `-inf`.
    fn score(&self, sequence: &SymbolSequence) -> f64;

    /// Short family name for logs and summaries.
    fn name(&self) -> &'static str;
}

/// Reject training data with symbols outside `0..n_symbols`.
pub(crate) fn check_symbols(
    sequences: &[&SymbolSequence],
    n_symbols: usize,
) -> Result<(), ModelError> {
    for (sequence, seq) in sequences.iter().enumerate() {
        if let Some(&symbol) = seq.as_slice().iter().find(|&&s| s >= n_symbols) {
            return Err(ModelError::SymbolOutOfRange {
                sequence,
                symbol,
                n_symbols,
            });
        }
    }
    Ok(())
}

/// Scale every row of a row-major `rows x cols` table to sum to one; all-zero
/// rows stay zero.
pub(crate) fn normalize_rows(table: &mut [f64], cols: usize) {
    for row in table.chunks_mut(cols) {
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            row.iter_mut().for_each(|v| *v /= total);
        }
    }
}

/// Run-length encode a sequence into `(symbol, run length)` segments.
pub(crate) fn segments(sequence: &[usize]) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for &symbol in sequence {
        match out.last_mut() {
            Some((last, run)) if *last == symbol => *run += 1,
            _ => out.push((symbol, 1)),
        }
    }
    out
}
