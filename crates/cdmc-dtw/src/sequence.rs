//! Sequence types with validation guarantees.

use std::ops::Index;

use crate::error::DtwError;

/// A discrete symbol. Symbols double as state indices in the sequence models,
/// so an alphabet of `s` symbols uses the values `0..s`.
pub type Symbol = usize;

/// Owned, validated symbol sequence. Guaranteed non-empty.
///
/// Loaders hand these out once; every engine borrows them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolSequence(Vec<Symbol>);

impl SymbolSequence {
    /// Create a new symbol sequence, validating that it is non-empty.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `symbols` is empty |
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, DtwError> {
        if symbols.is_empty() {
            return Err(DtwError::EmptySequence);
        }
        Ok(Self(symbols))
    }

    /// Return the symbols as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    /// Return the number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed sequence; kept for the
    /// `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Smallest alphabet that contains every symbol of this sequence
    /// (largest symbol plus one).
    #[must_use]
    pub fn alphabet_size(&self) -> usize {
        self.0.iter().max().map_or(0, |&s| s + 1)
    }

    /// Iterate over consecutive `(from, to)` symbol pairs.
    pub fn transitions(&self) -> impl Iterator<Item = (Symbol, Symbol)> + '_ {
        self.0.windows(2).map(|w| (w[0], w[1]))
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<Symbol> {
        self.0
    }
}

/// Smallest alphabet covering every sequence of a collection.
#[must_use]
pub fn alphabet_size(sequences: &[SymbolSequence]) -> usize {
    sequences
        .iter()
        .map(SymbolSequence::alphabet_size)
        .max()
        .unwrap_or(0)
}

impl AsRef<[Symbol]> for SymbolSequence {
    fn as_ref(&self) -> &[Symbol] {
        &self.0
    }
}

impl Index<usize> for SymbolSequence {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl TryFrom<Vec<Symbol>> for SymbolSequence {
    type Error = DtwError;

    fn try_from(symbols: Vec<Symbol>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}

/// Owned, validated real-valued series for the continuous DTW variants.
/// Guaranteed non-empty with all finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Create a new time series, validating that it is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `values` is empty |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, DtwError> {
        if values.is_empty() {
            return Err(DtwError::EmptySequence);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue { index });
        }
        Ok(Self(values))
    }

    /// Return the samples as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed series.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = DtwError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_symbols() {
        let result = SymbolSequence::new(vec![]);
        assert!(matches!(result, Err(DtwError::EmptySequence)));
    }

    #[test]
    fn alphabet_is_max_plus_one() {
        let seq = SymbolSequence::new(vec![1, 4, 2]).unwrap();
        assert_eq!(seq.alphabet_size(), 5);
    }

    #[test]
    fn collection_alphabet() {
        let seqs = vec![
            SymbolSequence::new(vec![0, 1]).unwrap(),
            SymbolSequence::new(vec![6]).unwrap(),
        ];
        assert_eq!(alphabet_size(&seqs), 7);
        assert_eq!(alphabet_size(&[]), 0);
    }

    #[test]
    fn transitions_are_consecutive_pairs() {
        let seq = SymbolSequence::new(vec![1, 2, 2, 3]).unwrap();
        let pairs: Vec<_> = seq.transitions().collect();
        assert_eq!(pairs, vec![(1, 2), (2, 2), (2, 3)]);
    }

    #[test]
    fn single_symbol_has_no_transitions() {
        let seq = SymbolSequence::new(vec![3]).unwrap();
        assert_eq!(seq.transitions().count(), 0);
    }

    #[test]
    fn series_rejects_nan() {
        let result = TimeSeries::new(vec![1.0, f64::NAN, 3.0]);
        assert!(matches!(result, Err(DtwError::NonFiniteValue { index: 1 })));
    }

    #[test]
    fn series_rejects_empty() {
        assert!(matches!(TimeSeries::new(vec![]), Err(DtwError::EmptySequence)));
    }

    #[test]
    fn try_from_vec() {
        let seq: Result<SymbolSequence, _> = vec![1, 2].try_into();
        assert!(seq.is_ok());
        let ts: Result<TimeSeries, _> = vec![1.0, 2.0].try_into();
        assert_eq!(ts.unwrap().as_ref(), &[1.0, 2.0]);
    }
}
