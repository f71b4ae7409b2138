/// Errors from configuring and training sequence models.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Returned when a model is configured with an empty alphabet.
    #[error("alphabet must contain at least one symbol")]
    EmptyAlphabet,

    /// Returned when a training sequence contains a symbol outside the
    /// configured alphabet.
    #[error("training sequence {sequence} contains symbol {symbol}, alphabet size is {n_symbols}")]
    SymbolOutOfRange {
        /// Position of the offending sequence in the training set.
        sequence: usize,
        /// The out-of-range symbol.
        symbol: usize,
        /// Configured alphabet size.
        n_symbols: usize,
    },

    /// Returned when supplied model parameters have the wrong shape or a row
    /// that is not a probability distribution.
    #[error("invalid {what} parameters: {reason}")]
    InvalidParameters {
        /// Which parameter block was rejected.
        what: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
}
