//! Domain types for cdmc-io.

use std::fmt;

use cdmc_dtw::{SymbolSequence, alphabet_size};

use crate::IoError;

/// A sequence identifier, taken from the first column of the input CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(String);

impl SequenceId {
    /// Create a new id from a non-empty string.
    pub(crate) fn new(id: String) -> Self {
        debug_assert!(!id.is_empty(), "sequence id must not be empty");
        Self(id)
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated experiment name used as output file prefix.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symbol sequences with their identifiers, in file order.
///
/// `ids[i]` names `sequences[i]`.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Sequence identifiers in row order.
    pub ids: Vec<SequenceId>,
    /// Validated sequences in the same order as `ids`.
    pub sequences: Vec<SymbolSequence>,
}

impl Dataset {
    /// Number of sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// True when the dataset holds no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Smallest alphabet covering every sequence.
    #[must_use]
    pub fn alphabet_size(&self) -> usize {
        alphabet_size(&self.sequences)
    }

    /// Look up a sequence by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SymbolSequence> {
        self.ids
            .iter()
            .position(|candidate| candidate.as_str() == id)
            .map(|i| &self.sequences[i])
    }
}
