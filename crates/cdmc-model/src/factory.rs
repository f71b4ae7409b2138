//! Model family selection.

use std::fmt;
use std::str::FromStr;

use crate::config::ModelConfig;
use crate::hmm::HiddenMarkov;
use crate::markov::MarkovChain;
use crate::model::SequenceModel;
use crate::semi_markov::SemiMarkov;

/// Family of per-cluster sequence model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModelType {
    /// First-order Markov chain over the observed symbols.
    #[default]
    MarkovChain,
    /// Jump chain plus per-symbol run-length distribution.
    SemiMarkov,
    /// Hidden Markov model trained with Baum-Welch.
    HiddenMarkov,
}

impl ModelType {
    /// Create a fresh, untrained model of this family.
    #[must_use]
    pub fn build(self, config: &ModelConfig) -> Box<dyn SequenceModel> {
        match self {
            Self::MarkovChain => Box::new(MarkovChain::new(config.n_symbols())),
            Self::SemiMarkov => {
                Box::new(SemiMarkov::new(config.n_symbols(), config.max_duration()))
            }
            Self::HiddenMarkov => Box::new(
                HiddenMarkov::new(config.n_states(), config.n_symbols(), config.seed())
                    .with_training(config.max_iter(), config.tolerance()),
            ),
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MarkovChain => "markov_chain",
            Self::SemiMarkov => "semi_markov",
            Self::HiddenMarkov => "hidden_markov",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "markov_chain" | "markov" => Ok(Self::MarkovChain),
            "semi_markov" => Ok(Self::SemiMarkov),
            "hidden_markov" | "hmm" => Ok(Self::HiddenMarkov),
            other => Err(format!("unknown model type '{other}'")),
        }
    }
}
