//! Per-cluster generative models over symbol sequences.
//!
//! Every family implements [`SequenceModel`]: train once on a cluster's
//! members, then score any sequence by log-likelihood.

mod config;
mod error;
mod factory;
mod hmm;
mod markov;
mod model;
mod semi_markov;

pub use config::ModelConfig;
pub use error::ModelError;
pub use factory::ModelType;
pub use hmm::{EPSILON, HiddenMarkov};
pub use markov::MarkovChain;
pub use model::SequenceModel;
pub use semi_markov::SemiMarkov;
