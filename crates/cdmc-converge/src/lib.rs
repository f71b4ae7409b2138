//! Iterative model-based refinement of an initial sequence clustering.
//!
//! [`ConvergenceConfig::fit`] seeds a partition from pairwise DTW distances and
//! a hierarchical dendrogram, then alternates per-cluster model training and
//! reassignment until two consecutive assignments agree under the chosen
//! [`AgreementMetric`].

mod agreement;
mod config;
mod contingency;
mod engine;
mod error;
mod result;

pub use agreement::AgreementMetric;
pub use config::ConvergenceConfig;
pub use contingency::ContingencyTable;
pub use engine::LoopState;
pub use error::{AgreementError, ConvergeError};
pub use result::{ConvergenceResult, IterationRecord};
