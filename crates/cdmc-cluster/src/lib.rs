//! Agglomerative hierarchical clustering over DTW distance matrices.
//!
//! Builds a dendrogram with a selectable linkage and flattens it into an
//! initial k-way partition with a breadth-first, stack-based reduction.

mod assignment;
mod config;
mod dendrogram;
mod error;
mod flatten;
mod label;
mod linkage;

pub use assignment::ClusterAssignment;
pub use config::HierarchicalConfig;
pub use dendrogram::{Dendrogram, DendrogramNode};
pub use error::ClusterError;
pub use flatten::ClusterWrapperNode;
pub use label::ClusterLabel;
pub use linkage::Linkage;
