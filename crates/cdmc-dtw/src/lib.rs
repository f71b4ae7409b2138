//! Dynamic Time Warping over discrete symbols and real-valued samples.
//!
//! Pure math library with zero I/O. Provides the plain recurrence, a
//! Sakoe-Chiba band, a globally weighted variant that penalises drift from the
//! diagonal, warping path extraction and parallel pairwise distance matrices.

mod constraint;
mod cost;
mod distance;
mod dtw;
mod error;
mod grid;
mod matrix;
mod path;
mod sequence;

pub use constraint::BandConstraint;
pub use cost::{AbsoluteDifference, FnCost, LocalCost, SquaredDifference, SymbolMismatch};
pub use distance::DtwDistance;
pub use dtw::{DEFAULT_COST_WEIGHT, Dtw, Weighting};
pub use error::{DtwError, MatrixError};
pub use grid::CumulativeCost;
pub use matrix::DistanceMatrix;
pub use path::{WarpingPath, WarpingStep};
pub use sequence::{Symbol, SymbolSequence, TimeSeries, alphabet_size};
