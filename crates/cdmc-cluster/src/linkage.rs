//! Linkage strategies for agglomerative clustering.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// How the distance from a freshly merged cluster to every other cluster is
/// derived, expressed as a Lance-Williams update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    /// Size-weighted mean of the member distances (UPGMA).
    #[default]
    Average,
    /// Largest member distance.
    Complete,
    /// Smallest member distance.
    Single,
    /// Unweighted mean of the two merged clusters' distances (WPGMA).
    Weighted,
}

impl Linkage {
    /// Distance from `i ∪ j` to a third cluster `k`, given `d(i, k)`,
    /// `d(j, k)` and the sizes of `i` and `j`.
    #[must_use]
    pub fn update(self, d_ik: f64, d_jk: f64, size_i: usize, size_j: usize) -> f64 {
        match self {
            Self::Average => {
                let (ni, nj) = (size_i as f64, size_j as f64);
                (ni * d_ik + nj * d_jk) / (ni + nj)
            }
            Self::Complete => d_ik.max(d_jk),
            Self::Single => d_ik.min(d_jk),
            Self::Weighted => 0.5 * (d_ik + d_jk),
        }
    }

    /// Lowercase name used in logs and summaries.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Complete => "complete",
            Self::Single => "single",
            Self::Weighted => "weighted",
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Linkage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "average" | "upgma" => Ok(Self::Average),
            "complete" => Ok(Self::Complete),
            "single" => Ok(Self::Single),
            "weighted" | "wpgma" => Ok(Self::Weighted),
            other => Err(format!("unknown linkage '{other}'")),
        }
    }
}
