//! External agreement metrics between two partitions.

use std::fmt;
use std::str::FromStr;

use tracing::error;

use crate::contingency::ContingencyTable;
use crate::error::AgreementError;

/// Metric comparing two labelings of the same items; 1 means identical
/// partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AgreementMetric {
    /// Share of item pairs on which both partitions agree.
    #[default]
    RandIndex,
    /// Rand index corrected for chance.
    AdjustedRandIndex,
    /// Mutual information over the mean entropy of the two partitions.
    NormalizedMutualInformation,
    /// Share of items in the majority first-partition label of their
    /// second-partition cluster. Not symmetric.
    Purity,
}

fn pairs(count: usize) -> f64 {
    let c = count as f64;
    c * (c - 1.0) / 2.0
}

fn entropy(sums: &[usize], total: f64) -> f64 {
    sums.iter()
        .filter(|&&s| s > 0)
        .map(|&s| {
            let p = s as f64 / total;
            -p * p.ln()
        })
        .sum()
}

impl AgreementMetric {
    /// Score two label vectors, returning a neutral 0 on invalid input.
    ///
    /// Invalid input (empty or mismatched vectors) is logged at `error`.
    #[must_use]
    pub fn score(self, a: &[usize], b: &[usize]) -> f64 {
        match self.try_score(a, b) {
            Ok(value) => value,
            Err(err) => {
                error!(metric = self.name(), %err, "agreement not computable, using 0");
                0.0
            }
        }
    }

    /// Score two label vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AgreementError::Empty`] | Zero labels provided |
    /// | [`AgreementError::LengthMismatch`] | `a` and `b` differ in length |
    pub fn try_score(self, a: &[usize], b: &[usize]) -> Result<f64, AgreementError> {
        Ok(self.score_table(&ContingencyTable::from_labels(a, b)?))
    }

    /// Score a contingency table (rows = first partition, columns = second).
    ///
    /// Degenerate denominators yield 0.
    #[must_use]
    pub fn score_table(self, table: &ContingencyTable) -> f64 {
        match self {
            Self::RandIndex => rand_index(table),
            Self::AdjustedRandIndex => adjusted_rand_index(table),
            Self::NormalizedMutualInformation => normalized_mutual_information(table),
            Self::Purity => purity(table),
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::RandIndex => "rand_index",
            Self::AdjustedRandIndex => "adjusted_rand_index",
            Self::NormalizedMutualInformation => "normalized_mutual_information",
            Self::Purity => "purity",
        }
    }
}

fn rand_index(table: &ContingencyTable) -> f64 {
    let all_pairs = pairs(table.total());
    if all_pairs == 0.0 {
        return 0.0;
    }
    let tp: f64 = table.cells().map(pairs).sum();
    let tp_fp: f64 = table.col_sums().into_iter().map(pairs).sum();
    let tp_fn: f64 = table.row_sums().into_iter().map(pairs).sum();
    let (fp, fn_) = (tp_fp - tp, tp_fn - tp);
    let tn = all_pairs - tp - fp - fn_;
    (tp + tn) / all_pairs
}

fn adjusted_rand_index(table: &ContingencyTable) -> f64 {
    let all_pairs = pairs(table.total());
    if all_pairs == 0.0 {
        return 0.0;
    }
    let index: f64 = table.cells().map(pairs).sum();
    let rows: f64 = table.row_sums().into_iter().map(pairs).sum();
    let cols: f64 = table.col_sums().into_iter().map(pairs).sum();
    let expected = rows * cols / all_pairs;
    let max = 0.5 * (rows + cols);
    let denominator = max - expected;
    if denominator == 0.0 {
        return 0.0;
    }
    (index - expected) / denominator
}

fn normalized_mutual_information(table: &ContingencyTable) -> f64 {
    let total = table.total() as f64;
    let rows = table.row_sums();
    let cols = table.col_sums();
    let h = entropy(&rows, total) + entropy(&cols, total);
    if h == 0.0 {
        return 0.0;
    }
    let mut mutual = 0.0;
    for (i, row) in table.as_rows().iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let joint = count as f64 / total;
            let independent = (rows[i] as f64 / total) * (cols[j] as f64 / total);
            mutual += joint * (joint / independent).ln();
        }
    }
    2.0 * mutual / h
}

fn purity(table: &ContingencyTable) -> f64 {
    let width = table.as_rows().first().map_or(0, Vec::len);
    let majority: usize = (0..width)
        .map(|j| table.as_rows().iter().map(|r| r[j]).max().unwrap_or(0))
        .sum();
    majority as f64 / table.total() as f64
}

impl fmt::Display for AgreementMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgreementMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "rand_index" | "ri" => Ok(Self::RandIndex),
            "adjusted_rand_index" | "ari" => Ok(Self::AdjustedRandIndex),
            "normalized_mutual_information" | "nmi" => Ok(Self::NormalizedMutualInformation),
            "purity" => Ok(Self::Purity),
            other => Err(format!("unknown agreement metric '{other}'")),
        }
    }
}
