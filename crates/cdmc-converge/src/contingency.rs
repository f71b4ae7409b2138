//! Contingency table between two partitions of the same items.

use std::fmt;

use crate::error::AgreementError;

/// Counts of items per `(label in A, label in B)` pair.
///
/// Entry `as_rows()[a][b]` counts how many items carry label `a` in the
/// first partition and label `b` in the second. Rows span `0..=max(A)` and
/// columns `0..=max(B)`; unused labels contribute empty rows or columns,
/// which no metric is sensitive to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyTable {
    counts: Vec<Vec<usize>>,
    total: usize,
}

impl ContingencyTable {
    /// Build a table from two label vectors of equal length.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AgreementError::Empty`] | Zero labels provided |
    /// | [`AgreementError::LengthMismatch`] | `a` and `b` differ in length |
    pub fn from_labels(a: &[usize], b: &[usize]) -> Result<Self, AgreementError> {
        if a.len() != b.len() {
            return Err(AgreementError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        let (Some(&max_a), Some(&max_b)) = (a.iter().max(), b.iter().max()) else {
            return Err(AgreementError::Empty);
        };
        let mut counts = vec![vec![0usize; max_b + 1]; max_a + 1];
        for (&la, &lb) in a.iter().zip(b) {
            counts[la][lb] += 1;
        }
        Ok(Self {
            counts,
            total: a.len(),
        })
    }

    /// Wrap a precomputed rectangular table of counts.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`AgreementError::Empty`] | No rows, no columns, or every count is zero |
    /// | [`AgreementError::Ragged`] | Rows differ in length |
    pub fn from_counts(counts: Vec<Vec<usize>>) -> Result<Self, AgreementError> {
        let expected = counts.first().map_or(0, Vec::len);
        if let Some((row, r)) = counts.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(AgreementError::Ragged {
                row,
                len: r.len(),
                expected,
            });
        }
        let total: usize = counts.iter().flatten().sum();
        if total == 0 {
            return Err(AgreementError::Empty);
        }
        Ok(Self { counts, total })
    }

    /// Number of items compared.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Per-label item counts of the first partition.
    #[must_use]
    pub fn row_sums(&self) -> Vec<usize> {
        self.counts.iter().map(|r| r.iter().sum()).collect()
    }

    /// Per-label item counts of the second partition.
    #[must_use]
    pub fn col_sums(&self) -> Vec<usize> {
        let width = self.counts.first().map_or(0, Vec::len);
        (0..width).map(|j| self.counts.iter().map(|r| r[j]).sum()).collect()
    }

    /// Return the underlying rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Iterate over every cell count.
    pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.counts.iter().flatten().copied()
    }
}

impl fmt::Display for ContingencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.counts.first().map_or(0, Vec::len);
        write!(f, "{:>6}", "")?;
        for j in 0..width {
            write!(f, " b_{j:<4}")?;
        }
        writeln!(f)?;
        for (i, row) in self.counts.iter().enumerate() {
            write!(f, "a_{i:<4}")?;
            for count in row {
                write!(f, " {count:>6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_pairs_of_labels() {
        let t = ContingencyTable::from_labels(&[0, 0, 1, 1, 2], &[1, 1, 0, 1, 0]).unwrap();
        assert_eq!(t.as_rows(), &[vec![0, 2], vec![1, 1], vec![1, 0]]);
        assert_eq!(t.row_sums(), vec![2, 2, 1]);
        assert_eq!(t.col_sums(), vec![2, 3]);
        assert_eq!(t.total(), 5);
    }

    #[test]
    fn from_counts_validates() {
        assert!(matches!(
            ContingencyTable::from_counts(vec![vec![1, 2], vec![3]]),
            Err(AgreementError::Ragged { row: 1, len: 1, expected: 2 })
        ));
        assert!(matches!(ContingencyTable::from_counts(vec![]), Err(AgreementError::Empty)));
        assert!(matches!(
            ContingencyTable::from_counts(vec![vec![0, 0]]),
            Err(AgreementError::Empty)
        ));
        assert_eq!(ContingencyTable::from_counts(vec![vec![2, 3]]).unwrap().total(), 5);
    }

    #[test]
    fn from_labels_rejects_bad_input() {
        assert!(matches!(ContingencyTable::from_labels(&[], &[]), Err(AgreementError::Empty)));
        assert!(matches!(
            ContingencyTable::from_labels(&[0, 1], &[0]),
            Err(AgreementError::LengthMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn display_has_one_line_per_row() {
        let t = ContingencyTable::from_counts(vec![vec![20, 24], vec![20, 72]]).unwrap();
        let text = t.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("72"));
    }
}
