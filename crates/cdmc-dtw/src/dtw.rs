//! DTW distance computation and alignment.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::constraint::BandConstraint;
use crate::cost::{LocalCost, SymbolMismatch};
use crate::distance::DtwDistance;
use crate::error::DtwError;
use crate::grid::CumulativeCost;
use crate::matrix::DistanceMatrix;
use crate::path::{WarpingPath, WarpingStep};

/// Default share of the raw alignment cost in the globally weighted score.
pub const DEFAULT_COST_WEIGHT: f64 = 0.89;

/// How an accumulated cell is scored when choosing its predecessor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Weighting {
    /// The score is the accumulated local cost.
    #[default]
    Plain,

    /// The score is `cost_weight * cost + (1 - cost_weight) * sqrt(deviation)`,
    /// where `deviation` accumulates every visited cell's distance
    /// `|j - i * len_b / len_a|` from the scaled main diagonal.
    ///
    /// The diagonal is scaled along the first sequence, so the score is not
    /// symmetric when the lengths differ. [`Dtw::pairwise`] always evaluates
    /// `distance(s[i], s[j])` with `i < j`.
    GlobalDiagonal {
        /// Share of the raw alignment cost, in `(0, 1]`.
        cost_weight: f64,
    },
}

impl Weighting {
    fn score(self, cell: Cell) -> f64 {
        match self {
            Self::Plain => cell.cost,
            Self::GlobalDiagonal { cost_weight } => {
                cost_weight * cell.cost + (1.0 - cost_weight) * cell.deviation.sqrt()
            }
        }
    }
}

/// Direction from which a cell was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    /// From `(i-1, j-1)`.
    Diagonal,
    /// From `(i-1, j)`.
    Vertical,
    /// From `(i, j-1)`.
    Horizontal,
}

/// Pick the predecessor with the lowest score.
///
/// Diagonal wins a tie against vertical; the winner of that comparison wins a
/// tie against horizontal. Alignment paths depend on this order.
fn choose(diagonal: f64, vertical: f64, horizontal: f64) -> Move {
    let (best, mv) = if diagonal <= vertical {
        (diagonal, Move::Diagonal)
    } else {
        (vertical, Move::Vertical)
    };
    if best <= horizontal { mv } else { Move::Horizontal }
}

/// Accumulators of one grid cell.
#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: f64,
    deviation: f64,
}

impl Cell {
    const UNREACHED: Self = Self {
        cost: f64::INFINITY,
        deviation: 0.0,
    };
    const ORIGIN: Self = Self {
        cost: 0.0,
        deviation: 0.0,
    };
}

/// Immutable DTW configuration: local cost, band and path weighting.
///
/// The three variants are combinations of the last two fields: plain
/// (unconstrained, [`Weighting::Plain`]), banded
/// ([`BandConstraint::SakoeChibaRadius`]) and globally weighted
/// ([`Weighting::GlobalDiagonal`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dtw<C = SymbolMismatch> {
    cost: C,
    constraint: BandConstraint,
    weighting: Weighting,
}

impl Dtw<SymbolMismatch> {
    /// Plain, unconstrained DTW over discrete symbols with 0/1 local cost.
    #[must_use]
    pub fn symbolic() -> Self {
        Self::new(SymbolMismatch)
    }
}

impl Default for Dtw<SymbolMismatch> {
    fn default() -> Self {
        Self::symbolic()
    }
}

impl<C: LocalCost> Dtw<C> {
    /// Plain, unconstrained DTW with the given local cost.
    #[must_use]
    pub fn new(cost: C) -> Self {
        Self {
            cost,
            constraint: BandConstraint::Unconstrained,
            weighting: Weighting::Plain,
        }
    }

    /// Restrict alignments to a band of `radius` cells around the diagonal.
    #[must_use]
    pub fn with_sakoe_chiba(self, radius: usize) -> Self {
        self.with_constraint(BandConstraint::SakoeChibaRadius(radius))
    }

    /// Replace the band constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Switch to the globally weighted variant.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidCostWeight`] | `cost_weight` is not in `(0, 1]` |
    pub fn with_global_weight(mut self, cost_weight: f64) -> Result<Self, DtwError> {
        if !(cost_weight > 0.0 && cost_weight <= 1.0) {
            return Err(DtwError::InvalidCostWeight { weight: cost_weight });
        }
        self.weighting = Weighting::GlobalDiagonal { cost_weight };
        Ok(self)
    }

    /// Return the band constraint.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Return the path weighting.
    #[must_use]
    pub fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Return the local cost function.
    #[must_use]
    pub fn local_cost(&self) -> &C {
        &self.cost
    }

    /// Compute the DTW distance between two sequences.
    ///
    /// Uses a rolling two-row buffer and runs in O(n * m) time, O(m) space.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | Either sequence is empty |
    /// | [`DtwError::Unreachable`] | No finite-cost alignment exists |
    #[instrument(level = "trace", skip_all, fields(len_a = a.len(), len_b = b.len()))]
    pub fn distance(&self, a: &[C::Item], b: &[C::Item]) -> Result<DtwDistance, DtwError> {
        check_non_empty(a, b)?;
        let value = self.rolling(a, b);
        if !value.is_finite() {
            return Err(DtwError::Unreachable {
                len_a: a.len(),
                len_b: b.len(),
            });
        }
        Ok(DtwDistance::new(value))
    }

    /// Compute the DTW distance and the optimal warping path.
    ///
    /// Allocates the full grid plus a direction table for traceback. The path
    /// starts at `(0, 0)`, ends at `(len_a - 1, len_b - 1)` and advances by at
    /// most one index in each sequence per step.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | Either sequence is empty |
    /// | [`DtwError::Unreachable`] | No finite-cost alignment exists |
    #[instrument(level = "trace", skip_all, fields(len_a = a.len(), len_b = b.len()))]
    pub fn distance_and_path(
        &self,
        a: &[C::Item],
        b: &[C::Item],
    ) -> Result<(DtwDistance, WarpingPath), DtwError> {
        check_non_empty(a, b)?;
        let (n, m) = (a.len(), b.len());
        let (cells, moves) = self.fill(a, b);
        let value = self.weighting.score(cells[cells.len() - 1]);
        if !value.is_finite() {
            return Err(DtwError::Unreachable { len_a: n, len_b: m });
        }
        Ok((DtwDistance::new(value), traceback(&moves, n, m)))
    }

    /// Compute the full accumulated-cost grid, sentinel border stripped.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | Either sequence is empty |
    pub fn cumulative_cost(
        &self,
        a: &[C::Item],
        b: &[C::Item],
    ) -> Result<CumulativeCost, DtwError> {
        check_non_empty(a, b)?;
        let (n, m) = (a.len(), b.len());
        let width = m + 1;
        let (cells, _) = self.fill(a, b);
        let values = (1..=n)
            .flat_map(|i| (1..=m).map(move |j| i * width + j))
            .map(|idx| self.weighting.score(cells[idx]))
            .collect();
        Ok(CumulativeCost::new(n, m, values))
    }

    /// Compute pairwise DTW distances for a collection of sequences.
    ///
    /// Each unordered pair is computed once (as `distance(s[i], s[j])` with
    /// `i < j`) and mirrored by the returned [`DistanceMatrix`]. Pairs are
    /// distributed over the rayon pool; every pair runs the same sequential
    /// recurrence, so results do not depend on the thread count.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequenceAt`] | A sequence of the batch is empty |
    /// | [`DtwError::Unreachable`] | A pair has no finite-cost alignment |
    #[instrument(skip_all, fields(n = sequences.len()))]
    pub fn pairwise<S>(&self, sequences: &[S]) -> Result<DistanceMatrix, DtwError>
    where
        S: AsRef<[C::Item]> + Sync,
        C: Sync,
        C::Item: Sync,
    {
        if let Some(index) = sequences.iter().position(|s| s.as_ref().is_empty()) {
            return Err(DtwError::EmptySequenceAt { index });
        }
        let n = sequences.len();
        let total_pairs = n * n.saturating_sub(1) / 2;

        let distances: Vec<f64> = (0..total_pairs)
            .into_par_iter()
            .map(|flat_idx| {
                let (row, col) = triangle_coords(flat_idx);
                self.distance(sequences[col].as_ref(), sequences[row].as_ref())
                    .map(DtwDistance::value)
            })
            .collect::<Result<_, _>>()?;

        debug!(pairs = total_pairs, "pairwise distances computed");
        Ok(DistanceMatrix::from_raw(n, distances))
    }

    /// Relax cell `(i, j)` from its three predecessors.
    #[allow(clippy::too_many_arguments)]
    fn relax(
        &self,
        a: &[C::Item],
        b: &[C::Item],
        i: usize,
        j: usize,
        slope: f64,
        diagonal: Cell,
        vertical: Cell,
        horizontal: Cell,
    ) -> (Cell, Move) {
        let w = self.weighting;
        let mv = choose(w.score(diagonal), w.score(vertical), w.score(horizontal));
        let from = match mv {
            Move::Diagonal => diagonal,
            Move::Vertical => vertical,
            Move::Horizontal => horizontal,
        };
        let cell = Cell {
            cost: from.cost + self.cost.cost(&a[i], &b[j]),
            deviation: from.deviation + (j as f64 - i as f64 * slope).abs(),
        };
        (cell, mv)
    }

    /// Distance-only recurrence over two rows of width `m + 1`; column 0 of
    /// each row is the sentinel border.
    fn rolling(&self, a: &[C::Item], b: &[C::Item]) -> f64 {
        let (n, m) = (a.len(), b.len());
        let slope = m as f64 / n as f64;

        let mut prev = vec![Cell::UNREACHED; m + 1];
        let mut curr = vec![Cell::UNREACHED; m + 1];
        prev[0] = Cell::ORIGIN;

        for i in 0..n {
            curr.fill(Cell::UNREACHED);
            for j in self.constraint.column_range(i, n, m) {
                let (cell, _) = self.relax(a, b, i, j, slope, prev[j], prev[j + 1], curr[j]);
                curr[j + 1] = cell;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        self.weighting.score(prev[m])
    }

    /// Full `(n+1) x (m+1)` grid with the sentinel border, plus the move that
    /// entered each of the `n x m` inner cells.
    fn fill(&self, a: &[C::Item], b: &[C::Item]) -> (Vec<Cell>, Vec<Move>) {
        let (n, m) = (a.len(), b.len());
        let slope = m as f64 / n as f64;
        let width = m + 1;

        let mut cells = vec![Cell::UNREACHED; (n + 1) * width];
        cells[0] = Cell::ORIGIN;
        let mut moves = vec![Move::Diagonal; n * m];

        for i in 0..n {
            for j in self.constraint.column_range(i, n, m) {
                let (cell, mv) = self.relax(
                    a,
                    b,
                    i,
                    j,
                    slope,
                    cells[i * width + j],
                    cells[i * width + j + 1],
                    cells[(i + 1) * width + j],
                );
                cells[(i + 1) * width + j + 1] = cell;
                moves[i * m + j] = mv;
            }
        }

        (cells, moves)
    }
}

fn check_non_empty<T>(a: &[T], b: &[T]) -> Result<(), DtwError> {
    if a.is_empty() || b.is_empty() {
        return Err(DtwError::EmptySequence);
    }
    Ok(())
}

/// Walk the move table back from `(n-1, m-1)` to `(0, 0)`.
///
/// Only called when the final cell is finite, so every visited cell was
/// entered from a finite predecessor and the walk never leaves the grid.
fn traceback(moves: &[Move], n: usize, m: usize) -> WarpingPath {
    let (mut i, mut j) = (n - 1, m - 1);
    let mut steps = vec![WarpingStep { i, j }];
    while i > 0 || j > 0 {
        match moves[i * m + j] {
            Move::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Move::Vertical => i -= 1,
            Move::Horizontal => j -= 1,
        }
        steps.push(WarpingStep { i, j });
    }
    steps.reverse();
    WarpingPath::new(steps)
}

/// Map a flat lower-triangle index `row * (row - 1) / 2 + col` back to
/// `(row, col)` with `row > col`.
fn triangle_coords(flat_idx: usize) -> (usize, usize) {
    let mut row = ((1.0 + (1.0 + 8.0 * flat_idx as f64).sqrt()) / 2.0).floor() as usize;
    // Correct float rounding on very large indices.
    while row * (row - 1) / 2 > flat_idx {
        row -= 1;
    }
    while (row + 1) * row / 2 <= flat_idx {
        row += 1;
    }
    (row, flat_idx - row * (row - 1) / 2)
}
