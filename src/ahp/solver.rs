//! Priority vector and consistency computation.
//!
//! Uses the normalize-and-average approximation of the principal
//! eigenvector: normalize every column to sum to 1, then take row means.

use crate::models::{ConsistencyMetrics, PairwiseMatrix, PriorityVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Random index used for orders outside the table.
pub const RI_FALLBACK: f64 = 1.49;

/// Saaty random index, n = 1..10.
const RI_STANDARD: [f64; 10] = [0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// Saaty random index, n = 1..15.
const RI_EXTENDED: [f64; 15] = [
    0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49, 1.51, 1.48, 1.56, 1.57, 1.59,
];

/// Which random index table to use.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RandomIndexTable {
    /// Orders 1 to 10 (default)
    #[default]
    Standard,
    /// Orders 1 to 15
    Extended,
}

impl RandomIndexTable {
    /// Random index for a matrix of order `n`.
    pub fn lookup(&self, n: usize) -> f64 {
        let table: &[f64] = match self {
            RandomIndexTable::Standard => &RI_STANDARD,
            RandomIndexTable::Extended => &RI_EXTENDED,
        };
        n.checked_sub(1)
            .and_then(|idx| table.get(idx))
            .copied()
            .unwrap_or(RI_FALLBACK)
    }
}

impl fmt::Display for RandomIndexTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RandomIndexTable::Standard => write!(f, "standard (n = 1..10)"),
            RandomIndexTable::Extended => write!(f, "extended (n = 1..15)"),
        }
    }
}

/// Priority vector together with its consistency figures.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSolution {
    pub priorities: PriorityVector,
    pub metrics: ConsistencyMetrics,
}

/// Computes priority vectors and consistency ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightSolver {
    table: RandomIndexTable,
}

impl WeightSolver {
    pub fn new(table: RandomIndexTable) -> Self {
        Self { table }
    }

    /// Solve a repaired matrix.
    ///
    /// # Algorithm
    /// 1. Column sums `s_j`
    /// 2. `w_i` = row mean of `m[i][j] / s_j`
    /// 3. `lambda_max = Σ s_j·w_j`
    /// 4. `CI = (lambda_max - n) / (n - 1)` for n > 1
    /// 5. `CR = CI / RI(n)` for n > 2, else 0
    ///
    /// # Edge Cases
    /// - A zero column sum is not corrected: NaN propagates to the weights
    ///   and the consistency figures.
    pub fn solve(&self, matrix: &PairwiseMatrix) -> WeightSolution {
        let n = matrix.order();

        let col_sums: Vec<f64> = (0..n)
            .map(|j| (0..n).map(|i| matrix.get(i, j)).sum())
            .collect();

        let weights: Vec<f64> = (0..n)
            .map(|i| {
                let row_total: f64 = (0..n).map(|j| matrix.get(i, j) / col_sums[j]).sum();
                row_total / n as f64
            })
            .collect();

        let lambda_max: f64 = col_sums.iter().zip(&weights).map(|(s, w)| s * w).sum();

        let ci = if n > 1 {
            (lambda_max - n as f64) / (n as f64 - 1.0)
        } else {
            0.0
        };
        let ri = self.table.lookup(n);
        let cr = if n > 2 { ci / ri } else { 0.0 };

        WeightSolution {
            priorities: PriorityVector(weights),
            metrics: ConsistencyMetrics {
                lambda_max,
                ci,
                ri,
                cr,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn matrix(rows: &[&[f64]]) -> PairwiseMatrix {
        PairwiseMatrix::from(rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>())
    }

    #[test]
    fn test_random_index_lookup() {
        let standard = RandomIndexTable::Standard;
        assert_eq!(standard.lookup(1), 0.0);
        assert_eq!(standard.lookup(3), 0.58);
        assert_eq!(standard.lookup(10), 1.49);
        assert_eq!(standard.lookup(12), RI_FALLBACK);
        assert_eq!(standard.lookup(0), RI_FALLBACK);

        let extended = RandomIndexTable::Extended;
        assert_eq!(extended.lookup(12), 1.48);
        assert_eq!(extended.lookup(15), 1.59);
        assert_eq!(extended.lookup(16), RI_FALLBACK);
    }

    #[test]
    fn test_fully_indifferent_matrix() {
        let m = matrix(&[&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]]);
        let solution = WeightSolver::default().solve(&m);

        for w in solution.priorities.as_slice() {
            assert!((w - 1.0 / 3.0).abs() < EPS);
        }
        assert!((solution.metrics.lambda_max - 3.0).abs() < EPS);
        assert!(solution.metrics.ci.abs() < EPS);
        assert!(solution.metrics.cr.abs() < EPS);
    }

    #[test]
    fn test_saaty_three_criteria_example() {
        let m = matrix(&[
            &[1.0, 3.0, 1.0 / 5.0],
            &[1.0 / 3.0, 1.0, 1.0 / 7.0],
            &[5.0, 7.0, 1.0],
        ]);
        let solution = WeightSolver::default().solve(&m);

        let w = solution.priorities.as_slice();
        assert!((solution.priorities.sum() - 1.0).abs() < EPS);
        assert!(w[2] > w[0] && w[0] > w[1]);
        assert!(solution.metrics.lambda_max > 3.0);
        assert_eq!(solution.metrics.ri, 0.58);
        assert!(solution.metrics.cr > 0.0 && solution.metrics.cr < 0.10);
    }

    #[test]
    fn test_order_two_is_trivially_consistent() {
        let m = matrix(&[&[1.0, 9.0], &[1.0 / 9.0, 1.0]]);
        let solution = WeightSolver::default().solve(&m);

        assert_eq!(solution.metrics.cr, 0.0);
        assert!((solution.priorities.as_slice()[0] - 0.9).abs() < EPS);
    }

    #[test]
    fn test_order_one() {
        let m = matrix(&[&[1.0]]);
        let solution = WeightSolver::default().solve(&m);

        assert_eq!(solution.priorities.as_slice(), &[1.0]);
        assert_eq!(solution.metrics.ci, 0.0);
        assert_eq!(solution.metrics.cr, 0.0);
    }

    #[test]
    fn test_zero_column_propagates_nan() {
        let m = matrix(&[&[0.0, 1.0, 1.0], &[0.0, 1.0, 1.0], &[0.0, 1.0, 1.0]]);
        let solution = WeightSolver::default().solve(&m);

        assert!(solution.priorities.as_slice().iter().all(|w| w.is_nan()));
        assert!(solution.metrics.cr.is_nan());
    }

    fn saaty_value() -> impl Strategy<Value = f64> {
        prop_oneof![
            (1u32..=9).prop_map(f64::from),
            (2u32..=9).prop_map(|v| 1.0 / f64::from(v)),
        ]
    }

    fn reciprocal_matrix() -> impl Strategy<Value = PairwiseMatrix> {
        (2usize..10).prop_flat_map(|n| {
            prop::collection::vec(saaty_value(), n * (n - 1) / 2).prop_map(move |upper| {
                let mut m = PairwiseMatrix::identity(n);
                let mut cells = upper.into_iter();
                for i in 0..n {
                    for j in (i + 1)..n {
                        let v = cells.next().unwrap_or(1.0);
                        m.set(i, j, v);
                        m.set(j, i, 1.0 / v);
                    }
                }
                m
            })
        })
    }

    fn consistent_matrix() -> impl Strategy<Value = PairwiseMatrix> {
        prop::collection::vec(0.05f64..10.0, 3..10).prop_map(|w| {
            let rows = w
                .iter()
                .map(|wi| w.iter().map(|wj| wi / wj).collect())
                .collect::<Vec<Vec<f64>>>();
            PairwiseMatrix::from(rows)
        })
    }

    proptest! {
        #[test]
        fn prop_priorities_sum_to_one(m in reciprocal_matrix()) {
            let solution = WeightSolver::default().solve(&m);
            prop_assert!((solution.priorities.sum() - 1.0).abs() < EPS);
            prop_assert!(solution.priorities.as_slice().iter().all(|w| *w >= 0.0));
        }

        #[test]
        fn prop_consistent_matrix_has_zero_cr(m in consistent_matrix()) {
            let solution = WeightSolver::default().solve(&m);
            prop_assert!(solution.metrics.ci.abs() < EPS);
            prop_assert!(solution.metrics.cr.abs() < EPS);
        }
    }
}
