//! Matrix repair.
//!
//! Turns a raw square grid into a reciprocal pairwise comparison matrix:
//! the diagonal is forced to 1, blank or zero judgments in the upper
//! triangle become 1 (equal importance), and the lower triangle is always
//! rebuilt from the upper triangle.

use crate::models::{PairwiseMatrix, RawGrid};
use tracing::{debug, warn};

/// Repair a raw grid into a reciprocal matrix.
///
/// The grid must already be square; shape checks happen before this step.
pub fn repair_matrix(raw: &RawGrid) -> PairwiseMatrix {
    debug_assert!(raw.is_square(), "repair_matrix expects a square grid");

    let order = raw.rows();
    let mut matrix = PairwiseMatrix::identity(order);
    let mut defaulted = 0usize;

    // Upper triangle first: the lower triangle is derived from it.
    for i in 0..order {
        for j in (i + 1)..order {
            let value = raw.get(i, j);
            if value == 0.0 || value.is_nan() {
                matrix.set(i, j, 1.0);
                defaulted += 1;
            } else {
                matrix.set(i, j, value);
            }
        }
    }

    for i in 0..order {
        for j in (i + 1)..order {
            let upper = matrix.get(i, j);
            matrix.set(j, i, reciprocal_or_one(upper));
        }
    }

    if defaulted > 0 {
        debug!(
            "Filled {} blank or zero judgment(s) with 1 in a {}x{} matrix",
            defaulted, order, order
        );
    }

    matrix
}

/// Reciprocal of a judgment. A zero judgment has no reciprocal and maps to 1.
///
/// `repair_matrix` never passes 0 here, since its upper-triangle pass has
/// already replaced zero judgments with 1. The zero branch only guards
/// other callers.
fn reciprocal_or_one(value: f64) -> f64 {
    if value == 0.0 {
        warn!("Zero judgment has no reciprocal, using 1");
        1.0
    } else {
        1.0 / value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NAN: f64 = f64::NAN;

    #[test]
    fn test_diagonal_forced_to_one() {
        let raw = RawGrid::from_rows(vec![
            vec![7.0, 3.0, 5.0],
            vec![0.0, NAN, 2.0],
            vec![9.0, 9.0, 0.0],
        ]);
        let m = repair_matrix(&raw);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
        }
    }

    #[test]
    fn test_zero_upper_cell_becomes_equal_importance() {
        let raw = RawGrid::from_rows(vec![
            vec![1.0, 0.0, 3.0],
            vec![1.0, 1.0, 2.0],
            vec![1.0, 1.0, 1.0],
        ]);
        let m = repair_matrix(&raw);
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 0), 1.0);
    }

    #[test]
    fn test_missing_upper_cell_becomes_one() {
        let raw = RawGrid::from_rows(vec![vec![1.0, NAN], vec![NAN, 1.0]]);
        let m = repair_matrix(&raw);
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 0), 1.0);
    }

    #[test]
    fn test_lower_triangle_overwritten_from_upper() {
        // Lower triangle disagrees with the upper triangle.
        let raw = RawGrid::from_rows(vec![
            vec![1.0, 4.0, 0.5],
            vec![4.0, 1.0, 2.0],
            vec![8.0, 7.0, 1.0],
        ]);
        let m = repair_matrix(&raw);
        assert_eq!(m.get(1, 0), 0.25);
        assert_eq!(m.get(2, 0), 2.0);
        assert_eq!(m.get(2, 1), 0.5);
        assert!(m.is_reciprocal(1e-12));
    }

    #[test]
    fn test_reciprocal_of_zero_falls_back_to_one() {
        assert_eq!(reciprocal_or_one(0.0), 1.0);
        assert_eq!(reciprocal_or_one(-0.0), 1.0);
        assert_eq!(reciprocal_or_one(4.0), 0.25);
    }

    fn raw_cell() -> impl Strategy<Value = f64> {
        prop_oneof![
            Just(0.0),
            Just(f64::NAN),
            (1u32..=9).prop_map(f64::from),
            (1u32..=9).prop_map(|v| 1.0 / f64::from(v)),
        ]
    }

    fn raw_grid() -> impl Strategy<Value = RawGrid> {
        (2usize..9).prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(raw_cell(), n), n)
                .prop_map(RawGrid::from_rows)
        })
    }

    proptest! {
        #[test]
        fn prop_repaired_matrix_is_reciprocal(raw in raw_grid()) {
            let m = repair_matrix(&raw);
            prop_assert_eq!(m.order(), raw.rows());
            for i in 0..m.order() {
                prop_assert_eq!(m.get(i, i), 1.0);
                for j in 0..m.order() {
                    if i != j && m.get(i, j) != 0.0 {
                        prop_assert!((m.get(j, i) - 1.0 / m.get(i, j)).abs() < 1e-12);
                    }
                }
            }
        }
    }
}
