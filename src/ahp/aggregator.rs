//! Group aggregation of expert matrices.
//!
//! Combines several reciprocal matrices into one group matrix using the
//! element-wise geometric mean, which keeps the reciprocal property.

use crate::error::AhpError;
use crate::models::PairwiseMatrix;

/// Element-wise geometric mean of equally sized matrices.
///
/// For each cell the values are multiplied and the product is raised to
/// `1/k`. Values are multiplied in sorted order, so the result does not
/// depend on the order of `matrices`; a cell on which every matrix agrees is
/// copied as-is.
///
/// # Errors
/// - `EmptyAggregation` when `matrices` is empty
/// - `OrderMismatch` when the matrices differ in order
pub fn geometric_mean(matrices: &[(&str, &PairwiseMatrix)]) -> Result<PairwiseMatrix, AhpError> {
    let (_, first) = matrices.first().ok_or(AhpError::EmptyAggregation)?;
    let order = first.order();

    if let Some((name, other)) = matrices.iter().find(|(_, m)| m.order() != order) {
        return Err(AhpError::OrderMismatch {
            name: name.to_string(),
            expected: order,
            actual: other.order(),
        });
    }

    let exponent = 1.0 / matrices.len() as f64;
    let mut result = PairwiseMatrix::identity(order);
    let mut cell_values = Vec::with_capacity(matrices.len());

    for i in 0..order {
        for j in 0..order {
            cell_values.clear();
            cell_values.extend(matrices.iter().map(|(_, m)| m.get(i, j)));
            cell_values.sort_by(f64::total_cmp);

            let lowest = cell_values[0];
            let highest = cell_values[cell_values.len() - 1];
            let value = if lowest == highest {
                lowest
            } else {
                cell_values.iter().product::<f64>().powf(exponent)
            };

            result.set(i, j, value);
        }
    }

    Ok(result)
}
