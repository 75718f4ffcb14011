//! Error types for the AHP engine.

use thiserror::Error;

/// Reasons a sheet is rejected before repair. Non-fatal: the sheet is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("grid is {rows}x{cols}, expected a square matrix")]
    NotSquare { rows: usize, cols: usize },

    #[error("matrix order {order} is below the minimum of {min}")]
    TooSmall { order: usize, min: usize },
}

/// Errors raised by the aggregation pipeline and the weight table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AhpError {
    #[error("cannot aggregate an empty collection of matrices")]
    EmptyAggregation,

    #[error("matrix '{name}' has order {actual}, expected {expected} like the other sheets")]
    OrderMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("no valid comparison matrix could be read from the input")]
    NoValidMatrices,

    #[error("no expert matrix passed the consistency check (CR < {threshold})")]
    NoAdmittedMatrices { threshold: f64 },

    #[error("invalid weight row {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}

impl AhpError {
    /// Creates an invalid weight row error.
    pub fn invalid_row(line: usize, reason: impl Into<String>) -> Self {
        AhpError::InvalidRow {
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ShapeError::NotSquare { rows: 3, cols: 4 };
        assert_eq!(err.to_string(), "grid is 3x4, expected a square matrix");

        let err = AhpError::NoAdmittedMatrices { threshold: 0.1 };
        assert!(err.to_string().contains("CR < 0.1"));

        let err = AhpError::invalid_row(3, "expected 4 fields");
        assert_eq!(err.to_string(), "invalid weight row 3: expected 4 fields");
    }
}
