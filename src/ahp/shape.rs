//! Shape normalization before repair.

use crate::error::ShapeError;
use crate::models::RawGrid;

/// Smallest matrix order accepted for analysis.
pub const MIN_ORDER: usize = 2;

/// Crop a grid to its top-left `size`×`size` block.
///
/// Only applies when `size` is set (and non-zero) and the grid is at least
/// that large in both directions; otherwise the grid is returned unchanged.
pub fn crop(grid: RawGrid, size: Option<usize>) -> RawGrid {
    match size {
        Some(n) if n > 0 && grid.rows() >= n && grid.cols() >= n => grid.crop(n),
        _ => grid,
    }
}

/// Crop, then check that the grid is square and of order at least 2.
pub fn normalize(grid: RawGrid, size: Option<usize>) -> Result<RawGrid, ShapeError> {
    let grid = crop(grid, size);

    if !grid.is_square() {
        return Err(ShapeError::NotSquare {
            rows: grid.rows(),
            cols: grid.cols(),
        });
    }

    if grid.rows() < MIN_ORDER {
        return Err(ShapeError::TooSmall {
            order: grid.rows(),
            min: MIN_ORDER,
        });
    }

    Ok(grid)
}
