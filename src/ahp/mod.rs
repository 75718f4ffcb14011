//! AHP engine.
//!
//! Pure computations with no I/O: matrix repair, priority vectors and
//! consistency ratios, geometric-mean aggregation, per-expert admission,
//! and global weights for a category × criterion hierarchy.

pub mod aggregator;
pub mod global;
pub mod sanitizer;
pub mod shape;
pub mod solver;
pub mod validity;

pub use global::{combine, GlobalWeightTable};
pub use solver::{RandomIndexTable, WeightSolver};
pub use validity::{AggregationPolicy, GroupAnalyzer, ValidityFilter, DEFAULT_CR_THRESHOLD};
