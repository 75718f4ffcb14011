//! Data models for the AHP toolkit.
//!
//! This module contains the core data structures used throughout
//! the application: raw grids, pairwise comparison matrices, priority
//! vectors, consistency metrics, expert submissions and reports.

use crate::ahp::{AggregationPolicy, RandomIndexTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell as read from a sheet or an editable table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric cell.
    Number(f64),
    /// Free text: labels, formulas, or numbers typed as text.
    Text(String),
    /// Blank cell.
    #[default]
    Empty,
}

impl Cell {
    /// Build a cell from raw delimited text. Blank text is an empty cell.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Numeric value of the cell, if it has one.
    ///
    /// Text is accepted when it parses as a float or as a simple
    /// fraction such as `1/3`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => parse_number(s),
            Cell::Empty => None,
        }
    }

    /// Numeric value, with missing and non-numeric cells mapped to NaN.
    pub fn coerce(&self) -> f64 {
        self.as_number().unwrap_or(f64::NAN)
    }

    /// Numeric value for weight columns: anything non-numeric counts as 0.
    pub fn coerce_weight(&self) -> f64 {
        self.as_number().filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Ok(v) = text.parse::<f64>() {
        return Some(v);
    }

    let (num, den) = text.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    Some(num / den)
}

/// A rectangular grid of numbers read from one sheet, before repair.
///
/// Missing cells are stored as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<f64>>", from = "Vec<Vec<f64>>")]
pub struct RawGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl RawGrid {
    /// Create a grid from rows. Short rows are padded with NaN.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let n_rows = rows.len();
        let mut values = Vec::with_capacity(n_rows * cols);

        for mut row in rows {
            row.resize(cols, f64::NAN);
            values.extend(row);
        }

        Self {
            rows: n_rows,
            cols,
            values,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at (row, col); NaN outside the grid.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row < self.rows && col < self.cols {
            self.values[row * self.cols + col]
        } else {
            f64::NAN
        }
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Top-left `size`×`size` block of the grid.
    pub fn crop(&self, size: usize) -> Self {
        let rows = (0..size.min(self.rows))
            .map(|r| (0..size.min(self.cols)).map(|c| self.get(r, c)).collect())
            .collect();
        Self::from_rows(rows)
    }

    /// Drop rows that are entirely missing, then columns that are entirely missing.
    pub fn trim_blank(&self) -> Self {
        let kept_rows: Vec<usize> = (0..self.rows)
            .filter(|&r| (0..self.cols).any(|c| !self.get(r, c).is_nan()))
            .collect();
        let kept_cols: Vec<usize> = (0..self.cols)
            .filter(|&c| kept_rows.iter().any(|&r| !self.get(r, c).is_nan()))
            .collect();

        let rows = kept_rows
            .iter()
            .map(|&r| kept_cols.iter().map(|&c| self.get(r, c)).collect())
            .collect();
        Self::from_rows(rows)
    }

    /// Row-major copy of the grid.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows)
            .map(|r| (0..self.cols).map(|c| self.get(r, c)).collect())
            .collect()
    }
}

impl From<Vec<Vec<f64>>> for RawGrid {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self::from_rows(rows)
    }
}

impl From<RawGrid> for Vec<Vec<f64>> {
    fn from(grid: RawGrid) -> Self {
        grid.to_rows()
    }
}

/// One sheet of an input workbook: a name and its trimmed grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub grid: RawGrid,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, grid: RawGrid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// Square reciprocal pairwise comparison matrix.
///
/// Entry (i, j) states how much more important criterion `i` is than
/// criterion `j`. Serialized as a list of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<f64>>", from = "Vec<Vec<f64>>")]
pub struct PairwiseMatrix {
    order: usize,
    values: Vec<f64>,
}

impl PairwiseMatrix {
    /// Identity matrix: every criterion equally important.
    pub fn identity(order: usize) -> Self {
        let mut values = vec![0.0; order * order];
        for i in 0..order {
            values[i * order + i] = 1.0;
        }
        Self { order, values }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.order + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.order + col] = value;
    }

    /// Iterate over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.order.max(1))
    }

    /// Whether the diagonal is 1 and `m[j][i] == 1/m[i][j]` within `tolerance`.
    pub fn is_reciprocal(&self, tolerance: f64) -> bool {
        (0..self.order).all(|i| {
            (self.get(i, i) - 1.0).abs() <= tolerance
                && (i + 1..self.order)
                    .all(|j| (self.get(j, i) * self.get(i, j) - 1.0).abs() <= tolerance)
        })
    }
}

impl From<Vec<Vec<f64>>> for PairwiseMatrix {
    /// Build from rows; the order is taken from the row count and short rows
    /// are padded with NaN.
    fn from(rows: Vec<Vec<f64>>) -> Self {
        let order = rows.len();
        let mut values = Vec::with_capacity(order * order);
        for mut row in rows {
            row.resize(order, f64::NAN);
            values.extend(row);
        }
        Self { order, values }
    }
}

impl From<PairwiseMatrix> for Vec<Vec<f64>> {
    fn from(matrix: PairwiseMatrix) -> Self {
        matrix.rows().map(<[f64]>::to_vec).collect()
    }
}

/// Priority weights, index-aligned with the matrix criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityVector(pub Vec<f64>);

impl PriorityVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[cfg(test)]
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Criterion indices ordered by descending weight. Ties keep index order.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.0.len()).collect();
        order.sort_by(|&a, &b| {
            self.0[b]
                .partial_cmp(&self.0[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }
}

/// Consistency figures derived from a matrix and its priority vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyMetrics {
    /// Approximate principal eigenvalue.
    pub lambda_max: f64,
    /// Consistency index.
    pub ci: f64,
    /// Random index used for this order.
    pub ri: f64,
    /// Consistency ratio.
    pub cr: f64,
}

impl ConsistencyMetrics {
    /// CR strictly below the threshold. NaN never passes.
    pub fn is_acceptable(&self, threshold: f64) -> bool {
        self.cr < threshold
    }
}

/// One expert's sheet, carried through repair and consistency scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpertSubmission {
    /// Source sheet name.
    pub name: String,
    /// Grid after trimming and cropping, before repair.
    pub raw: RawGrid,
    /// Repaired reciprocal matrix.
    pub repaired: PairwiseMatrix,
    /// Individual priority vector.
    pub priorities: PriorityVector,
    /// Individual consistency figures.
    pub metrics: ConsistencyMetrics,
    /// Whether the matrix passed the consistency threshold.
    pub admitted: bool,
}

/// A sheet that was rejected before repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSheet {
    pub name: String,
    pub reason: String,
}

/// Group judgment built from the contributing expert matrices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResult {
    /// Element-wise geometric mean of the contributing matrices.
    pub matrix: PairwiseMatrix,
    /// Group priority vector.
    pub priorities: PriorityVector,
    /// Consistency of the aggregated matrix.
    pub metrics: ConsistencyMetrics,
    /// Names of the submissions that went into the aggregate.
    pub contributors: Vec<String>,
    /// Whether the aggregated CR is below the threshold.
    pub consistent: bool,
}

/// Result of the group-aggregation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// Aggregation ran.
    Aggregated(GroupResult),
    /// Every submission failed the consistency check.
    NoAdmitted,
}

impl GroupOutcome {
    pub fn result(&self) -> Option<&GroupResult> {
        match self {
            GroupOutcome::Aggregated(result) => Some(result),
            GroupOutcome::NoAdmitted => None,
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub policy: AggregationPolicy,
    pub threshold: f64,
    pub submissions: Vec<ExpertSubmission>,
    pub skipped: Vec<SkippedSheet>,
    pub group: GroupOutcome,
}

impl AnalysisOutcome {
    /// Number of submissions that passed the consistency check.
    pub fn admitted_count(&self) -> usize {
        self.submissions.iter().filter(|s| s.admitted).count()
    }
}

/// One row of the editable category × criterion table.
///
/// Weight keys also accept camelCase. Unknown keys are rejected so a
/// misspelled weight column fails to load instead of counting as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightEntry {
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "categoryWeight")]
    pub category_weight: Cell,
    #[serde(default)]
    pub criterion: String,
    #[serde(default, alias = "localWeight")]
    pub local_weight: Cell,
}

impl WeightEntry {
    pub fn new(
        category: impl Into<String>,
        category_weight: f64,
        criterion: impl Into<String>,
        local_weight: f64,
    ) -> Self {
        Self {
            category: category.into(),
            category_weight: Cell::Number(category_weight),
            criterion: criterion.into(),
            local_weight: Cell::Number(local_weight),
        }
    }
}

/// A ranked row with its global weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalWeightRow {
    pub category: String,
    pub category_weight: f64,
    pub criterion: String,
    pub local_weight: f64,
    pub global_weight: f64,
}

/// Metadata about a weights report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Input file or directory.
    pub input: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Aggregation policy in effect.
    pub policy: AggregationPolicy,
    /// CR acceptability threshold.
    pub threshold: f64,
    /// Random index table in effect.
    pub random_index: RandomIndexTable,
    /// Forced matrix order, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Number of sheets read from the input.
    pub sheets_read: usize,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete weights report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Criterion names, index-aligned with the matrices.
    pub labels: Vec<String>,
    pub outcome: AnalysisOutcome,
}

/// The global weight ranking report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub generated: DateTime<Utc>,
    pub rows: Vec<GlobalWeightRow>,
}

impl RankingReport {
    /// Sum of all global weights.
    pub fn total_weight(&self) -> f64 {
        self.rows.iter().map(|r| r.global_weight).sum()
    }
}

/// Verdict for a consistency ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn from_admitted(admitted: bool) -> Self {
        if admitted {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// Returns an emoji representation of the verdict.
    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::Pass => "🟢",
            Verdict::Fail => "🔴",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "Consistent"),
            Verdict::Fail => write!(f, "Inconsistent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coercion() {
        assert_eq!(Cell::Number(3.0).as_number(), Some(3.0));
        assert_eq!(Cell::from_text(" 5 ").as_number(), Some(5.0));
        assert_eq!(Cell::from_text("1/4").as_number(), Some(0.25));
        assert_eq!(Cell::from_text("=1/B1").as_number(), None);
        assert_eq!(Cell::from_text("   "), Cell::Empty);
        assert!(Cell::Empty.coerce().is_nan());
        assert!(Cell::from_text("Criterion").coerce().is_nan());
    }

    #[test]
    fn test_weight_coercion() {
        assert_eq!(Cell::from_text("0.5").coerce_weight(), 0.5);
        assert_eq!(Cell::from_text("n/a").coerce_weight(), 0.0);
        assert_eq!(Cell::Empty.coerce_weight(), 0.0);
        assert_eq!(Cell::Number(f64::NAN).coerce_weight(), 0.0);
    }

    #[test]
    fn test_cell_deserialize_mixed() {
        let cells: Vec<Cell> = serde_json::from_str(r#"[1, 2.5, "1/3", null, ""]"#).unwrap();
        assert_eq!(cells[0], Cell::Number(1.0));
        assert_eq!(cells[1], Cell::Number(2.5));
        assert_eq!(cells[2], Cell::Text("1/3".to_string()));
        assert_eq!(cells[3], Cell::Empty);
        assert_eq!(cells[4], Cell::Text(String::new()));
    }

    #[test]
    fn test_raw_grid_padding_and_crop() {
        let grid = RawGrid::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0]]);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert!(grid.get(1, 2).is_nan());
        assert!(!grid.is_square());

        let cropped = grid.crop(2);
        assert_eq!(cropped.to_rows()[0], vec![1.0, 2.0]);
        assert!(cropped.is_square());
    }

    #[test]
    fn test_raw_grid_trim_blank() {
        let nan = f64::NAN;
        let grid = RawGrid::from_rows(vec![
            vec![nan, nan, nan, nan],
            vec![nan, 1.0, 3.0, nan],
            vec![nan, nan, 1.0, nan],
            vec![nan, nan, nan, nan],
        ]);

        let trimmed = grid.trim_blank();
        assert_eq!(trimmed.rows(), 2);
        assert_eq!(trimmed.cols(), 2);
        assert_eq!(trimmed.get(0, 1), 3.0);
        assert!(trimmed.get(1, 0).is_nan());
    }

    #[test]
    fn test_pairwise_matrix_serializes_as_rows() {
        let matrix = PairwiseMatrix::from(vec![vec![1.0, 2.0], vec![0.5, 1.0]]);
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[1.0,2.0],[0.5,1.0]]");
        assert!(matrix.is_reciprocal(1e-12));
    }

    #[test]
    fn test_pairwise_matrix_from_ragged_rows() {
        let matrix = PairwiseMatrix::from(vec![vec![1.0, 2.0, 99.0], vec![0.5]]);
        assert_eq!(matrix.order(), 2);
        assert_eq!(matrix.get(0, 1), 2.0);
        assert_eq!(matrix.get(1, 0), 0.5);
        assert!(matrix.get(1, 1).is_nan());

        let matrix: PairwiseMatrix =
            serde_json::from_str("[[1.0, 4.0, 7.0], [0.25, 1.0]]").unwrap();
        assert_eq!(matrix.order(), 2);
        assert_eq!(matrix.get(1, 0), 0.25);
    }

    #[test]
    fn test_priority_ranking() {
        let priorities = PriorityVector(vec![0.2, 0.5, 0.3]);
        assert_eq!(priorities.ranking(), vec![1, 2, 0]);
        assert!((priorities.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_threshold_is_strict() {
        let metrics = ConsistencyMetrics {
            lambda_max: 3.0,
            ci: 0.0,
            ri: 0.58,
            cr: 0.10,
        };
        assert!(!metrics.is_acceptable(0.10));
        assert!(metrics.is_acceptable(0.11));

        let degenerate = ConsistencyMetrics {
            cr: f64::NAN,
            ..metrics
        };
        assert!(!degenerate.is_acceptable(0.10));
    }
}
