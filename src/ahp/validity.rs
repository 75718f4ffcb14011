//! Per-expert consistency filtering and the group pipeline.
//!
//! Each sheet is shape-checked, repaired and scored on its own. Admitted
//! matrices (CR strictly below the threshold) are then aggregated and the
//! group matrix is scored again.

use super::aggregator::geometric_mean;
use super::sanitizer::repair_matrix;
use super::shape;
use super::solver::WeightSolver;
use crate::error::AhpError;
use crate::models::{
    AnalysisOutcome, ExpertSubmission, GroupOutcome, GroupResult, RawGrid, RawSheet, SkippedSheet,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Conventional AHP acceptability threshold for the consistency ratio.
pub const DEFAULT_CR_THRESHOLD: f64 = 0.10;

/// Which matrices feed the group aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationPolicy {
    /// Aggregate only the experts whose own CR passes (default)
    #[default]
    FilterThenAggregate,
    /// Aggregate every valid matrix and check CR on the result only
    AggregateThenCheck,
}

impl fmt::Display for AggregationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationPolicy::FilterThenAggregate => write!(f, "filter-then-aggregate"),
            AggregationPolicy::AggregateThenCheck => write!(f, "aggregate-then-check"),
        }
    }
}

/// Scores individual expert matrices and decides admission.
#[derive(Debug, Clone, Copy)]
pub struct ValidityFilter {
    solver: WeightSolver,
    threshold: f64,
}

impl ValidityFilter {
    pub fn new(solver: WeightSolver, threshold: f64) -> Self {
        Self { solver, threshold }
    }

    /// Repair and score one square grid.
    pub fn evaluate(&self, name: &str, raw: RawGrid) -> ExpertSubmission {
        let repaired = repair_matrix(&raw);
        let solution = self.solver.solve(&repaired);
        let admitted = solution.metrics.is_acceptable(self.threshold);

        debug!(
            "Sheet {}: order {}, CR {:.4}, admitted: {}",
            name,
            repaired.order(),
            solution.metrics.cr,
            admitted
        );

        ExpertSubmission {
            name: name.to_string(),
            raw,
            repaired,
            priorities: solution.priorities,
            metrics: solution.metrics,
            admitted,
        }
    }
}

/// Runs the full multi-expert pipeline.
#[derive(Debug, Clone, Copy)]
pub struct GroupAnalyzer {
    filter: ValidityFilter,
    policy: AggregationPolicy,
    size: Option<usize>,
}

impl GroupAnalyzer {
    pub fn new(filter: ValidityFilter, policy: AggregationPolicy, size: Option<usize>) -> Self {
        Self {
            filter,
            policy,
            size,
        }
    }

    /// Analyze every sheet and build the group result.
    ///
    /// # Errors
    /// - `NoValidMatrices` when no sheet survives the shape checks
    /// - `OrderMismatch` when the contributing matrices differ in order
    ///
    /// When no submission is admitted the run still succeeds, with
    /// `GroupOutcome::NoAdmitted` and the individual results filled in.
    pub fn analyze(&self, sheets: Vec<RawSheet>) -> Result<AnalysisOutcome, AhpError> {
        let mut submissions = Vec::new();
        let mut skipped = Vec::new();

        for sheet in sheets {
            match shape::normalize(sheet.grid, self.size) {
                Ok(grid) => submissions.push(self.filter.evaluate(&sheet.name, grid)),
                Err(e) => {
                    warn!("Sheet {} is malformed ({}), skipping", sheet.name, e);
                    skipped.push(SkippedSheet {
                        name: sheet.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if submissions.is_empty() {
            return Err(AhpError::NoValidMatrices);
        }

        let contributors: Vec<(&str, &_)> = submissions
            .iter()
            .filter(|s| match self.policy {
                AggregationPolicy::FilterThenAggregate => s.admitted,
                AggregationPolicy::AggregateThenCheck => true,
            })
            .map(|s| (s.name.as_str(), &s.repaired))
            .collect();

        info!(
            "{} of {} matrices contribute to the group result ({})",
            contributors.len(),
            submissions.len(),
            self.policy
        );

        let group = if contributors.is_empty() {
            warn!(
                "No matrix passed the consistency check (CR < {})",
                self.filter.threshold
            );
            GroupOutcome::NoAdmitted
        } else {
            let matrix = geometric_mean(&contributors)?;
            debug!(
                "Group matrix of order {} is reciprocal: {}",
                matrix.order(),
                matrix.is_reciprocal(1e-9)
            );
            let solution = self.filter.solver.solve(&matrix);
            GroupOutcome::Aggregated(GroupResult {
                consistent: solution.metrics.is_acceptable(self.filter.threshold),
                contributors: contributors.iter().map(|(n, _)| n.to_string()).collect(),
                matrix,
                priorities: solution.priorities,
                metrics: solution.metrics,
            })
        };

        Ok(AnalysisOutcome {
            policy: self.policy,
            threshold: self.filter.threshold,
            submissions,
            skipped,
            group,
        })
    }
}
