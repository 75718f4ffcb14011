//! Markdown and JSON report generation.
//!
//! This module renders weights reports and global ranking tables.

use crate::models::{
    ExpertSubmission, GroupOutcome, GroupResult, PairwiseMatrix, RankingReport, Report,
    ReportMetadata, SkippedSheet, Verdict,
};
use anyhow::Result;

/// Rendering options for Markdown output.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Decimal places for ratios and matrix cells.
    pub precision: usize,
    /// Include repaired and aggregated matrices.
    pub show_matrices: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            precision: 4,
            show_matrices: true,
        }
    }
}

/// Format a weight as a percentage with two decimals.
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "NaN".to_string()
    }
}

fn format_number(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.*}", precision, value)
    }
}

/// Criterion label for `index`, falling back to `C1`, `C2`, ...
pub fn label_for(labels: &[String], index: usize) -> String {
    labels
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("C{}", index + 1))
}

/// Generate a complete Markdown weights report.
pub fn generate_markdown_report(report: &Report, options: RenderOptions) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# AHP Weights Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Skipped sheets
    output.push_str(&generate_skipped_section(&report.outcome.skipped));

    // Individual experts
    output.push_str(&generate_experts_section(
        &report.outcome.submissions,
        &report.labels,
        options,
    ));

    // Group result
    output.push_str(&generate_group_section(
        &report.outcome.group,
        report.outcome.threshold,
        &report.labels,
        options,
    ));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Aggregation Policy:** {}\n", metadata.policy));
    section.push_str(&format!("- **CR Threshold:** < {}\n", metadata.threshold));
    section.push_str(&format!(
        "- **Random Index Table:** {}\n",
        metadata.random_index
    ));
    if let Some(size) = metadata.size {
        section.push_str(&format!("- **Forced Matrix Order:** {}\n", size));
    }
    section.push_str(&format!("- **Sheets Read:** {}\n", metadata.sheets_read));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the skipped-sheets section.
fn generate_skipped_section(skipped: &[SkippedSheet]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Skipped Sheets\n\n");
    for sheet in skipped {
        section.push_str(&format!("- ⚠️ `{}`: {}\n", sheet.name, sheet.reason));
    }
    section.push('\n');

    section
}

/// Generate the per-expert consistency table.
fn generate_experts_section(
    submissions: &[ExpertSubmission],
    labels: &[String],
    options: RenderOptions,
) -> String {
    let mut section = String::new();
    let p = options.precision;

    section.push_str("## Individual Consistency\n\n");
    section.push_str("| Expert | Order | λmax | CI | CR | Status |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---|\n");

    for submission in submissions {
        let verdict = Verdict::from_admitted(submission.admitted);
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} {} |\n",
            submission.name,
            submission.repaired.order(),
            format_number(submission.metrics.lambda_max, p),
            format_number(submission.metrics.ci, p),
            format_number(submission.metrics.cr, p),
            verdict.emoji(),
            verdict
        ));
    }
    section.push('\n');

    if options.show_matrices {
        for submission in submissions {
            section.push_str(&format!("### {}\n\n", submission.name));
            section.push_str(&generate_matrix_table(&submission.repaired, labels, p));
        }
    }

    section
}

/// Generate the group result section.
fn generate_group_section(
    group: &GroupOutcome,
    threshold: f64,
    labels: &[String],
    options: RenderOptions,
) -> String {
    match group {
        GroupOutcome::Aggregated(result) => {
            generate_group_result(result, threshold, labels, options)
        }
        GroupOutcome::NoAdmitted => {
            let mut section = String::new();
            section.push_str("## Group Result\n\n");
            section.push_str(&format!(
                "❌ No expert matrix passed the consistency check (CR < {}). \
                 No group weights were computed.\n\n",
                threshold
            ));
            section
        }
    }
}

fn generate_group_result(
    result: &GroupResult,
    threshold: f64,
    labels: &[String],
    options: RenderOptions,
) -> String {
    let mut section = String::new();
    let p = options.precision;
    let verdict = Verdict::from_admitted(result.consistent);

    section.push_str("## Group Result\n\n");
    section.push_str(&format!(
        "- **Contributors:** {}\n",
        result.contributors.join(", ")
    ));
    section.push_str(&format!(
        "- **λmax:** {}\n",
        format_number(result.metrics.lambda_max, p)
    ));
    section.push_str(&format!("- **CI:** {}\n", format_number(result.metrics.ci, p)));
    section.push_str(&format!(
        "- **CR:** {} {} {} (threshold < {})\n\n",
        format_number(result.metrics.cr, p),
        verdict.emoji(),
        verdict,
        threshold
    ));

    section.push_str("### Priority Weights\n\n");
    section.push_str("| Rank | Criterion | Weight |\n");
    section.push_str("|:---:|:---|---:|\n");

    let weights = result.priorities.as_slice();
    for (rank, index) in result.priorities.ranking().into_iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            rank + 1,
            label_for(labels, index),
            format_percent(weights[index])
        ));
    }
    section.push('\n');

    if options.show_matrices {
        section.push_str("### Aggregated Matrix (geometric mean)\n\n");
        section.push_str(&generate_matrix_table(&result.matrix, labels, p));
    }

    section
}

/// Render a matrix as a Markdown table.
fn generate_matrix_table(matrix: &PairwiseMatrix, labels: &[String], precision: usize) -> String {
    let mut table = String::new();
    let n = matrix.order();

    table.push_str("| |");
    for j in 0..n {
        table.push_str(&format!(" {} |", label_for(labels, j)));
    }
    table.push('\n');

    table.push_str("|:---|");
    table.push_str(&"---:|".repeat(n));
    table.push('\n');

    for (i, row) in matrix.rows().enumerate() {
        table.push_str(&format!("| **{}** |", label_for(labels, i)));
        for value in row {
            table.push_str(&format!(" {} |", format_number(*value, precision)));
        }
        table.push('\n');
    }
    table.push('\n');

    table
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by AHPKit v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON weights report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a Markdown global ranking table.
pub fn generate_markdown_ranking(ranking: &RankingReport) -> String {
    let mut output = String::new();

    output.push_str("# Global Weight Ranking\n\n");
    output.push_str(&format!(
        "*Generated {}*\n\n",
        ranking.generated.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if ranking.rows.is_empty() {
        output.push_str("The weight table is empty.\n\n");
        return output;
    }

    output.push_str("| Rank | Category | Category Weight | Criterion | Local Weight | Global Weight |\n");
    output.push_str("|:---:|:---|---:|:---|---:|---:|\n");

    for (rank, row) in ranking.rows.iter().enumerate() {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            rank + 1,
            row.category,
            format_percent(row.category_weight),
            row.criterion,
            format_percent(row.local_weight),
            format_percent(row.global_weight)
        ));
    }
    output.push('\n');

    output.push_str(&format!(
        "**Total global weight:** {}\n",
        format_percent(ranking.total_weight())
    ));

    output
}

/// Generate a JSON global ranking.
pub fn generate_json_ranking(ranking: &RankingReport) -> Result<String> {
    serde_json::to_string_pretty(ranking).map_err(Into::into)
}
