//! `weights`: individual and group priority weights.

use super::{write_output, Console};
use crate::ahp::{GroupAnalyzer, ValidityFilter, WeightSolver};
use crate::cli::{OutputFormat, WeightsArgs};
use crate::config::{Config, CONFIG_FILE};
use crate::error::AhpError;
use crate::models::{Report, ReportMetadata};
use crate::report::{self, RenderOptions};
use crate::workbook::WorkbookLoader;
use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Instant;
use tracing::{info, warn};

/// Run the weights pipeline. Returns exit code 0, or 2 under `--strict`
/// when the group matrix is inconsistent.
pub fn run(args: &WeightsArgs, mut config: Config, console: Console) -> Result<i32> {
    let start_time = Instant::now();
    config.merge_with_weights(args);
    config
        .analysis
        .validate()
        .with_context(|| format!("Invalid [analysis] settings (check {} and flags)", CONFIG_FILE))?;

    // Step 1: Read the sheets
    console.line(format!("📥 Loading expert sheets: {}", args.input.display()));
    let sheets = WorkbookLoader::new(args.input.clone()).load()?;
    let sheets_read = sheets.len();
    console.line(format!("   Found {} expert sheet(s)", sheets_read));

    // Step 2: Score each expert and aggregate
    let solver = WeightSolver::new(config.analysis.random_index);
    let filter = ValidityFilter::new(solver, config.analysis.threshold);
    let analyzer = GroupAnalyzer::new(filter, config.analysis.policy, config.analysis.size);

    console.line(format!(
        "🔬 Computing weights ({}, CR < {})...",
        config.analysis.policy, config.analysis.threshold
    ));
    let outcome = analyzer.analyze(sheets)?;

    for skipped in &outcome.skipped {
        console.line(format!(
            "⚠️  Sheet {} has an invalid format ({}), skipped.",
            skipped.name, skipped.reason
        ));
    }

    let labels = config.report.labels.clone();
    if let Some(first) = outcome.submissions.first() {
        let order = first.repaired.order();
        if !labels.is_empty() && labels.len() != order {
            warn!(
                "{} label(s) given for {} criteria; unnamed criteria use C1, C2, ...",
                labels.len(),
                order
            );
        }
    }

    // Step 3: Build and write the report
    let report = Report {
        metadata: ReportMetadata {
            input: args.input.display().to_string(),
            analysis_date: Utc::now(),
            policy: config.analysis.policy,
            threshold: config.analysis.threshold,
            random_index: config.analysis.random_index,
            size: config.analysis.size,
            sheets_read,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        labels,
        outcome,
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(
            &report,
            RenderOptions {
                precision: config.report.precision,
                show_matrices: config.report.show_matrices,
            },
        ),
    };
    write_output(args.output.as_deref(), &output)?;

    // Print summary
    let outcome = &report.outcome;
    console.line("\n📊 Consistency Summary:");
    console.line(format!(
        "   Experts scored: {} | admitted: {} | skipped: {}",
        outcome.submissions.len(),
        outcome.admitted_count(),
        outcome.skipped.len()
    ));

    let Some(result) = outcome.group.result() else {
        return Err(AhpError::NoAdmittedMatrices {
            threshold: outcome.threshold,
        }
        .into());
    };

    console.line(format!(
        "   Group CR: {:.4} ({})",
        result.metrics.cr,
        if result.consistent {
            "consistent"
        } else {
            "inconsistent"
        }
    ));
    if let Some(ref path) = args.output {
        console.line(format!("\n✅ Report saved to: {}", path.display()));
    }
    info!(
        "Group weights from {} contributor(s), CR {:.4}",
        result.contributors.len(),
        result.metrics.cr
    );

    if args.strict && !result.consistent {
        console.line(format!(
            "\n⛔ Group CR is not below {}. Failing (exit code 2).",
            outcome.threshold
        ));
        return Ok(2);
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(input: PathBuf, output: PathBuf) -> WeightsArgs {
        WeightsArgs {
            input,
            size: None,
            policy: None,
            threshold: None,
            random_index: None,
            labels: Some(vec!["Cost".into(), "Quality".into(), "Speed".into()]),
            format: Some(OutputFormat::Json),
            output: Some(output),
            strict: true,
        }
    }

    #[test]
    fn test_run_writes_report() {
        let dir = TempDir::new().unwrap();
        let panel = dir.path().join("panel");
        fs::create_dir(&panel).unwrap();
        fs::write(panel.join("alice.csv"), "1,3,0.2\n,1,1/7\n,,1\n").unwrap();
        fs::write(panel.join("bob.csv"), "1,3,0.2\n,1,1/7\n,,1\n").unwrap();
        fs::write(panel.join("carol.csv"), "1,2,3\n,1\n").unwrap();

        let out = dir.path().join("report.json");
        let code = run(&args(panel, out.clone()), Config::default(), Console::new(true)).unwrap();
        assert_eq!(code, 0);

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(json["outcome"]["submissions"].as_array().unwrap().len(), 2);
        assert_eq!(json["outcome"]["skipped"][0]["name"], "carol");
        assert_eq!(json["outcome"]["group"]["status"], "aggregated");
        assert_eq!(json["labels"][2], "Speed");
    }

    #[test]
    fn test_run_fails_when_nobody_is_consistent() {
        let dir = TempDir::new().unwrap();
        let sheet = dir.path().join("dave.csv");
        fs::write(&sheet, "1,9,1/9\n,1,9\n,,1\n").unwrap();

        let out = dir.path().join("report.json");
        let err = run(&args(sheet, out.clone()), Config::default(), Console::new(true)).unwrap_err();

        assert!(err.to_string().contains("no expert matrix passed"));
        // Individual results are still written.
        assert!(out.exists());
    }

    #[test]
    fn test_config_threshold_out_of_range() {
        let dir = TempDir::new().unwrap();
        let sheet = dir.path().join("alice.csv");
        fs::write(&sheet, "1,3,0.2\n,1,1/7\n,,1\n").unwrap();

        let mut config = Config::default();
        config.analysis.threshold = 0.0;

        let out = dir.path().join("report.json");
        let err = run(&args(sheet, out.clone()), config, Console::new(true)).unwrap_err();

        assert!(format!("{:#}", err).contains("analysis.threshold"));
        assert!(!out.exists());
    }

    #[test]
    fn test_strict_mode_exit_code() {
        let dir = TempDir::new().unwrap();
        let sheet = dir.path().join("dave.csv");
        fs::write(&sheet, "1,9,1/9\n,1,9\n,,1\n").unwrap();

        let mut weights_args = args(sheet, dir.path().join("report.md"));
        weights_args.policy = Some(crate::ahp::AggregationPolicy::AggregateThenCheck);
        weights_args.format = Some(OutputFormat::Markdown);

        let code = run(&weights_args, Config::default(), Console::new(true)).unwrap();
        assert_eq!(code, 2);
    }
}
