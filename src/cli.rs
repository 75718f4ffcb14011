//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::ahp::{AggregationPolicy, RandomIndexTable};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AHPKit - Analytic Hierarchy Process toolkit
///
/// Derive priority weights from expert pairwise comparisons, check their
/// consistency, and combine several experts into one group judgment.
///
/// Examples:
///   ahpkit weights ./panel
///   ahpkit weights panel.json --size 4 --format json --output result.json
///   ahpkit weights ./panel --policy aggregate-then-check --strict
///   ahpkit rank weights.csv --row "Cost,0.4,Price,0.7"
///   ahpkit template --criteria 5 --experts 3 --output-dir ./panel
///   ahpkit init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ahpkit.toml in the current directory.
    /// Can also be set via the AHPKIT_CONFIG env var.
    #[arg(short, long, value_name = "FILE", global = true, env = "AHPKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Compute individual and group priority weights from expert sheets
    Weights(WeightsArgs),
    /// Combine category and criterion weights into a ranked global table
    Rank(RankArgs),
    /// Write blank comparison sheets for experts to fill in
    Template(TemplateArgs),
    /// Generate a default .ahpkit.toml configuration file
    InitConfig,
}

/// Arguments for `weights`.
#[derive(clap::Args, Debug, Clone)]
pub struct WeightsArgs {
    /// Sheet file or directory of sheets (.csv, .tsv, .json, .toml)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Force the matrix order, cropping larger grids to the top-left N×N block
    #[arg(short = 'n', long, value_name = "N")]
    pub size: Option<usize>,

    /// Which expert matrices feed the group aggregate
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<AggregationPolicy>,

    /// Consistency ratio threshold; matrices need CR strictly below it
    #[arg(long, value_name = "CR")]
    pub threshold: Option<f64>,

    /// Random index table
    #[arg(long, value_name = "TABLE")]
    pub random_index: Option<RandomIndexTable>,

    /// Criterion names (comma-separated), in matrix order
    ///
    /// Example: --labels Cost,Quality,Speed
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path for the report (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exit with code 2 when the group CR is not below the threshold
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `rank`.
#[derive(clap::Args, Debug, Clone)]
pub struct RankArgs {
    /// Weight table (.csv, .tsv, .json, .toml)
    #[arg(value_name = "TABLE")]
    pub table: Option<PathBuf>,

    /// Extra row: "category,category_weight,criterion,local_weight"
    #[arg(long = "row", value_name = "ROW")]
    pub rows: Vec<String>,

    /// Remove a row (1-based, after --row additions) before ranking
    #[arg(long = "remove", value_name = "INDEX")]
    pub remove: Vec<usize>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path for the ranking (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for `template`.
#[derive(clap::Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Number of criteria (matrix order)
    #[arg(long, value_name = "N")]
    pub criteria: usize,

    /// Number of expert sheets to write
    #[arg(long, default_value = "1", value_name = "COUNT")]
    pub experts: usize,

    /// Directory to write the sheets into
    #[arg(long, default_value = "ahp-templates", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Criterion names (comma-separated) for a header row and column
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub labels: Option<Vec<String>>,
}

/// Output format for the report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    clap::ValueEnum,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Weights(args) => args.validate(),
            Command::Rank(args) => args.validate(),
            Command::Template(args) => args.validate(),
            Command::InitConfig => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

impl WeightsArgs {
    fn validate(&self) -> Result<(), String> {
        if !self.input.exists() {
            return Err(format!("Input does not exist: {}", self.input.display()));
        }

        if let Some(size) = self.size {
            if size < 2 {
                return Err("Matrix size must be at least 2".to_string());
            }
        }

        if let Some(threshold) = self.threshold {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err("Threshold must be in (0.0, 1.0]".to_string());
            }
        }

        if let Some(ref labels) = self.labels {
            if labels.iter().any(|l| l.trim().is_empty()) {
                return Err("Labels must not be empty".to_string());
            }
        }

        Ok(())
    }
}

impl RankArgs {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref table) = self.table {
            if !table.is_file() {
                return Err(format!("Weight table not found: {}", table.display()));
            }
        }

        if self.remove.contains(&0) {
            return Err("Row indices for --remove start at 1".to_string());
        }

        Ok(())
    }
}

impl TemplateArgs {
    fn validate(&self) -> Result<(), String> {
        if self.criteria < 2 {
            return Err("Templates need at least 2 criteria".to_string());
        }

        if self.experts == 0 {
            return Err("Experts must be at least 1".to_string());
        }

        if let Some(ref labels) = self.labels {
            if labels.len() != self.criteria {
                return Err(format!(
                    "Expected {} labels, got {}",
                    self.criteria,
                    labels.len()
                ));
            }
        }

        Ok(())
    }
}
