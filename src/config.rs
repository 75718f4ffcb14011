//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ahpkit.toml` files.

use crate::ahp::{AggregationPolicy, RandomIndexTable, DEFAULT_CR_THRESHOLD};
use crate::cli::{OutputFormat, RankArgs, WeightsArgs};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".ahpkit.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// AHP computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// A matrix is admitted when its CR is strictly below this value.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Which matrices feed the group aggregate.
    #[serde(default)]
    pub policy: AggregationPolicy,

    /// Random index table.
    #[serde(default)]
    pub random_index: RandomIndexTable,

    /// Force the matrix order (crop larger grids).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            policy: AggregationPolicy::default(),
            random_index: RandomIndexTable::default(),
            size: None,
        }
    }
}

impl AnalysisConfig {
    /// Range checks on the merged settings, which may come from the file.
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            bail!(
                "analysis.threshold must be in (0.0, 1.0], got {}",
                self.threshold
            );
        }

        if let Some(size) = self.size {
            if size < 2 {
                bail!("analysis.size must be at least 2, got {}", size);
            }
        }

        Ok(())
    }
}

fn default_threshold() -> f64 {
    DEFAULT_CR_THRESHOLD
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Decimal places for ratios and matrix cells.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Include repaired and aggregated matrices in the report.
    #[serde(default = "default_true")]
    pub show_matrices: bool,

    /// Criterion names, in matrix order.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            precision: default_precision(),
            show_matrices: true,
            labels: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_precision() -> usize {
    4
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with `weights` arguments.
    ///
    /// CLI arguments take precedence over config file settings and only
    /// override when explicitly provided.
    pub fn merge_with_weights(&mut self, args: &WeightsArgs) {
        if let Some(threshold) = args.threshold {
            self.analysis.threshold = threshold;
        }
        if let Some(policy) = args.policy {
            self.analysis.policy = policy;
        }
        if let Some(table) = args.random_index {
            self.analysis.random_index = table;
        }
        if args.size.is_some() {
            self.analysis.size = args.size;
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref labels) = args.labels {
            self.report.labels = labels.iter().map(|l| l.trim().to_string()).collect();
        }
    }

    /// Merge this configuration with `rank` arguments.
    pub fn merge_with_rank(&mut self, args: &RankArgs) {
        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
