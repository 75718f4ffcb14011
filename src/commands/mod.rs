//! Command handlers, one per subcommand.

pub mod rank;
pub mod template;
pub mod weights;

use crate::config::{Config, CONFIG_FILE};
use anyhow::{bail, Context, Result};
use std::fmt::Display;
use std::path::Path;

/// User-facing progress lines on stderr, silenced by `--quiet`.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    quiet: bool,
}

impl Console {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn line(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }
}

/// Write rendered output to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}

/// Handle `init-config`: generate a default .ahpkit.toml.
pub fn init_config(console: Console) -> Result<i32> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        bail!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    console.line(format!("✅ Created {} with default settings.", CONFIG_FILE));
    console.line("   Edit it to customize the threshold, policy, random index table and report.");
    Ok(0)
}
