//! `template`: write blank comparison sheets.

use super::Console;
use crate::cli::TemplateArgs;
use crate::workbook::{write_templates, TemplateSpec};
use anyhow::Result;
use tracing::info;

pub fn run(args: &TemplateArgs, console: Console) -> Result<i32> {
    let spec = TemplateSpec {
        criteria: args.criteria,
        experts: args.experts,
        labels: args.labels.clone(),
    };

    info!(
        "Writing {} template(s) for {} criteria",
        spec.experts, spec.criteria
    );
    let written = write_templates(&spec, &args.output_dir)?;

    console.line(format!(
        "📝 Wrote {} template sheet(s) to {}:",
        written.len(),
        args.output_dir.display()
    ));
    for path in &written {
        console.line(format!("     📄 {}", path.display()));
    }
    console.line("   Fill in the blank upper-triangle cells (1-9 or fractions like 1/3).");

    Ok(0)
}
