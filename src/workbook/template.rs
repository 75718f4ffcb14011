//! Blank comparison templates.
//!
//! Writes one CSV sheet per expert. The diagonal is pre-filled with 1, the
//! upper triangle is left blank for the expert's judgments, and every lower
//! triangle cell holds a spreadsheet formula pointing at its mirrored upper
//! cell, so a spreadsheet keeps the reciprocals in sync while editing.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shape of the templates to generate.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    /// Number of criteria (matrix order).
    pub criteria: usize,
    /// Number of expert sheets.
    pub experts: usize,
    /// Optional criterion labels for a header row and column.
    pub labels: Option<Vec<String>>,
}

/// Spreadsheet column letters for a zero-based column index (0 → A, 26 → AA).
pub fn column_letters(col: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1-style reference for zero-based (row, col).
pub fn cell_ref(row: usize, col: usize) -> String {
    format!("{}{}", column_letters(col), row + 1)
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render one template sheet as CSV.
pub fn render_sheet(criteria: usize, labels: Option<&[String]>) -> String {
    let offset = usize::from(labels.is_some());
    let mut lines = Vec::with_capacity(criteria + offset);

    if let Some(labels) = labels {
        let header: Vec<String> = std::iter::once(String::new())
            .chain(labels.iter().map(|l| quote(l)))
            .collect();
        lines.push(header.join(","));
    }

    for i in 0..criteria {
        let mut fields = Vec::with_capacity(criteria + offset);
        if let Some(labels) = labels {
            fields.push(quote(&labels[i]));
        }

        for j in 0..criteria {
            let field = if i == j {
                "1".to_string()
            } else if i < j {
                String::new()
            } else {
                format!("=1/{}", cell_ref(j + offset, i + offset))
            };
            fields.push(field);
        }

        lines.push(fields.join(","));
    }

    let mut sheet = lines.join("\n");
    sheet.push('\n');
    sheet
}

/// Write `experts` template sheets into `dir`. Returns the written paths.
pub fn write_templates(spec: &TemplateSpec, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let content = render_sheet(spec.criteria, spec.labels.as_deref());
    let mut written = Vec::with_capacity(spec.experts);

    for expert in 1..=spec.experts {
        let path = dir.join(format!("expert-{:02}.csv", expert));
        fs::write(&path, &content)
            .with_context(|| format!("Failed to write template: {}", path.display()))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}
