//! Workbook discovery and parsing.
//!
//! A workbook is either a single file or a directory of files. CSV and TSV
//! files hold one expert grid each; JSON and TOML files hold any number of
//! named sheets.

use crate::ahp::global::{parse_entry, GlobalWeightTable};
use crate::models::{Cell, RawGrid, RawSheet};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Supported sheet file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Tsv,
    Json,
    Toml,
}

impl SheetFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(SheetFormat::Csv),
            "tsv" | "tab" => Some(SheetFormat::Tsv),
            "json" => Some(SheetFormat::Json),
            "toml" => Some(SheetFormat::Toml),
            _ => None,
        }
    }
}

/// Serialized workbook with named sheets (JSON/TOML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkbookFile {
    #[serde(default)]
    pub sheets: Vec<SheetFile>,
}

/// One serialized sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetFile {
    pub name: String,
    #[serde(default)]
    pub cells: Vec<Vec<Cell>>,
}

/// Loads expert sheets from a file or a directory.
pub struct WorkbookLoader {
    root: PathBuf,
}

impl WorkbookLoader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Load every sheet, in file-name order.
    pub fn load(&self) -> Result<Vec<RawSheet>> {
        let files = self.discover()?;
        let mut sheets = Vec::new();

        for file in &files {
            let loaded = load_sheets(file)?;
            debug!("{}: {} sheet(s)", file.display(), loaded.len());
            sheets.extend(loaded);
        }

        info!(
            "Loaded {} sheet(s) from {} file(s)",
            sheets.len(),
            files.len()
        );
        Ok(sheets)
    }

    /// List the sheet files under the root.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            bail!("Input not found: {}", self.root.display());
        }

        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to read directory: {}", self.root.display()))?;
            let path = entry.path();

            if is_hidden(path) || !entry.file_type().is_file() {
                continue;
            }

            if SheetFormat::from_path(path).is_some() {
                files.push(path.to_path_buf());
            } else {
                debug!("Ignoring {}", path.display());
            }
        }

        if files.is_empty() {
            bail!(
                "No .csv, .tsv, .json or .toml sheets found in {}",
                self.root.display()
            );
        }

        Ok(files)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Load the sheets held in one file.
pub fn load_sheets(path: &Path) -> Result<Vec<RawSheet>> {
    let format = SheetFormat::from_path(path)
        .with_context(|| format!("Unsupported sheet format: {}", path.display()))?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sheet file: {}", path.display()))?;

    let sheets = match format {
        SheetFormat::Csv | SheetFormat::Tsv => {
            let delimiter = if format == SheetFormat::Csv { ',' } else { '\t' };
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            vec![RawSheet::new(name, cells_to_grid(&parse_delimited(&content, delimiter)))]
        }
        SheetFormat::Json => {
            let workbook: WorkbookFile = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse workbook: {}", path.display()))?;
            workbook.into_sheets()
        }
        SheetFormat::Toml => {
            let workbook: WorkbookFile = toml::from_str(&content)
                .with_context(|| format!("Failed to parse workbook: {}", path.display()))?;
            workbook.into_sheets()
        }
    };

    Ok(sheets)
}

impl WorkbookFile {
    fn into_sheets(self) -> Vec<RawSheet> {
        self.sheets
            .into_iter()
            .map(|sheet| RawSheet::new(sheet.name, cells_to_grid(&sheet.cells)))
            .collect()
    }
}

/// Coerce cells to numbers and trim blank rows and columns.
pub fn cells_to_grid(cells: &[Vec<Cell>]) -> RawGrid {
    let rows = cells
        .iter()
        .map(|row| row.iter().map(Cell::coerce).collect())
        .collect();
    RawGrid::from_rows(rows).trim_blank()
}

/// Split delimited text into cells. Double-quoted fields may contain the
/// delimiter; `""` inside quotes is a literal quote.
pub fn parse_delimited(content: &str, delimiter: char) -> Vec<Vec<Cell>> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .map(|line| {
            split_record(line, delimiter)
                .iter()
                .map(|field| Cell::from_text(field))
                .collect()
        })
        .collect()
}

/// Split one delimited record into raw fields.
pub fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);

    fields
}

/// Load a global weight table from CSV, TSV, JSON or TOML.
///
/// Delimited files hold `category,category_weight,criterion,local_weight`
/// records with an optional header on the first non-blank line. Blank lines
/// are skipped. JSON and TOML tables hold `rows = [...]`; weight keys may be
/// snake_case or camelCase, and unknown keys are rejected.
pub fn load_weight_table(path: &Path) -> Result<GlobalWeightTable> {
    let format = SheetFormat::from_path(path)
        .with_context(|| format!("Unsupported table format: {}", path.display()))?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read weight table: {}", path.display()))?;

    let table = match format {
        SheetFormat::Csv | SheetFormat::Tsv => {
            let delimiter = if format == SheetFormat::Csv { ',' } else { '\t' };
            let mut entries = Vec::new();
            let mut seen_record = false;

            for (idx, line) in content.trim_start_matches('\u{feff}').lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let fields = split_record(line, delimiter);
                let first_record = !seen_record;
                seen_record = true;
                if first_record && is_header(&fields) {
                    continue;
                }
                let entry = parse_entry(&fields, idx + 1)
                    .with_context(|| format!("In weight table {}", path.display()))?;
                entries.push(entry);
            }

            let mut table = GlobalWeightTable::new();
            table.extend(entries);
            table
        }
        SheetFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse weight table: {}", path.display()))?,
        SheetFormat::Toml => toml::from_str(&content)
            .with_context(|| format!("Failed to parse weight table: {}", path.display()))?,
    };

    Ok(table)
}

fn is_header(fields: &[String]) -> bool {
    fields
        .first()
        .map(|f| f.trim().eq_ignore_ascii_case("category"))
        .unwrap_or(false)
}
