//! `rank`: global weights for a category × criterion table.

use super::{write_output, Console};
use crate::ahp::global::parse_entry;
use crate::ahp::{combine, GlobalWeightTable};
use crate::cli::{OutputFormat, RankArgs};
use crate::config::Config;
use crate::models::RankingReport;
use crate::report;
use crate::workbook::loader::split_record;
use crate::workbook::load_weight_table;
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Build the session table from the arguments.
///
/// Rows come from the table file, then `--row` additions; `--remove`
/// indices refer to the combined list. With no table and no rows, the
/// starter table is used.
pub fn build_table(args: &RankArgs) -> Result<GlobalWeightTable> {
    let mut table = match args.table {
        Some(ref path) => {
            info!("Loading weight table from: {}", path.display());
            load_weight_table(path)?
        }
        None => GlobalWeightTable::new(),
    };

    for (idx, row) in args.rows.iter().enumerate() {
        let entry = parse_entry(&split_record(row, ','), idx + 1)
            .with_context(|| format!("In --row \"{}\"", row))?;
        table.push(entry);
    }

    if args.table.is_none() && args.rows.is_empty() {
        debug!("No table given, starting from the starter row");
        table = GlobalWeightTable::seeded();
    }

    let mut removals = args.remove.clone();
    removals.sort_unstable();
    removals.dedup();
    for index in removals.into_iter().rev() {
        if table.remove(index - 1).is_none() {
            warn!("No row {} to remove (table has {} rows)", index, table.len());
        }
    }
    if table.is_empty() {
        warn!("Weight table is empty; the ranking will have no rows");
    }

    Ok(table)
}

pub fn run(args: &RankArgs, mut config: Config, console: Console) -> Result<i32> {
    config.merge_with_rank(args);

    let table = build_table(args)?;
    console.line(format!("🧮 Ranking {} criterion row(s)...", table.len()));

    let ranking = RankingReport {
        generated: Utc::now(),
        rows: combine(&table),
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_ranking(&ranking)?,
        OutputFormat::Markdown => report::generate_markdown_ranking(&ranking),
    };
    write_output(args.output.as_deref(), &output)?;

    if let Some(top) = ranking.rows.first() {
        console.line(format!(
            "   Top criterion: {} / {} ({:.2}%)",
            top.category,
            top.criterion,
            top.global_weight * 100.0
        ));
    }
    if let Some(ref path) = args.output {
        console.line(format!("\n✅ Ranking saved to: {}", path.display()));
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rank_args() -> RankArgs {
        RankArgs {
            table: None,
            rows: Vec::new(),
            remove: Vec::new(),
            format: None,
            output: None,
        }
    }

    #[test]
    fn test_seeded_table_when_nothing_given() {
        let table = build_table(&rank_args()).unwrap();
        assert_eq!(table, GlobalWeightTable::seeded());
    }

    #[test]
    fn test_rows_and_removals() {
        let mut args = rank_args();
        args.rows = vec![
            "A,0.5,A1,0.6".to_string(),
            "A,0.5,A2,0.4".to_string(),
            "B,0.5,B1,1.0".to_string(),
        ];
        args.remove = vec![3, 3, 9];

        let table = build_table(&args).unwrap();
        assert_eq!(table.len(), 2);

        let ranked = combine(&table);
        assert_eq!(ranked[0].criterion, "A1");
        assert!((ranked[0].global_weight - 0.30).abs() < 1e-12);
        assert!((ranked[1].global_weight - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_bad_row_is_an_error() {
        let mut args = rank_args();
        args.rows = vec!["A,0.5".to_string()];
        assert!(build_table(&args).is_err());
    }

    #[test]
    fn test_run_with_table_file() {
        let dir = TempDir::new().unwrap();
        let table_path = dir.path().join("weights.json");
        fs::write(
            &table_path,
            r#"{"rows": [
                {"category": "A", "category_weight": 0.5, "criterion": "A2", "local_weight": 0.4},
                {"category": "A", "category_weight": 0.5, "criterion": "A1", "local_weight": 0.6}
            ]}"#,
        )
        .unwrap();

        let out = dir.path().join("ranking.md");
        let mut args = rank_args();
        args.table = Some(table_path);
        args.output = Some(out.clone());

        let code = run(&args, Config::default(), Console::new(true)).unwrap();
        assert_eq!(code, 0);

        let markdown = fs::read_to_string(out).unwrap();
        let first = markdown.find("| A1 |").unwrap();
        let second = markdown.find("| A2 |").unwrap();
        assert!(first < second);
    }
}
