//! Global weights for a two-level hierarchy.
//!
//! The weight table is owned by the caller's session and edited in place;
//! `combine` only reads it.

use crate::error::AhpError;
use crate::models::{Cell, GlobalWeightRow, WeightEntry};
use serde::{Deserialize, Serialize};

/// Editable category × criterion table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalWeightTable {
    #[serde(default)]
    rows: Vec<WeightEntry>,
}

impl GlobalWeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starter table with a single example row.
    pub fn seeded() -> Self {
        Self {
            rows: vec![WeightEntry::new("Category A", 0.5, "Criterion A1", 0.6)],
        }
    }

    pub fn rows(&self) -> &[WeightEntry] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, entry: WeightEntry) {
        self.rows.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = WeightEntry>) {
        self.rows.extend(entries);
    }

    /// Remove the row at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<WeightEntry> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }
}

/// Parse one `category,categoryWeight,criterion,localWeight` record.
///
/// `line` is the 1-based source line used in error messages.
pub fn parse_entry(fields: &[String], line: usize) -> Result<WeightEntry, AhpError> {
    if fields.len() != 4 {
        return Err(AhpError::invalid_row(
            line,
            format!("expected 4 fields, got {}", fields.len()),
        ));
    }

    Ok(WeightEntry {
        category: fields[0].trim().to_string(),
        category_weight: Cell::from_text(&fields[1]),
        criterion: fields[2].trim().to_string(),
        local_weight: Cell::from_text(&fields[3]),
    })
}

/// Compute global weights and rank them, highest first.
///
/// Non-numeric or missing weights count as 0. Ties keep table order.
pub fn combine(table: &GlobalWeightTable) -> Vec<GlobalWeightRow> {
    let mut ranked: Vec<GlobalWeightRow> = table
        .rows()
        .iter()
        .map(|entry| {
            let category_weight = entry.category_weight.coerce_weight();
            let local_weight = entry.local_weight.coerce_weight();
            GlobalWeightRow {
                category: entry.category.clone(),
                category_weight,
                criterion: entry.criterion.clone(),
                local_weight,
                global_weight: category_weight * local_weight,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.global_weight
            .partial_cmp(&a.global_weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> Vec<String> {
        line.split(',').map(String::from).collect()
    }

    #[test]
    fn test_combine_and_rank() {
        let mut table = GlobalWeightTable::new();
        table.push(WeightEntry::new("A", 0.5, "A2", 0.4));
        table.push(WeightEntry::new("A", 0.5, "A1", 0.6));

        let ranked = combine(&table);

        assert_eq!(ranked[0].criterion, "A1");
        assert!((ranked[0].global_weight - 0.30).abs() < 1e-12);
        assert_eq!(ranked[1].criterion, "A2");
        assert!((ranked[1].global_weight - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_non_numeric_weights_count_as_zero() {
        let mut table = GlobalWeightTable::new();
        table.push(parse_entry(&fields("B,abc,B1,0.9"), 1).unwrap());
        table.push(parse_entry(&fields("C,0.2,C1,"), 2).unwrap());
        table.push(WeightEntry::new("D", 0.1, "D1", 0.5));

        let ranked = combine(&table);

        assert_eq!(ranked[0].criterion, "D1");
        assert_eq!(ranked[1].category_weight, 0.0);
        assert_eq!(ranked[1].global_weight, 0.0);
        assert_eq!(ranked[2].local_weight, 0.0);
    }

    #[test]
    fn test_ties_keep_table_order() {
        let mut table = GlobalWeightTable::new();
        table.extend([
            WeightEntry::new("A", 0.5, "first", 0.2),
            WeightEntry::new("B", 0.2, "second", 0.5),
        ]);

        let ranked = combine(&table);
        assert_eq!(ranked[0].criterion, "first");
        assert_eq!(ranked[1].criterion, "second");
    }

    #[test]
    fn test_combine_does_not_modify_table() {
        let table = GlobalWeightTable::seeded();
        let before = table.clone();
        let ranked = combine(&table);

        assert_eq!(table, before);
        assert!((ranked[0].global_weight - 0.30).abs() < 1e-12);
    }

    #[test]
    fn test_remove_row() {
        let mut table = GlobalWeightTable::seeded();
        assert!(table.remove(5).is_none());
        assert!(table.remove(0).is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_entry_field_count() {
        let err = parse_entry(&fields("A,0.5,A1"), 7).unwrap_err();
        assert_eq!(err, AhpError::invalid_row(7, "expected 4 fields, got 3"));
    }

    #[test]
    fn test_table_deserializes_from_toml() {
        let table: GlobalWeightTable = toml::from_str(
            r#"
[[rows]]
category = "A"
category_weight = 0.5
criterion = "A1"
local_weight = "0.6"
"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert!((combine(&table)[0].global_weight - 0.3).abs() < 1e-12);
    }
}
