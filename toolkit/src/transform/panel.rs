//! Balanced panel construction.
//!
//! # Architecture
//!
//! ```text
//! Source rows                  →  Balanced panel (firms × years)
//! ┌──────────────────────┐       ┌──────────────────────────┐
//! │ firm 1, 1980, 100    │       │ firm 1, 1980, 100        │
//! │ firm 1, 1981, 110    │  →    │ firm 1, 1981, 110        │
//! │ firm 2, 1980, 50     │       │ firm 2, 1980, 50         │
//! └──────────────────────┘       │ firm 2, 1981, (missing)  │
//!                                └──────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use super::Processor;
use crate::error::{ProcessError, ProcessResult};
use crate::table::{Column, Table, Value, ValueKey};

impl Processor<'_> {
    /// Reindex `table` onto the full cross product of the two key columns.
    ///
    /// Distinct key values keep their first-appearance order and rows are
    /// emitted firm-major. Output columns are the two keys followed by the
    /// remaining columns in source order. Combinations missing from the source
    /// get a missing value in every non-key column.
    pub fn create_panel_structure(
        &self,
        table: &Table,
        firm_column: &str,
        time_column: &str,
    ) -> ProcessResult<Table> {
        let firm = table
            .column(firm_column)
            .ok_or_else(|| ProcessError::MissingColumn(firm_column.to_string()))?;
        let time = table
            .column(time_column)
            .ok_or_else(|| ProcessError::MissingColumn(time_column.to_string()))?;

        let firms = distinct(firm);
        let periods = distinct(time);

        // Source row for every observed (firm, period) pair
        let mut index: HashMap<(ValueKey, ValueKey), usize> = HashMap::new();
        let mut repeated = 0;
        for row in 0..table.row_count() {
            let key = (key_at(firm, row), key_at(time, row));
            if index.insert(key, row).is_some() {
                repeated += 1;
            }
        }
        if repeated > 0 {
            return Err(ProcessError::DuplicateKeys {
                first: firm_column.to_string(),
                second: time_column.to_string(),
                count: repeated,
            });
        }

        let mut firm_values = Vec::with_capacity(firms.len() * periods.len());
        let mut time_values = Vec::with_capacity(firms.len() * periods.len());
        let mut source_rows: Vec<Option<usize>> = Vec::with_capacity(firms.len() * periods.len());

        for f in &firms {
            for t in &periods {
                firm_values.push(f.clone());
                time_values.push(t.clone());
                source_rows.push(index.get(&(f.key(), t.key())).copied());
            }
        }

        let mut columns = vec![
            Column::new(firm_column, firm_values),
            Column::new(time_column, time_values),
        ];
        for column in table.columns() {
            if column.name() == firm_column || column.name() == time_column {
                continue;
            }
            let values = source_rows
                .iter()
                .map(|row| {
                    row.and_then(|r| column.get(r).cloned())
                        .unwrap_or(Value::Missing)
                })
                .collect();
            columns.push(Column::new(column.name(), values));
        }

        self.reporter.info(&format!(
            "Created panel with {} firms and {} time periods",
            firms.len(),
            periods.len()
        ));

        Ok(Table::new(columns)?)
    }
}

fn key_at(column: &Column, row: usize) -> ValueKey {
    column.get(row).map(Value::key).unwrap_or(ValueKey::Missing)
}

/// Distinct values of a column in first-appearance order.
fn distinct(column: &Column) -> Vec<Value> {
    let mut seen = HashSet::new();
    column
        .values()
        .iter()
        .filter(|v| seen.insert(v.key()))
        .cloned()
        .collect()
}
