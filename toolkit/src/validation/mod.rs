//! Data-quality checks for firm-year tables.
//!
//! None of these checks fail: problems are reported through the injected
//! [`Reporter`] and summarised in the return value.
//!
//! # Example
//!
//! ```rust,ignore
//! use delicense::{MemoryReporter, Validator};
//!
//! let reporter = MemoryReporter::new();
//! let validator = Validator::new(&reporter);
//!
//! let missing = validator.check_missing_values(&table, 0.5);
//! let years_ok = validator.validate_year_range(&table, "year", 1976, 1990);
//! let duplicates = validator.check_duplicates(&table, &["firm_id", "year"]);
//! ```

use std::collections::HashMap;

use crate::report::Reporter;
use crate::table::{Column, Table, ValueKey};

/// Missing-value proportion of every column, in table column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MissingProportions(Vec<(String, f64)>);

impl MissingProportions {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, p)| (name.as_str(), *p))
    }

    /// Columns whose proportion is strictly above `threshold`.
    pub fn above(&self, threshold: f64) -> Vec<(&str, f64)> {
        self.iter().filter(|(_, p)| *p > threshold).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validates data integrity and quality of firm-year tables.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> Validator<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }

    /// Proportion of missing values per column.
    ///
    /// Warns once about every column above `threshold` but always returns
    /// all columns. A table without rows reports 0 for each column.
    pub fn check_missing_values(&self, table: &Table, threshold: f64) -> MissingProportions {
        let rows = table.row_count();
        let proportions = MissingProportions(
            table
                .columns()
                .iter()
                .map(|c| {
                    let p = if rows == 0 {
                        0.0
                    } else {
                        c.missing_count() as f64 / rows as f64
                    };
                    (c.name().to_string(), p)
                })
                .collect(),
        );

        let high = proportions.above(threshold);
        if !high.is_empty() {
            let listed: Vec<String> = high
                .iter()
                .map(|(name, p)| format!("'{}': {:.3}", name, p))
                .collect();
            self.reporter.warning(&format!(
                "Columns with >{}% missing values: {{{}}}",
                threshold * 100.0,
                listed.join(", ")
            ));
        }

        proportions
    }

    /// Whether every present value of `year_column` lies in `[start, end]`.
    ///
    /// An absent column is reported as an error and yields `false`.
    /// Non-numeric years count as out of range.
    pub fn validate_year_range(&self, table: &Table, year_column: &str, start: i64, end: i64) -> bool {
        let Some(column) = table.column(year_column) else {
            self.reporter
                .error(&format!("Year column '{}' not found in table", year_column));
            return false;
        };

        let (lo, hi) = (start as f64, end as f64);
        let invalid = column
            .values()
            .iter()
            .filter(|v| !v.is_missing())
            .filter(|v| match v.as_f64() {
                Some(year) => year < lo || year > hi,
                None => true,
            })
            .count();

        if invalid > 0 {
            self.reporter.warning(&format!(
                "Found {} records with years outside {}-{}",
                invalid, start, end
            ));
            return false;
        }

        true
    }

    /// Number of rows taking part in a repeated key.
    ///
    /// Every occurrence counts, so three rows sharing one key give 3.
    pub fn check_duplicates(&self, table: &Table, key_columns: &[&str]) -> usize {
        let mut columns: Vec<&Column> = Vec::with_capacity(key_columns.len());
        for name in key_columns {
            match table.column(name) {
                Some(c) => columns.push(c),
                None => {
                    self.reporter
                        .error(&format!("Key column '{}' not found, cannot check duplicates", name));
                    return 0;
                }
            }
        }

        let mut counts: HashMap<Vec<ValueKey>, usize> = HashMap::new();
        for row in 0..table.row_count() {
            *counts.entry(table.row_key(&columns, row)).or_insert(0) += 1;
        }

        let duplicates: usize = counts.values().filter(|&&n| n > 1).sum();

        if duplicates > 0 {
            self.reporter.warning(&format!(
                "Found {} duplicate records based on {:?}",
                duplicates, key_columns
            ));
        }

        duplicates
    }
}
