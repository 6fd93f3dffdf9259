//! Descriptive statistics.
//!
//! Selected columns are converted to a `polars` frame and every statistic is
//! an aggregation over its `Float64` view.

use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;

use super::Analyzer;
use crate::error::{AnalysisResult, TableResult};
use crate::table::{Column, Table, Value};

/// Rows of a summary, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Count,
    Mean,
    Std,
    Min,
    Q25,
    Median,
    Q75,
    Max,
    Missing,
    MissingPct,
}

impl Statistic {
    pub const ALL: [Statistic; 10] = [
        Statistic::Count,
        Statistic::Mean,
        Statistic::Std,
        Statistic::Min,
        Statistic::Q25,
        Statistic::Median,
        Statistic::Q75,
        Statistic::Max,
        Statistic::Missing,
        Statistic::MissingPct,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Statistic::Count => "count",
            Statistic::Mean => "mean",
            Statistic::Std => "std",
            Statistic::Min => "min",
            Statistic::Q25 => "25%",
            Statistic::Median => "50%",
            Statistic::Q75 => "75%",
            Statistic::Max => "max",
            Statistic::Missing => "missing",
            Statistic::MissingPct => "missing_pct",
        }
    }
}

/// Statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    /// Number of present values
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1)
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
    /// Number of missing values
    pub missing: usize,
    /// Missing values as a percentage of all rows
    pub missing_pct: Option<f64>,
}

impl ColumnSummary {
    fn from_series(series: &Series, row_count: usize) -> PolarsResult<Self> {
        let floats = series.cast(&DataType::Float64)?;
        let ca = floats.f64()?;

        let missing = series.null_count();
        let count = series.len() - missing;
        let std = if count > 1 { ca.std(1) } else { None };

        Ok(Self {
            column: series.name().to_string(),
            count,
            mean: ca.mean(),
            std,
            min: ca.min(),
            q25: ca.quantile(0.25, QuantileMethod::Linear)?,
            median: ca.median(),
            q75: ca.quantile(0.75, QuantileMethod::Linear)?,
            max: ca.max(),
            missing,
            missing_pct: (row_count > 0).then(|| missing as f64 / row_count as f64 * 100.0),
        })
    }

    pub fn get(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::Count => Some(self.count as f64),
            Statistic::Mean => self.mean,
            Statistic::Std => self.std,
            Statistic::Min => self.min,
            Statistic::Q25 => self.q25,
            Statistic::Median => self.median,
            Statistic::Q75 => self.q75,
            Statistic::Max => self.max,
            Statistic::Missing => Some(self.missing as f64),
            Statistic::MissingPct => self.missing_pct,
        }
    }
}

/// Statistics table: one [`ColumnSummary`] per summarised column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryTable {
    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == name)
    }

    pub fn get(&self, statistic: Statistic, column: &str) -> Option<f64> {
        self.column(column).and_then(|c| c.get(statistic))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Statistics as a table with a leading `statistic` label column.
    ///
    /// Fails when a summarised column is itself named `statistic`.
    pub fn to_table(&self) -> TableResult<Table> {
        let mut headers = vec!["statistic"];
        headers.extend(self.columns.iter().map(|c| c.column.as_str()));

        let rows = Statistic::ALL
            .iter()
            .map(|&stat| {
                let mut row = vec![Value::from(stat.label())];
                row.extend(self.columns.iter().map(|c| Value::from(c.get(stat))));
                row
            })
            .collect();

        Table::from_rows(&headers, rows)
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = Statistic::ALL.iter().map(|s| s.label().len()).max().unwrap_or(0);
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| {
                Statistic::ALL
                    .iter()
                    .map(|&s| match c.get(s) {
                        Some(v) => format!("{:.6}", v),
                        None => "NaN".to_string(),
                    })
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(c, vals)| vals.iter().map(String::len).chain([c.column.len()]).max().unwrap_or(0))
            .collect();

        write!(f, "{:label_width$}", "")?;
        for (c, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", c.column, width = width)?;
        }

        for (i, stat) in Statistic::ALL.iter().enumerate() {
            writeln!(f)?;
            write!(f, "{:<label_width$}", stat.label())?;
            for (vals, width) in cells.iter().zip(&widths) {
                let cell = vals.get(i).map(String::as_str).unwrap_or("");
                write!(f, "  {:>width$}", cell, width = width)?;
            }
        }
        Ok(())
    }
}

impl Analyzer<'_> {
    /// Summarise numeric columns.
    ///
    /// `None` selects every numeric column. Requested columns that are not
    /// numeric are left out silently; requested columns that do not exist are
    /// skipped with a warning. A column requested twice is summarised once.
    pub fn create_summary_stats(&self, table: &Table, columns: Option<&[&str]>) -> AnalysisResult<SummaryTable> {
        let candidates: Vec<&Column> = match columns {
            None => table.columns().iter().collect(),
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    let column = table.column(name);
                    if column.is_none() {
                        self.reporter
                            .warning(&format!("Column '{}' not found, skipping", name));
                    }
                    column
                })
                .collect(),
        };

        let mut seen = HashSet::new();
        let selected: Vec<&str> = candidates
            .into_iter()
            .filter(|c| c.is_numeric())
            .map(Column::name)
            .filter(|name| seen.insert(*name))
            .collect();

        let frame = table.select(&selected).to_dataframe()?;
        let columns = frame
            .get_columns()
            .iter()
            .map(|c| ColumnSummary::from_series(c.as_materialized_series(), table.row_count()))
            .collect::<PolarsResult<Vec<_>>>()?;

        Ok(SummaryTable { columns })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use crate::report::{LogLevel, MemoryReporter};

    fn firms() -> Table {
        Table::from_rows(
            &["firm_id", "output", "sector", "employees"],
            vec![
                vec![Value::Int(1), Value::Float(1.0), Value::from("A"), Value::Missing],
                vec![Value::Int(2), Value::Float(2.0), Value::from("B"), Value::Int(10)],
                vec![Value::Int(3), Value::Float(3.0), Value::from("A"), Value::Missing],
                vec![Value::Int(4), Value::Float(4.0), Value::Missing, Value::Int(30)],
                vec![Value::Int(5), Value::Missing, Value::from("C"), Value::Int(20)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_describe_statistics() {
        let reporter = MemoryReporter::new();
        let summary = Analyzer::new(&reporter).create_summary_stats(&firms(), Some(&["output"])).unwrap();
        let output = summary.column("output").unwrap();

        assert_eq!(output.count, 4);
        assert_eq!(output.mean, Some(2.5));
        assert!((output.std.unwrap() - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(output.min, Some(1.0));
        assert_eq!(output.q25, Some(1.75));
        assert_eq!(output.median, Some(2.5));
        assert_eq!(output.q75, Some(3.25));
        assert_eq!(output.max, Some(4.0));
        assert_eq!(output.missing, 1);
        assert_eq!(output.missing_pct, Some(20.0));
    }

    #[test]
    fn test_default_selects_numeric_columns_only() {
        let reporter = MemoryReporter::new();
        let summary = Analyzer::new(&reporter).create_summary_stats(&firms(), None).unwrap();

        let names: Vec<&str> = summary.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, vec!["firm_id", "output", "employees"]);
        assert_eq!(summary.get(Statistic::Missing, "employees"), Some(2.0));
        assert_eq!(summary.get(Statistic::Missing, "firm_id"), Some(0.0));
    }

    #[test]
    fn test_requested_text_column_is_excluded() {
        let reporter = MemoryReporter::new();
        let summary = Analyzer::new(&reporter).create_summary_stats(&firms(), Some(&["sector", "output"])).unwrap();

        assert!(summary.column("sector").is_none());
        assert!(summary.column("output").is_some());
        assert!(reporter.entries().is_empty());
    }

    #[test]
    fn test_requested_absent_column_warns() {
        let reporter = MemoryReporter::new();
        let summary = Analyzer::new(&reporter).create_summary_stats(&firms(), Some(&["capital"])).unwrap();

        assert!(summary.is_empty());
        assert!(reporter.contains(LogLevel::Warning, "capital"));
    }

    #[test]
    fn test_single_value_has_no_std() {
        let reporter = MemoryReporter::new();
        let table = Table::from_rows(&["x"], vec![vec![Value::Int(7)]]).unwrap();
        let summary = Analyzer::new(&reporter).create_summary_stats(&table, None).unwrap();

        assert_eq!(summary.get(Statistic::Count, "x"), Some(1.0));
        assert_eq!(summary.get(Statistic::Std, "x"), None);
        assert_eq!(summary.get(Statistic::Median, "x"), Some(7.0));
    }

    #[test]
    fn test_to_table_layout() {
        let reporter = MemoryReporter::new();
        let table = Analyzer::new(&reporter)
            .create_summary_stats(&firms(), Some(&["output"]))
            .unwrap()
            .to_table()
            .unwrap();

        assert_eq!(table.column_names(), vec!["statistic", "output"]);
        assert_eq!(table.row_count(), 10);
        assert_eq!(table.row(8).unwrap()[0], &Value::from("missing"));
        assert_eq!(table.row(8).unwrap()[1], &Value::Float(1.0));
    }

    #[test]
    fn test_display_lists_every_statistic() {
        let reporter = MemoryReporter::new();
        let rendered = Analyzer::new(&reporter)
            .create_summary_stats(&firms(), Some(&["output"]))
            .unwrap()
            .to_string();

        for stat in Statistic::ALL {
            assert!(rendered.contains(stat.label()));
        }
        assert!(rendered.contains("2.500000"));
    }

    #[test]
    fn test_to_table_rejects_statistic_column() {
        let reporter = MemoryReporter::new();
        let table = Table::from_rows(&["statistic"], vec![vec![Value::Int(1)]]).unwrap();
        let summary = Analyzer::new(&reporter).create_summary_stats(&table, None).unwrap();

        assert!(matches!(summary.to_table(), Err(TableError::DuplicateColumn(c)) if c == "statistic"));
    }

    #[test]
    fn test_repeated_request_is_summarised_once() {
        let reporter = MemoryReporter::new();
        let summary = Analyzer::new(&reporter)
            .create_summary_stats(&firms(), Some(&["output", "output"]))
            .unwrap();

        assert_eq!(summary.columns.len(), 1);
    }
}
