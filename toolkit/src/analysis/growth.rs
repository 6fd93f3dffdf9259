//! Group-wise growth rates.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::Analyzer;
use crate::error::{AnalysisError, AnalysisResult};
use crate::table::{Column, Table, Value, ValueKey};

/// Row order within each group before differencing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GrowthOrder {
    /// Sort by the value column itself.
    ///
    /// Growth is then taken between rows of increasing magnitude, not
    /// consecutive periods. Kept for compatibility with earlier outputs.
    #[default]
    ByValue,
    /// Sort by the named column, normally the year.
    ByColumn(String),
}

impl Analyzer<'_> {
    /// Add `{value_column}_growth`: `(current - previous) / previous` within
    /// each group of `group_columns`.
    ///
    /// Rows are stably sorted by the group columns and then by the `order`
    /// column, and returned in that order. The first row of each group, rows
    /// whose current or previous value is missing and rows with a missing
    /// group key get a missing growth. A previous value of 0 gives an infinite
    /// growth, or missing when the current value is 0 too.
    pub fn calculate_growth_rate(
        &self,
        table: &Table,
        value_column: &str,
        group_columns: &[&str],
        order: &GrowthOrder,
    ) -> AnalysisResult<Table> {
        let value = require(table, value_column)?;
        if !value.is_numeric() {
            return Err(AnalysisError::NotNumeric(value_column.to_string()));
        }

        let groups: Vec<&Column> = group_columns
            .iter()
            .map(|name| require(table, name))
            .collect::<AnalysisResult<_>>()?;

        let order_column = match order {
            GrowthOrder::ByValue => {
                self.reporter.warning(&format!(
                    "Growth of '{}' is computed over rows sorted by value, not by time; \
                     pass an order column for period-to-period growth",
                    value_column
                ));
                value
            }
            GrowthOrder::ByColumn(name) => require(table, name)?,
        };

        let mut sort_keys: Vec<&Column> = groups.clone();
        sort_keys.push(order_column);

        let mut rows: Vec<usize> = (0..table.row_count()).collect();
        rows.sort_by(|&a, &b| compare_rows(&sort_keys, a, b));

        let sorted = table.take_rows(&rows);
        let growth = growth_values(&sorted, value_column, group_columns);

        Ok(sorted.with_column(Column::new(format!("{}_growth", value_column), growth))?)
    }
}

fn require<'t>(table: &'t Table, name: &str) -> AnalysisResult<&'t Column> {
    table
        .column(name)
        .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))
}

fn compare_rows(keys: &[&Column], a: usize, b: usize) -> Ordering {
    for column in keys {
        let ordering = match (column.get(a), column.get(b)) {
            (Some(x), Some(y)) => x.sort_cmp(y),
            _ => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Growth of every row of an already sorted table.
fn growth_values(sorted: &Table, value_column: &str, group_columns: &[&str]) -> Vec<Value> {
    let groups: Vec<&Column> = group_columns
        .iter()
        .filter_map(|name| sorted.column(name))
        .collect();
    let values: &[Value] = sorted
        .column(value_column)
        .map(Column::values)
        .unwrap_or(&[]);

    let mut previous: HashMap<Vec<ValueKey>, Option<f64>> = HashMap::new();
    let mut growth = Vec::with_capacity(sorted.row_count());

    for (row, value) in values.iter().enumerate() {
        let key = sorted.row_key(&groups, row);
        if key.contains(&ValueKey::Missing) {
            growth.push(Value::Missing);
            continue;
        }

        let current = value.as_f64();
        let rate = match (previous.get(&key).copied().flatten(), current) {
            // x / 0 is infinite; 0 / 0 is NaN and therefore missing
            (Some(prev), Some(cur)) => Value::from((cur - prev) / prev),
            _ => Value::Missing,
        };

        growth.push(rate);
        previous.insert(key, current);
    }

    growth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{LogLevel, MemoryReporter};

    fn assert_growth(actual: &[Value], expected: &[Option<f64>]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            match e {
                None => assert!(a.is_missing(), "expected missing, got {:?}", a),
                Some(x) => {
                    let got = a.as_f64().unwrap();
                    assert!((got - x).abs() < 1e-9, "expected {}, got {}", x, got);
                }
            }
        }
    }

    fn one_firm(outputs: &[f64]) -> Table {
        let rows = outputs
            .iter()
            .enumerate()
            .map(|(i, &o)| vec![Value::Int(1), Value::Int(1980 + i as i64), Value::Float(o)])
            .collect();
        Table::from_rows(&["firm_id", "year", "output"], rows).unwrap()
    }

    #[test]
    fn test_growth_within_single_group() {
        let reporter = MemoryReporter::new();
        let result = Analyzer::new(&reporter)
            .calculate_growth_rate(&one_firm(&[100.0, 110.0, 121.0]), "output", &["firm_id"], &GrowthOrder::ByValue)
            .unwrap();

        assert_growth(
            result.column("output_growth").unwrap().values(),
            &[None, Some(0.1), Some(0.1)],
        );
        assert_eq!(result.column_names(), vec!["firm_id", "year", "output", "output_growth"]);
    }

    #[test]
    fn test_by_value_order_warns_and_sorts_by_magnitude() {
        let reporter = MemoryReporter::new();
        let result = Analyzer::new(&reporter)
            .calculate_growth_rate(&one_firm(&[121.0, 110.0, 100.0]), "output", &["firm_id"], &GrowthOrder::ByValue)
            .unwrap();

        assert_eq!(
            result.column("year").unwrap().values(),
            &[Value::Int(1982), Value::Int(1981), Value::Int(1980)]
        );
        assert_growth(
            result.column("output_growth").unwrap().values(),
            &[None, Some(0.1), Some(0.1)],
        );
        assert!(reporter.contains(LogLevel::Warning, "sorted by value"));
    }

    #[test]
    fn test_by_column_order_is_chronological() {
        let reporter = MemoryReporter::new();
        let result = Analyzer::new(&reporter)
            .calculate_growth_rate(
                &one_firm(&[121.0, 110.0, 100.0]),
                "output",
                &["firm_id"],
                &GrowthOrder::ByColumn("year".into()),
            )
            .unwrap();

        assert_growth(
            result.column("output_growth").unwrap().values(),
            &[None, Some(-11.0 / 121.0), Some(-10.0 / 110.0)],
        );
        assert!(reporter.messages(LogLevel::Warning).is_empty());
    }

    #[test]
    fn test_each_group_starts_missing() {
        let reporter = MemoryReporter::new();
        let table = Table::from_rows(
            &["firm_id", "output"],
            vec![
                vec![Value::Int(2), Value::Float(10.0)],
                vec![Value::Int(1), Value::Float(1.0)],
                vec![Value::Int(2), Value::Float(15.0)],
                vec![Value::Int(1), Value::Float(2.0)],
            ],
        )
        .unwrap();

        let result = Analyzer::new(&reporter)
            .calculate_growth_rate(&table, "output", &["firm_id"], &GrowthOrder::ByValue)
            .unwrap();

        assert_eq!(
            result.column("firm_id").unwrap().values(),
            &[Value::Int(1), Value::Int(1), Value::Int(2), Value::Int(2)]
        );
        assert_growth(
            result.column("output_growth").unwrap().values(),
            &[None, Some(1.0), None, Some(0.5)],
        );
    }

    #[test]
    fn test_missing_values_and_keys_give_missing_growth() {
        let reporter = MemoryReporter::new();
        let table = Table::from_rows(
            &["firm_id", "year", "output"],
            vec![
                vec![Value::Int(1), Value::Int(1980), Value::Float(4.0)],
                vec![Value::Int(1), Value::Int(1981), Value::Missing],
                vec![Value::Int(1), Value::Int(1982), Value::Float(6.0)],
                vec![Value::Missing, Value::Int(1980), Value::Float(1.0)],
            ],
        )
        .unwrap();

        let result = Analyzer::new(&reporter)
            .calculate_growth_rate(&table, "output", &["firm_id"], &GrowthOrder::ByColumn("year".into()))
            .unwrap();

        assert_growth(result.column("output_growth").unwrap().values(), &[None, None, None, None]);
    }

    #[test]
    fn test_growth_from_zero_is_infinite() {
        let reporter = MemoryReporter::new();
        let table = one_firm(&[0.0, 5.0, 0.0, 0.0]);

        let result = Analyzer::new(&reporter)
            .calculate_growth_rate(&table, "output", &["firm_id"], &GrowthOrder::ByColumn("year".into()))
            .unwrap();
        let growth = result.column("output_growth").unwrap().values();

        assert!(growth[0].is_missing());
        assert_eq!(growth[1], Value::Float(f64::INFINITY));
        assert_eq!(growth[2], Value::Float(-1.0));
        assert!(growth[3].is_missing());
        assert_eq!(
            crate::parser::to_csv_string(&result.select(&["year", "output_growth"])).unwrap(),
            "year,output_growth\n1980,\n1981,inf\n1982,-1.0\n1983,\n"
        );
    }

    #[test]
    fn test_missing_columns_are_errors() {
        let reporter = MemoryReporter::new();
        let analyzer = Analyzer::new(&reporter);
        let table = one_firm(&[1.0, 2.0]);

        let missing_value = analyzer.calculate_growth_rate(&table, "sales", &["firm_id"], &GrowthOrder::ByValue);
        assert!(matches!(missing_value, Err(AnalysisError::MissingColumn(c)) if c == "sales"));

        let missing_group = analyzer.calculate_growth_rate(&table, "output", &["plant"], &GrowthOrder::ByValue);
        assert!(matches!(missing_group, Err(AnalysisError::MissingColumn(c)) if c == "plant"));
    }

    #[test]
    fn test_text_value_column_is_rejected() {
        let reporter = MemoryReporter::new();
        let table = Table::from_rows(&["firm_id", "sector"], vec![vec![Value::Int(1), Value::from("A")]]).unwrap();

        let result = Analyzer::new(&reporter).calculate_growth_rate(&table, "sector", &["firm_id"], &GrowthOrder::ByValue);
        assert!(matches!(result, Err(AnalysisError::NotNumeric(_))));
    }
}
