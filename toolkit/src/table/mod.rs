//! In-memory column-oriented table.
//!
//! A [`Table`] is an ordered list of named [`Column`]s that all share one row
//! count. Operations never mutate a table in place; they build a new one.

pub mod frame;
pub mod value;

pub use value::{DataType, Value, ValueKey};

use crate::error::{TableError, TableResult};
use std::collections::HashSet;
use std::fmt;

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a column from raw CSV fields, inferring one type for the column.
    ///
    /// All-number columns become numeric (floats if any field is fractional),
    /// all-boolean columns become boolean, anything else keeps the raw text.
    pub fn from_raw(name: impl Into<String>, raw: &[String]) -> Self {
        let inferred: Vec<Value> = raw.iter().map(|s| Value::infer(s)).collect();

        let all_numeric = inferred.iter().all(|v| v.is_missing() || v.is_number());
        let all_bool = inferred
            .iter()
            .all(|v| v.is_missing() || matches!(v, Value::Bool(_)));

        let values = if all_numeric {
            let has_float = inferred.iter().any(|v| matches!(v, Value::Float(_)));
            if has_float {
                inferred
                    .into_iter()
                    .map(|v| match v {
                        Value::Int(i) => Value::Float(i as f64),
                        other => other,
                    })
                    .collect()
            } else {
                inferred
            }
        } else if all_bool {
            inferred
        } else {
            inferred
                .into_iter()
                .zip(raw)
                .map(|(v, s)| match v {
                    Value::Missing => Value::Missing,
                    _ => Value::Text(s.clone()),
                })
                .collect()
        };

        Self::new(name, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Inferred type. A column without any present value counts as numeric.
    pub fn dtype(&self) -> DataType {
        let mut present = self.values.iter().filter(|v| !v.is_missing()).peekable();
        if present.peek().is_none() {
            return DataType::Numeric;
        }

        let mut numeric = true;
        let mut boolean = true;
        for v in present {
            numeric &= v.is_number();
            boolean &= matches!(v, Value::Bool(_));
        }

        if numeric {
            DataType::Numeric
        } else if boolean {
            DataType::Boolean
        } else {
            DataType::Text
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype() == DataType::Numeric
    }

    /// Copy of this column restricted to the given row indices.
    pub fn take(&self, rows: &[usize]) -> Column {
        let values = rows
            .iter()
            .map(|&i| self.values.get(i).cloned().unwrap_or_default())
            .collect();
        Column::new(self.name.clone(), values)
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> TableResult<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != row_count {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from row-major values. Short rows are padded with missing values.
    pub fn from_rows(headers: &[&str], rows: Vec<Vec<Value>>) -> TableResult<Self> {
        let mut data: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for row in rows {
            let mut cells = row.into_iter();
            for column in data.iter_mut() {
                column.push(cells.next().unwrap_or_default());
            }
        }

        let columns = headers
            .iter()
            .zip(data)
            .map(|(name, values)| Column::new(*name, values))
            .collect();
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// New table with `column` replacing the same-named column, or appended.
    pub fn with_column(&self, column: Column) -> TableResult<Self> {
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => columns.push(column),
        }
        Self::new(columns)
    }

    /// New table with every value of `name` passed through `f`.
    ///
    /// Returns `None` when the column is absent.
    pub fn map_values<F>(&self, name: &str, f: F) -> Option<Self>
    where
        F: FnMut(&Value) -> Value,
    {
        let index = self.columns.iter().position(|c| c.name == name)?;
        let mut columns = self.columns.clone();
        let mapped = columns[index].values.iter().map(f).collect();
        columns[index].values = mapped;
        Some(Self {
            columns,
            row_count: self.row_count,
        })
    }

    /// New table with only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            row_count: rows.len(),
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Self {
        let rows: Vec<usize> = (0..n.min(self.row_count)).collect();
        self.take_rows(&rows)
    }

    /// New table restricted to the named columns, in the given order.
    ///
    /// Names that are not present are ignored.
    pub fn select(&self, names: &[&str]) -> Self {
        let columns = names
            .iter()
            .filter_map(|n| self.column(n).cloned())
            .collect();
        Self {
            columns,
            row_count: self.row_count,
        }
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().filter_map(|c| c.get(index)).collect())
    }

    /// Key of the given row over `columns` (callers check the columns exist).
    pub(crate) fn row_key(&self, columns: &[&Column], index: usize) -> Vec<ValueKey> {
        columns
            .iter()
            .map(|c| c.get(index).map(Value::key).unwrap_or(ValueKey::Missing))
            .collect()
    }
}

impl fmt::Display for Table {
    /// Right-aligned plain-text rendering with a leading row index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.row_count.saturating_sub(1).to_string().len();
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| c.values.iter().map(Value::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(c, vals)| {
                vals.iter()
                    .map(String::len)
                    .chain(std::iter::once(c.name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:width$}", "", width = index_width)?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column.name, width = width)?;
        }
        writeln!(f)?;

        for row in 0..self.row_count {
            write!(f, "{:<width$}", row, width = index_width)?;
            for (vals, width) in cells.iter().zip(&widths) {
                let cell = vals.get(row).map(String::as_str).unwrap_or("");
                write!(f, "  {:>width$}", cell, width = width)?;
            }
            writeln!(f)?;
        }

        write!(f, "[{} rows x {} columns]", self.row_count, self.columns.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            &["firm_id", "year", "sector"],
            vec![
                vec![Value::Int(1), Value::Int(1980), Value::from("A")],
                vec![Value::Int(2), Value::Int(1981)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("sector").unwrap().values()[1], Value::Missing);
    }

    #[test]
    fn test_new_rejects_unequal_lengths() {
        let result = Table::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("b", vec![]),
        ]);
        assert!(matches!(result, Err(TableError::LengthMismatch { .. })));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = Table::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("a", vec![Value::Int(2)]),
        ]);
        assert_eq!(result, Err(TableError::DuplicateColumn("a".into())));
    }

    #[test]
    fn test_with_column_does_not_mutate_source() {
        let table = sample();
        let replaced = table
            .with_column(Column::new("year", vec![Value::Missing, Value::Missing]))
            .unwrap();
        assert_eq!(table.column("year").unwrap().missing_count(), 0);
        assert_eq!(replaced.column("year").unwrap().missing_count(), 2);
        assert_eq!(replaced.column_names(), vec!["firm_id", "year", "sector"]);
    }

    #[test]
    fn test_from_raw_infers_column_types() {
        let raw = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let ints = Column::from_raw("year", &raw(&["1980", "", "1982"]));
        assert_eq!(ints.values(), &[Value::Int(1980), Value::Missing, Value::Int(1982)]);

        let floats = Column::from_raw("output", &raw(&["1", "2.5"]));
        assert_eq!(floats.values(), &[Value::Float(1.0), Value::Float(2.5)]);

        let mixed = Column::from_raw("code", &raw(&["1", "x"]));
        assert_eq!(mixed.dtype(), DataType::Text);
        assert_eq!(mixed.values()[0], Value::Text("1".into()));
    }

    #[test]
    fn test_all_missing_column_is_numeric() {
        let column = Column::new("empty", vec![Value::Missing, Value::Missing]);
        assert_eq!(column.dtype(), DataType::Numeric);
    }

    #[test]
    fn test_display_contains_headers_and_shape() {
        let rendered = sample().to_string();
        assert!(rendered.contains("firm_id"));
        assert!(rendered.contains("[2 rows x 3 columns]"));
    }
}
