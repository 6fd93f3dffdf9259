//! Numeric coercion.

use super::Processor;
use crate::table::value::{is_na_token, parse_number};
use crate::table::{Column, Table, Value};

impl Processor<'_> {
    /// Coerce the requested columns to numbers.
    ///
    /// Unparseable values, NaN and infinities become missing. A coerced column
    /// holding any missing or fractional value is stored as floats, otherwise
    /// as integers. Absent columns are skipped with a warning.
    pub fn clean_numeric_columns(&self, table: &Table, columns: &[&str]) -> Table {
        let mut cleaned = table.clone();

        for name in columns {
            let Some(column) = cleaned.column(name) else {
                self.reporter
                    .warning(&format!("Column '{}' not found, skipping", name));
                continue;
            };

            let as_float = needs_float(column);
            if let Some(coerced) = cleaned.map_values(name, |v| promote(to_numeric(v), as_float)) {
                cleaned = coerced;
            }
        }

        cleaned
    }
}

/// Whether the coerced column must be stored as floats.
fn needs_float(column: &Column) -> bool {
    column
        .values()
        .iter()
        .map(to_numeric)
        .any(|v| matches!(v, Value::Missing | Value::Float(_)))
}

fn promote(value: Value, as_float: bool) -> Value {
    match value {
        Value::Int(i) if as_float => Value::Float(i as f64),
        other => other,
    }
}

fn to_numeric(value: &Value) -> Value {
    let coerced = match value {
        Value::Missing => Value::Missing,
        Value::Bool(b) => Value::Int(i64::from(*b)),
        Value::Int(i) => Value::Int(*i),
        Value::Float(f) => Value::Float(*f),
        Value::Text(s) => {
            let trimmed = s.trim();
            if is_na_token(trimmed) {
                Value::Missing
            } else {
                parse_number(trimmed).unwrap_or(Value::Missing)
            }
        }
    };

    match coerced {
        Value::Float(f) if !f.is_finite() => Value::Missing,
        other => other,
    }
}
