//! Conversion to `polars` frames for columnar aggregation.
//!
//! Numeric columns become `Int64` series (or `Float64` when any value is
//! fractional), boolean columns `Boolean`, everything else `String`. Missing
//! cells are nulls.

use polars::prelude::{Column as FrameColumn, DataFrame, NamedFrom, PolarsResult, Series};

use super::{Column, DataType, Table, Value};

impl Column {
    /// This column as a `polars` series with nulls for missing cells.
    pub fn to_series(&self) -> Series {
        let name = self.name();
        match self.dtype() {
            DataType::Numeric if self.values().iter().all(|v| !matches!(v, Value::Float(_))) => {
                let values: Vec<Option<i64>> = self
                    .values()
                    .iter()
                    .map(|v| match v {
                        Value::Int(i) => Some(*i),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), values)
            }
            DataType::Numeric => {
                let values: Vec<Option<f64>> = self
                    .values()
                    .iter()
                    .map(|v| v.as_f64().filter(|x| !x.is_nan()))
                    .collect();
                Series::new(name.into(), values)
            }
            DataType::Boolean => {
                let values: Vec<Option<bool>> = self
                    .values()
                    .iter()
                    .map(|v| match v {
                        Value::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Series::new(name.into(), values)
            }
            DataType::Text => {
                let rendered: Vec<Option<String>> = self
                    .values()
                    .iter()
                    .map(|v| (!v.is_missing()).then(|| v.to_field()))
                    .collect();
                let values: Vec<Option<&str>> = rendered.iter().map(Option::as_deref).collect();
                Series::new(name.into(), values)
            }
        }
    }
}

impl Table {
    /// This table as a `polars` frame, one column per table column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<FrameColumn> = self
            .columns()
            .iter()
            .map(|c| FrameColumn::from(c.to_series()))
            .collect();
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType as FrameType;

    #[test]
    fn test_series_types_follow_column_types() {
        let table = Table::from_rows(
            &["firm_id", "output", "licensed", "sector"],
            vec![
                vec![Value::Int(1), Value::Float(2.5), Value::Bool(true), Value::from("A")],
                vec![Value::Missing, Value::Missing, Value::Missing, Value::Missing],
            ],
        )
        .unwrap();

        let frame = table.to_dataframe().unwrap();
        let types: Vec<FrameType> = frame.get_columns().iter().map(|c| c.dtype().clone()).collect();

        assert_eq!(
            types,
            vec![FrameType::Int64, FrameType::Float64, FrameType::Boolean, FrameType::String]
        );
        assert_eq!(frame.height(), 2);
        for column in frame.get_columns() {
            assert_eq!(column.null_count(), 1);
        }
    }

    #[test]
    fn test_mixed_text_column_keeps_rendered_values() {
        let column = Column::new("nic", vec![Value::from("01"), Value::Int(2), Value::Missing]);
        let series = column.to_series();

        let values: Vec<Option<&str>> = series.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("01"), Some("2"), None]);
    }
}
