//! Row filtering by column conditions.
//!
//! A condition is either an exact match or an `(operator, value)` comparison:
//!
//! ```rust,ignore
//! use delicense::{CompareOp, Condition, Value};
//!
//! let conditions = vec![
//!     ("year".to_string(), Condition::Compare(CompareOp::Ge, Value::Int(1980))),
//!     ("sector".to_string(), Condition::Equals(Value::from("textiles"))),
//!     ("licensed".to_string(), Condition::Equals(Value::Bool(true))),
//! ];
//! let subset = analyzer.filter_by_conditions(&table, &conditions);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::Analyzer;
use crate::report::Reporter;
use crate::table::{Table, Value};

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Ge,
    Le,
    Gt,
    Lt,
    Ne,
    Eq,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ne => "!=",
            CompareOp::Eq => "==",
        }
    }

    /// Whether the comparison holds for `ordering` (cell relative to value).
    ///
    /// An incomparable pair satisfies only `!=`.
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => self == CompareOp::Ne,
            Some(o) => match self {
                CompareOp::Ge => o != Ordering::Less,
                CompareOp::Le => o != Ordering::Greater,
                CompareOp::Gt => o == Ordering::Greater,
                CompareOp::Lt => o == Ordering::Less,
                CompareOp::Ne => o != Ordering::Equal,
                CompareOp::Eq => o == Ordering::Equal,
            },
        }
    }
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">=" => Ok(CompareOp::Ge),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            "!=" => Ok(CompareOp::Ne),
            "==" => Ok(CompareOp::Eq),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Condition on a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Cell equals the value.
    Equals(Value),
    /// Cell compares to the value with the operator.
    Compare(CompareOp, Value),
    /// Operator that is not recognised; filtering leaves rows untouched.
    Unsupported { operator: String, value: Value },
}

impl Condition {
    /// Build from an operator token: `=` is equality, known operators compare,
    /// anything else is kept as [`Condition::Unsupported`].
    pub fn parse(operator: &str, value: Value) -> Self {
        if operator == "=" {
            return Condition::Equals(value);
        }
        match operator.parse::<CompareOp>() {
            Ok(op) => Condition::Compare(op, value),
            Err(operator) => Condition::Unsupported { operator, value },
        }
    }

    /// Whether `cell` satisfies the condition. Unsupported conditions match everything.
    ///
    /// The condition value is first coerced towards the cell: text values are
    /// inferred against numeric and boolean cells, and other values are
    /// rendered as text against text cells.
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            Condition::Equals(value) => cell.compare(&align(value, cell)) == Some(Ordering::Equal),
            Condition::Compare(op, value) => op.holds(cell.compare(&align(value, cell))),
            Condition::Unsupported { .. } => true,
        }
    }
}

fn align<'v>(value: &'v Value, cell: &Value) -> Cow<'v, Value> {
    match (cell, value) {
        (Value::Missing, _) | (_, Value::Missing) => Cow::Borrowed(value),
        (Value::Text(_), Value::Text(_)) => Cow::Borrowed(value),
        (Value::Text(_), other) => Cow::Owned(Value::Text(other.to_field())),
        (_, Value::Text(raw)) => Cow::Owned(Value::infer(raw)),
        _ => Cow::Borrowed(value),
    }
}

static TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^<>=!]+?)\s*([<>=!]+)\s*(.*?)\s*$").expect("valid filter term regex")
});

/// Parse a filter string: comma-separated `<column><operator><value>` terms.
///
/// `year>=1982,sector=A` gives `year >= "1982"` and `sector == "A"`. Values
/// stay text and take the type of the column they are compared with, so
/// `nic=01` matches the text `01`. Terms without an operator are reported and
/// skipped.
pub fn parse_conditions(expr: &str, reporter: &dyn Reporter) -> Vec<(String, Condition)> {
    let mut conditions = Vec::new();

    for term in expr.split(',') {
        if term.trim().is_empty() {
            continue;
        }
        match TERM_RE.captures(term) {
            Some(caps) => {
                let column = caps[1].to_string();
                let condition = Condition::parse(&caps[2], Value::Text(caps[3].to_string()));
                conditions.push((column, condition));
            }
            None => {
                reporter.warning(&format!("Ignoring filter term without operator: '{}'", term.trim()));
            }
        }
    }

    conditions
}

impl Analyzer<'_> {
    /// Keep the rows satisfying every condition, applied in order.
    ///
    /// Conditions on absent columns and conditions with an unknown operator
    /// are reported and have no effect.
    pub fn filter_by_conditions(&self, table: &Table, conditions: &[(String, Condition)]) -> Table {
        let mut keep: Vec<usize> = (0..table.row_count()).collect();

        for (name, condition) in conditions {
            let Some(column) = table.column(name) else {
                self.reporter
                    .warning(&format!("Column '{}' not found, skipping condition", name));
                continue;
            };

            if let Condition::Unsupported { operator, .. } = condition {
                self.reporter
                    .warning(&format!("Unknown operator '{}'", operator));
                continue;
            }

            keep.retain(|&row| column.get(row).is_some_and(|cell| condition.matches(cell)));
        }

        self.reporter.info(&format!(
            "Filtered from {} to {} records",
            table.row_count(),
            keep.len()
        ));

        table.take_rows(&keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{LogLevel, MemoryReporter};

    fn years() -> Table {
        let sectors = ["A", "B", "A", "A", "B"];
        let rows = (1980..=1984)
            .zip(sectors)
            .map(|(y, s)| vec![Value::Int(y), Value::from(s), Value::Float((y - 1979) as f64)])
            .collect();
        Table::from_rows(&["year", "sector", "output"], rows).unwrap()
    }

    fn year_values(table: &Table) -> Vec<Value> {
        table.column("year").unwrap().values().to_vec()
    }

    #[test]
    fn test_compare_keeps_matching_rows() {
        let reporter = MemoryReporter::new();
        let conditions = vec![("year".to_string(), Condition::Compare(CompareOp::Ge, Value::Int(1982)))];
        let filtered = Analyzer::new(&reporter).filter_by_conditions(&years(), &conditions);

        assert_eq!(year_values(&filtered), vec![Value::Int(1982), Value::Int(1983), Value::Int(1984)]);
        assert!(reporter.contains(LogLevel::Info, "Filtered from 5 to 3 records"));
    }

    #[test]
    fn test_conditions_intersect() {
        let reporter = MemoryReporter::new();
        let conditions = vec![
            ("year".to_string(), Condition::Compare(CompareOp::Ge, Value::Int(1982))),
            ("sector".to_string(), Condition::Equals(Value::from("A"))),
        ];
        let filtered = Analyzer::new(&reporter).filter_by_conditions(&years(), &conditions);

        assert_eq!(year_values(&filtered), vec![Value::Int(1982), Value::Int(1983)]);
    }

    #[test]
    fn test_every_operator() {
        let reporter = MemoryReporter::new();
        let analyzer = Analyzer::new(&reporter);
        let count = |op| {
            let conditions = vec![("year".to_string(), Condition::Compare(op, Value::Int(1982)))];
            analyzer.filter_by_conditions(&years(), &conditions).row_count()
        };

        assert_eq!(count(CompareOp::Ge), 3);
        assert_eq!(count(CompareOp::Le), 3);
        assert_eq!(count(CompareOp::Gt), 2);
        assert_eq!(count(CompareOp::Lt), 2);
        assert_eq!(count(CompareOp::Ne), 4);
        assert_eq!(count(CompareOp::Eq), 1);
    }

    #[test]
    fn test_numeric_comparison_across_int_and_float() {
        let reporter = MemoryReporter::new();
        let conditions = vec![("output".to_string(), Condition::Compare(CompareOp::Gt, Value::Int(3)))];
        let filtered = Analyzer::new(&reporter).filter_by_conditions(&years(), &conditions);

        assert_eq!(filtered.row_count(), 2);
    }

    #[test]
    fn test_unknown_operator_is_pass_through() {
        let reporter = MemoryReporter::new();
        let conditions = vec![("year".to_string(), Condition::parse("=>", Value::Int(1982)))];
        let filtered = Analyzer::new(&reporter).filter_by_conditions(&years(), &conditions);

        assert_eq!(filtered.row_count(), 5);
        assert!(reporter.contains(LogLevel::Warning, "Unknown operator '=>'"));
    }

    #[test]
    fn test_unknown_column_is_skipped() {
        let reporter = MemoryReporter::new();
        let conditions = vec![
            ("state".to_string(), Condition::Equals(Value::from("Gujarat"))),
            ("sector".to_string(), Condition::Equals(Value::from("B"))),
        ];
        let filtered = Analyzer::new(&reporter).filter_by_conditions(&years(), &conditions);

        assert_eq!(filtered.row_count(), 2);
        assert!(reporter.contains(LogLevel::Warning, "'state' not found"));
    }

    #[test]
    fn test_missing_cells_fail_all_but_not_equal() {
        let reporter = MemoryReporter::new();
        let table = Table::from_rows(&["x"], vec![vec![Value::Missing], vec![Value::Int(1)]]).unwrap();
        let analyzer = Analyzer::new(&reporter);

        let eq = vec![("x".to_string(), Condition::Equals(Value::Int(1)))];
        assert_eq!(analyzer.filter_by_conditions(&table, &eq).row_count(), 1);

        let ne = vec![("x".to_string(), Condition::Compare(CompareOp::Ne, Value::Int(1)))];
        assert_eq!(analyzer.filter_by_conditions(&table, &ne).row_count(), 1);
    }

    #[test]
    fn test_parse_conditions_grammar() {
        let reporter = MemoryReporter::new();
        let conditions = parse_conditions("sector=A, year>=1982,licensed==true,bogus,,output=>5", &reporter);

        assert_eq!(
            conditions,
            vec![
                ("sector".to_string(), Condition::Equals(Value::from("A"))),
                ("year".to_string(), Condition::Compare(CompareOp::Ge, Value::from("1982"))),
                ("licensed".to_string(), Condition::Compare(CompareOp::Eq, Value::from("true"))),
                (
                    "output".to_string(),
                    Condition::Unsupported { operator: "=>".to_string(), value: Value::from("5") }
                ),
            ]
        );
        assert!(reporter.contains(LogLevel::Warning, "'bogus'"));
    }

    #[test]
    fn test_text_literal_against_text_column() {
        let reporter = MemoryReporter::new();
        let table = crate::parser::parse_str("firm_id,nic,licensed\n1,01,true\n2,02,false\n3,2x,unknown\n", ',').unwrap();
        let analyzer = Analyzer::new(&reporter);

        let nic = parse_conditions("nic=01", &reporter);
        let kept = analyzer.filter_by_conditions(&table, &nic);
        assert_eq!(kept.column("firm_id").unwrap().values(), &[Value::Int(1)]);

        let licensed = parse_conditions("licensed=true", &reporter);
        assert_eq!(analyzer.filter_by_conditions(&table, &licensed).row_count(), 1);
    }

    #[test]
    fn test_text_literal_takes_numeric_and_boolean_column_types() {
        let reporter = MemoryReporter::new();
        let table = crate::parser::parse_str("year,licensed\n1980,true\n1982,false\n1984,true\n", ',').unwrap();
        let analyzer = Analyzer::new(&reporter);

        let conditions = parse_conditions("year>=1982.0,licensed==TRUE", &reporter);
        let kept = analyzer.filter_by_conditions(&table, &conditions);
        assert_eq!(kept.column("year").unwrap().values(), &[Value::Int(1984)]);

        let non_numeric = parse_conditions("year=abc", &reporter);
        assert_eq!(analyzer.filter_by_conditions(&table, &non_numeric).row_count(), 0);
    }

    #[test]
    fn test_number_against_text_column_compares_rendered_text() {
        let reporter = MemoryReporter::new();
        let table = Table::from_rows(&["code"], vec![vec![Value::from("7")], vec![Value::from("x")]]).unwrap();
        let conditions = vec![("code".to_string(), Condition::Equals(Value::Int(7)))];

        assert_eq!(Analyzer::new(&reporter).filter_by_conditions(&table, &conditions).row_count(), 1);
    }
}
