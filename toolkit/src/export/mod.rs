//! Export a table to several file formats at once.
//!
//! CSV and JSON (array of row objects) have writers. Excel, Stata and
//! Parquet are recognised names without a writer: they are reported as
//! unsupported and the remaining formats are still written.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ExportError, ExportResult};
use crate::parser::write_csv_file;
use crate::report::Reporter;
use crate::table::Table;

/// Output formats known to the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
    Stata,
    Parquet,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Stata => "dta",
            ExportFormat::Parquet => "parquet",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "excel",
            ExportFormat::Stata => "stata",
            ExportFormat::Parquet => "parquet",
        }
    }

    /// Whether this build can write the format.
    pub fn is_supported(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Json)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "stata" | "dta" => Ok(ExportFormat::Stata),
            "parquet" => Ok(ExportFormat::Parquet),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rows as JSON objects keyed by column name; missing cells become `null`.
pub fn to_json_records(table: &Table) -> ExportResult<JsonValue> {
    let mut records = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let mut obj = Map::new();
        for column in table.columns() {
            let cell = column.get(row).cloned().unwrap_or_default();
            obj.insert(column.name().to_string(), serde_json::to_value(cell)?);
        }
        records.push(JsonValue::Object(obj));
    }
    Ok(JsonValue::Array(records))
}

/// Write one format to `{base}.{extension}`.
pub fn export_table(table: &Table, base: &Path, format: ExportFormat) -> ExportResult<PathBuf> {
    let path = with_extension(base, format.extension());
    match format {
        ExportFormat::Csv => write_csv_file(table, &path)?,
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(&to_json_records(table)?)?;
            fs::write(&path, json)?;
        }
        other => return Err(ExportError::UnsupportedFormat(other.name().to_string())),
    }
    Ok(path)
}

/// Write `table` once per format, reporting each outcome.
///
/// A failing format is reported as an error and does not stop the others.
/// Returns the paths that were written.
pub fn export_to_multiple_formats(
    table: &Table,
    base: &Path,
    formats: &[ExportFormat],
    reporter: &dyn Reporter,
) -> Vec<PathBuf> {
    let mut written = Vec::new();
    for &format in formats {
        match export_table(table, base, format) {
            Ok(path) => {
                reporter.success(&format!("Exported to {}", path.display()));
                written.push(path);
            }
            Err(e) => reporter.error(&format!("Error exporting to {}: {}", format, e)),
        }
    }
    written
}

/// `base` with `.ext` appended to its file name (`out/panel` → `out/panel.csv`).
fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{LogLevel, MemoryReporter};
    use crate::table::Value;

    fn small() -> Table {
        Table::from_rows(
            &["firm_id", "output"],
            vec![vec![Value::Int(1), Value::Float(2.5)], vec![Value::Int(2), Value::Missing]],
        )
        .unwrap()
    }

    #[test]
    fn test_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!(matches!("sav".parse::<ExportFormat>(), Err(ExportError::UnknownFormat(_))));
        assert!(!ExportFormat::Stata.is_supported());
    }

    #[test]
    fn test_json_records_use_null_for_missing() {
        let json = to_json_records(&small()).unwrap();
        assert_eq!(json[0]["firm_id"], 1);
        assert_eq!(json[0]["output"], 2.5);
        assert!(json[1]["output"].is_null());
    }

    #[test]
    fn test_exports_supported_and_reports_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("panel");
        let reporter = MemoryReporter::new();

        let written = export_to_multiple_formats(
            &small(),
            &base,
            &[ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Json],
            &reporter,
        );

        assert_eq!(written, vec![dir.path().join("panel.csv"), dir.path().join("panel.json")]);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "firm_id,output\n1,2.5\n2,\n");
        assert!(reporter.contains(LogLevel::Error, "excel"));
        assert_eq!(reporter.messages(LogLevel::Success).len(), 2);
        assert!(reporter.contains(LogLevel::Success, "panel.json"));
        assert!(!dir.path().join("panel.xlsx").exists());
    }
}
