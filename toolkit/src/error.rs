//! Error types for the delicensing toolkit.
//!
//! One error enum per layer:
//!
//! - [`TableError`] - Table construction invariants
//! - [`CsvError`] - CSV reading and writing
//! - [`ProcessError`] - Processor transformations
//! - [`AnalysisError`] - Analyzer aggregations
//! - [`ExportError`] - Multi-format export
//! - [`ConfigError`] - Configuration overrides
//! - [`CommandError`] - Top-level command orchestration
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Table Errors
// =============================================================================

/// Violations of the table invariants.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    /// A column does not have the table's row count.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns share a name.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or writing CSV files.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("Line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Writer failure.
    #[error("Failed to write CSV: {0}")]
    WriteError(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// The parsed rows do not form a valid table.
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Processor Errors
// =============================================================================

/// Errors from the processor transformations.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Missing required column.
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// Source rows repeat a panel key, so the panel cannot be reindexed.
    #[error("Cannot balance panel: {count} rows share a repeated ({first}, {second}) key")]
    DuplicateKeys {
        first: String,
        second: String,
        count: usize,
    },

    /// Capability that exists only as a placeholder.
    #[error("{capability} is not implemented ({} folder(s) resolved)", folders.len())]
    Unimplemented {
        capability: &'static str,
        folders: Vec<PathBuf>,
    },

    /// Table invariant violated while building the result.
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Errors from the analyzer aggregations.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing required column.
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// Column must be numeric for this operation.
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    /// Frame aggregation failed.
    #[error("Aggregation failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Table invariant violated while building the result.
    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while exporting a table.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Format name is known but has no writer.
    #[error("Export format '{0}' is not supported")]
    UnsupportedFormat(String),

    /// Format name is not recognised at all.
    #[error("Unknown export format '{0}'")]
    UnknownFormat(String),

    /// CSV writer error.
    #[error("CSV export failed: {0}")]
    Csv(#[from] CsvError),

    /// JSON serialization error.
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("Export IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading configuration overrides.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// An override could not be parsed.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    /// Unknown environment profile.
    #[error("Unknown environment '{0}' (expected development, testing or production)")]
    UnknownEnvironment(String),
}

// =============================================================================
// Command Errors (top-level)
// =============================================================================

/// Top-level command errors.
///
/// Wraps all lower-level errors; the binary prints it and exits with status 1.
#[derive(Debug, Error)]
pub enum CommandError {
    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Processing error.
    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    /// Analysis error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing human-readable output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for table construction.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for processor operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Result type for analyzer operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for commands.
pub type CommandResult<T> = Result<T, CommandError>;
