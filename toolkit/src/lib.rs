//! # Delicense - firm-year panel toolkit for the 1980s delicensing study
//!
//! Validates, cleans and analyses CSV tables of firm-year observations
//! (output, employment, licensing status) around the 1985 reform.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validator  │     │  CSV / JSON │
//! │  (ISO/UTF8) │     │  (auto-enc) │  ┌─▶│  Processor  │────▶│   report    │
//! └─────────────┘     └─────────────┘  │  │  Analyzer   │     └─────────────┘
//!                                      │  └─────────────┘
//!                            Reporter ─┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use delicense::{read_csv_file, Analyzer, GrowthOrder, MemoryReporter};
//!
//! let table = read_csv_file("firms.csv")?.table;
//! let reporter = MemoryReporter::new();
//! let growth = Analyzer::new(&reporter).calculate_growth_rate(
//!     &table,
//!     "output",
//!     &["firm_id"],
//!     &GrowthOrder::ByColumn("year".into()),
//! )?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - Column-oriented table with missing values
//! - [`parser`] - CSV reading/writing with auto-detection
//! - [`report`] - Injected diagnostic reporting
//! - [`validation`] - Data quality checks
//! - [`transform`] - Numeric cleaning and panel balancing
//! - [`analysis`] - Growth rates, summaries and filters
//! - [`export`] - Multi-format export
//! - [`config`] - Project and analysis configuration
//! - [`cli`] - Command layer

// Core modules
pub mod error;
pub mod table;

// Input / output
pub mod export;
pub mod parser;
pub mod report;

// Components
pub mod analysis;
pub mod transform;
pub mod validation;

// Configuration and commands
pub mod cli;
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError,
    CommandError,
    ConfigError,
    CsvError,
    ExportError,
    ProcessError,
    TableError,
};

// =============================================================================
// Re-exports - Table model
// =============================================================================

pub use table::{Column, DataType, Table, Value};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_str,
    read_csv_file,
    write_csv_file,
    ParseResult,
};

// =============================================================================
// Re-exports - Reporting
// =============================================================================

pub use report::{ConsoleReporter, LogEntry, LogLevel, MemoryReporter, Reporter};

// =============================================================================
// Re-exports - Components
// =============================================================================

pub use analysis::{
    filter::parse_conditions,
    Analyzer,
    CompareOp,
    Condition,
    GrowthOrder,
    Statistic,
    SummaryTable,
};
pub use transform::Processor;
pub use validation::{MissingProportions, Validator};

// =============================================================================
// Re-exports - Export and configuration
// =============================================================================

pub use config::{AnalysisConfig, Config, Environment, TreatmentPeriod};
pub use export::{export_to_multiple_formats, ExportFormat};
