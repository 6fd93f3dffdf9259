//! Command layer: argument definitions and the three command handlers.
//!
//! Handlers load a CSV, call the components and print a plain-text report to
//! `out`. Diagnostics from the components go to the injected [`Reporter`].
//! Any error is returned to the binary, which prints it and exits with 1.

use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{filter::parse_conditions, Analyzer, GrowthOrder};
use crate::config::{AnalysisConfig, Config, TreatmentPeriod};
use crate::error::CommandResult;
use crate::export::{export_to_multiple_formats, ExportFormat};
use crate::parser::{read_csv_file, write_csv_file};
use crate::report::Reporter;
use crate::table::{Column, Table};
use crate::transform::Processor;
use crate::validation::Validator;

/// Rows shown by `analyze --growth`.
const GROWTH_SAMPLE_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "delicense")]
#[command(about = "1980s Delicensing Analysis Tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate data quality
    Validate(ValidateArgs),

    /// Process and clean data
    Process(ProcessArgs),

    /// Run analysis
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Input CSV file
    #[arg(long)]
    pub file: PathBuf,

    /// Missing value threshold between 0 and 1 (default: from configuration, 0.5)
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Year column name (default: from configuration, year)
    #[arg(long)]
    pub year_col: Option<String>,

    /// Comma-separated ID columns for duplicate check
    #[arg(long, value_delimiter = ',')]
    pub id_cols: Vec<String>,

    /// First valid year (default: from configuration)
    #[arg(long)]
    pub start_year: Option<i64>,

    /// Last valid year (default: from configuration)
    #[arg(long)]
    pub end_year: Option<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProcessArgs {
    /// Input CSV file
    #[arg(long)]
    pub input: PathBuf,

    /// Output CSV file (default: <input>_processed.csv)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Comma-separated numeric columns to clean
    #[arg(long, value_delimiter = ',')]
    pub numeric_cols: Vec<String>,

    /// Create panel structure
    #[arg(long)]
    pub panel: bool,

    /// Firm ID column for the panel (default: from configuration, firm_id)
    #[arg(long)]
    pub firm_col: Option<String>,

    /// Time column for the panel (default: from configuration, year)
    #[arg(long)]
    pub time_col: Option<String>,

    /// Also export to these formats: csv, json, excel, stata, parquet
    /// (default: from configuration)
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<ExportFormat>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Input CSV file
    #[arg(long)]
    pub file: PathBuf,

    /// Generate summary statistics
    #[arg(long)]
    pub summary: bool,

    /// Comma-separated columns for summary
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Calculate growth rates
    #[arg(long)]
    pub growth: bool,

    /// Value column for growth calculation (default: from configuration, output)
    #[arg(long)]
    pub value_col: Option<String>,

    /// Comma-separated grouping columns (default: the configured firm column)
    #[arg(long, value_delimiter = ',')]
    pub group_cols: Vec<String>,

    /// Column ordering rows within a group, usually the year
    /// (default: the value column itself)
    #[arg(long)]
    pub order_col: Option<String>,

    /// Filter conditions (format: col=val,col2>=val2)
    #[arg(long)]
    pub filter: Option<String>,

    /// Output file for growth results
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Run one command.
pub fn run(
    command: &Commands,
    config: &Config,
    reporter: &dyn Reporter,
    out: &mut dyn Write,
) -> CommandResult<()> {
    match command {
        Commands::Validate(args) => cmd_validate(args, config, reporter, out),
        Commands::Process(args) => cmd_process(args, config, reporter, out),
        Commands::Analyze(args) => cmd_analyze(args, config, reporter, out),
    }
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let threshold: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(format!("{} is not between 0 and 1", threshold))
    }
}

fn load(path: &Path, reporter: &dyn Reporter) -> CommandResult<Table> {
    let parsed = read_csv_file(path)?;
    reporter.info(&format!(
        "Read {} (encoding {}, delimiter '{}')",
        path.display(),
        parsed.encoding,
        format_delimiter(parsed.delimiter)
    ));
    Ok(parsed.table)
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

pub fn cmd_validate(
    args: &ValidateArgs,
    config: &Config,
    reporter: &dyn Reporter,
    out: &mut dyn Write,
) -> CommandResult<()> {
    writeln!(out, "Validating file: {}", args.file.display())?;

    let table = load(&args.file, reporter)?;
    let validator = Validator::new(reporter);

    writeln!(
        out,
        "\nLoaded {} records with {} columns",
        table.row_count(),
        table.column_count()
    )?;

    writeln!(out, "\n--- Missing Values Check ---")?;
    let threshold = args.threshold.unwrap_or(config.missing_threshold);
    let missing = validator.check_missing_values(&table, threshold);
    for (column, proportion) in missing.iter().filter(|(_, p)| *p > 0.0) {
        writeln!(out, "  {}: {:.1}% missing", column, proportion * 100.0)?;
    }

    let year_col = args.year_col.as_deref().unwrap_or(&config.year_col);
    match table.column(year_col) {
        Some(years) => {
            let start = args.start_year.unwrap_or(config.start_year);
            let end = args.end_year.unwrap_or(config.end_year);

            writeln!(out, "\n--- Year Range Validation ---")?;
            if validator.validate_year_range(&table, year_col, start, end) {
                writeln!(out, "  ✓ All years within {}-{}", start, end)?;
                let analysis = AnalysisConfig::default();
                let (pre, post) = count_by_period(years, &analysis);
                writeln!(
                    out,
                    "  Pre-delicensing (<{}): {} records, post-delicensing: {} records",
                    analysis.delicensing_year, pre, post
                )?;
            } else {
                writeln!(out, "  ✗ Some years outside {}-{}", start, end)?;
            }
        }
        // only a requested column is worth a warning
        None if args.year_col.is_some() => reporter.warning(&format!(
            "Year column '{}' not in file, skipping year range check",
            year_col
        )),
        None => {}
    }

    if !args.id_cols.is_empty() {
        writeln!(out, "\n--- Duplicate Check ---")?;
        let duplicates = validator.check_duplicates(&table, &as_strs(&args.id_cols));
        if duplicates == 0 {
            writeln!(out, "  ✓ No duplicates found on {:?}", args.id_cols)?;
        } else {
            writeln!(out, "  ✗ Found {} duplicate records", duplicates)?;
        }
    }

    writeln!(out, "\n✓ Validation complete")?;
    Ok(())
}

/// Present years split into (pre, post) delicensing counts.
fn count_by_period(years: &Column, analysis: &AnalysisConfig) -> (usize, usize) {
    years
        .values()
        .iter()
        .filter_map(|v| v.as_f64())
        .fold((0, 0), |(pre, post), year| {
            match analysis.treatment_period(year.floor() as i64) {
                TreatmentPeriod::Pre => (pre + 1, post),
                TreatmentPeriod::Post => (pre, post + 1),
            }
        })
}

/// `dir/name.csv` → `dir/name_processed.csv`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_processed.csv", stem))
}

pub fn cmd_process(
    args: &ProcessArgs,
    config: &Config,
    reporter: &dyn Reporter,
    out: &mut dyn Write,
) -> CommandResult<()> {
    writeln!(out, "Processing file: {}", args.input.display())?;

    let mut table = load(&args.input, reporter)?;
    let processor = Processor::new(reporter);

    writeln!(out, "Loaded {} records", table.row_count())?;

    if !args.numeric_cols.is_empty() {
        writeln!(out, "\n--- Cleaning Numeric Columns ---")?;
        table = processor.clean_numeric_columns(&table, &as_strs(&args.numeric_cols));
        writeln!(out, "  Cleaned columns: {}", args.numeric_cols.join(", "))?;
    }

    if args.panel {
        let firm_col = args.firm_col.as_deref().unwrap_or(&config.firm_id_col);
        let time_col = args.time_col.as_deref().unwrap_or(&config.year_col);
        writeln!(out, "\n--- Creating Panel Structure ---")?;
        table = processor.create_panel_structure(&table, firm_col, time_col)?;
        writeln!(out, "  Created panel: {} observations", table.row_count())?;
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    write_csv_file(&table, &output)?;
    writeln!(out, "\n✓ Saved processed data to: {}", output.display())?;

    let formats = if args.formats.is_empty() { &config.export_formats } else { &args.formats };
    // the processed file itself already covers its own format
    let extra: Vec<ExportFormat> = formats
        .iter()
        .copied()
        .filter(|f| output.extension().and_then(|e| e.to_str()) != Some(f.extension()))
        .collect();
    if !extra.is_empty() {
        let written = export_to_multiple_formats(&table, &output.with_extension(""), &extra, reporter);
        for path in written {
            writeln!(out, "  Exported: {}", path.display())?;
        }
    }

    Ok(())
}

pub fn cmd_analyze(
    args: &AnalyzeArgs,
    config: &Config,
    reporter: &dyn Reporter,
    out: &mut dyn Write,
) -> CommandResult<()> {
    writeln!(out, "Analyzing file: {}", args.file.display())?;

    let table = load(&args.file, reporter)?;
    let analyzer = Analyzer::new(reporter);

    writeln!(out, "Loaded {} records", table.row_count())?;

    if args.summary {
        writeln!(out, "\n--- Summary Statistics ---")?;
        let columns = as_strs(&args.columns);
        let selected = (!columns.is_empty()).then_some(columns.as_slice());
        let summary = analyzer.create_summary_stats(&table, selected)?;
        writeln!(out, "{}", summary)?;
    }

    if args.growth {
        writeln!(out, "\n--- Growth Rate Analysis ---")?;
        let value_col = args.value_col.as_deref().unwrap_or(&config.output_col);
        let group_cols = if args.group_cols.is_empty() {
            vec![config.firm_id_col.as_str()]
        } else {
            as_strs(&args.group_cols)
        };
        let order = match &args.order_col {
            Some(column) => GrowthOrder::ByColumn(column.clone()),
            None => GrowthOrder::ByValue,
        };
        let growth = analyzer.calculate_growth_rate(&table, value_col, &group_cols, &order)?;

        let growth_col = format!("{}_growth", value_col);
        let mut shown = group_cols.clone();
        shown.push(value_col);
        shown.push(&growth_col);

        writeln!(out, "\nSample growth rates:")?;
        writeln!(out, "{}", growth.select(&shown).head(GROWTH_SAMPLE_ROWS))?;

        if let Some(output) = &args.output {
            write_csv_file(&growth, output)?;
            writeln!(out, "\n✓ Saved growth rates to: {}", output.display())?;
        }
    }

    if let Some(expr) = &args.filter {
        writeln!(out, "\n--- Applying Filters ---")?;
        let conditions = parse_conditions(expr, reporter);
        let filtered = analyzer.filter_by_conditions(&table, &conditions);
        writeln!(out, "  Filtered to {} records", filtered.row_count())?;
    }

    writeln!(out, "\n✓ Analysis complete")?;
    Ok(())
}
