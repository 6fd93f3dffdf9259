//! CSV reading and writing with encoding and delimiter auto-detection.
//!
//! Reading produces a [`Table`] with one inferred type per column.
//! Writing emits a header row and no row-index column.

use std::io::Write;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::table::{Column, Table};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed table
    pub table: Table,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8, ASCII and anything unrecognised: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to a comma when the header contains no candidate.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text with an explicit delimiter.
///
/// Rows shorter than the header are padded with missing values; extra
/// fields are ignored; blank lines are skipped, but a row of empty fields
/// is kept as a row of missing values.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        if record.len() <= 1 && record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        for (i, column) in raw.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(&raw)
        .map(|(name, values)| Column::from_raw(name.clone(), values))
        .collect();

    Ok(Table::new(columns)?)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let table = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Write a table as comma-separated CSV to any writer.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> CsvResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.column_names())
        .map_err(|e| CsvError::WriteError(e.to_string()))?;

    for row in 0..table.row_count() {
        let fields: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.get(row).map(|v| v.to_field()).unwrap_or_default())
            .collect();
        wtr.write_record(&fields)
            .map_err(|e| CsvError::WriteError(e.to_string()))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write a table to a CSV file, creating or truncating it.
pub fn write_csv_file<P: AsRef<Path>>(table: &Table, path: P) -> CsvResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_csv(table, std::io::BufWriter::new(file))
}

/// Render a table as CSV text.
pub fn to_csv_string(table: &Table) -> CsvResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| CsvError::WriteError(e.to_string()))
}
