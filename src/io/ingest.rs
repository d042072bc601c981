//! CSV ingest.
//!
//! Turns the fuel-purchase CSV into a `Table`: the header resolved into a
//! `Schema` once, and one `Record` per data row shaped to that header.
//!
//! Only a missing file or a missing/empty header is fatal. A record the CSV
//! parser cannot read is skipped and reported, the rest of the file still
//! loads.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::diagnostics::{DiagnosticSink, Stage};
use crate::domain::{Record, Schema};
use crate::error::AppError;

/// A CSV record that could not be parsed.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: resolved schema + rows + skipped-row errors.
#[derive(Debug, Clone)]
pub struct Table {
    pub schema: Schema,
    pub records: Vec<Record>,
    pub row_errors: Vec<RowError>,
}

/// Read a CSV file from disk.
pub fn read_table(path: &Path, sink: &mut dyn DiagnosticSink) -> Result<Table, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open input CSV '{}': {e}", path.display())))?;
    let table = read_table_from(file, sink)
        .map_err(|e| AppError::input(format!("{} ({})", e.message(), path.display())))?;

    sink.info(
        Stage::Ingest,
        format!("Read {} rows from '{}'.", table.records.len(), path.display()),
    );
    Ok(table)
}

/// Read CSV data from any reader.
pub fn read_table_from<R: Read>(reader: R, sink: &mut dyn DiagnosticSink) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV header: {e}")))?
        .clone();

    // The csv reader drops a leading UTF-8 BOM before we see the header.
    if headers.iter().all(|name| name.trim().is_empty()) {
        return Err(AppError::input("CSV file appears to be empty or its header is missing."));
    }

    let schema = Schema::new(headers.iter().map(str::to_string).collect());
    for column in schema.missing_columns() {
        sink.debug(
            Stage::Ingest,
            format!("Header has no '{}' column.", column.display_name()),
        );
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                if record.len() != schema.len() {
                    sink.debug(
                        Stage::Ingest,
                        format!(
                            "Row {} has {} fields for a {}-column header; reshaping.",
                            idx + 1,
                            record.len(),
                            schema.len()
                        ),
                    );
                }
                records.push(Record::from_values(&schema, record.iter()));
            }
            Err(e) => {
                // Header is line 1, so data row `idx` sits on line `idx + 2`.
                let line = e.position().map(|p| p.line() as usize).unwrap_or(idx + 2);
                sink.warn(Stage::Ingest, format!("Skipping unreadable CSV record at line {line}: {e}"));
                row_errors.push(RowError {
                    line,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(Table {
        schema,
        records,
        row_errors,
    })
}
