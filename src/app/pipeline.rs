//! The cleaning run, end to end:
//! read -> clean -> find missing zips -> bounded enrichment -> write both outputs.
//!
//! The zip service and diagnostics sink are passed in, so the whole run can be
//! driven from tests with a fake lookup.

use std::fs;
use std::path::{Path, PathBuf};

use crate::address::find_rows_missing_zip;
use crate::app::enrich::{EnrichSettings, EnrichmentReport, enrich_missing_zips};
use crate::clean::{CleanReport, clean};
use crate::diagnostics::{DiagnosticSink, Stage};
use crate::domain::{Column, Record, RunConfig, Schema};
use crate::error::AppError;
use crate::io::export::{WriteOutcome, write_table};
use crate::io::ingest::read_table;
use crate::zipcode::ZipLookup;

/// Result of writing one output file.
#[derive(Debug, Clone)]
pub struct OutputStatus {
    pub path: PathBuf,
    pub result: Result<WriteOutcome, AppError>,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub schema: Schema,
    pub cleaned: Vec<Record>,
    pub anomalies: Vec<Record>,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub clean: CleanReport,
    pub missing_zip: usize,
    pub enrichment: EnrichmentReport,
    pub cleaned_output: OutputStatus,
    pub anomalies_output: OutputStatus,
}

/// Execute the full run. Only input problems are returned as errors.
pub fn run_clean(
    config: &RunConfig,
    lookup: &dyn ZipLookup,
    sink: &mut dyn DiagnosticSink,
) -> Result<RunOutput, AppError> {
    sink.info(Stage::Ingest, "Starting data cleaning process...".to_string());

    // 1) Storage directory + input.
    ensure_data_dir(&config.data_dir, sink)?;
    let table = read_table(&config.input_path(), sink)?;
    let schema = table.schema;

    if schema.index_of(Column::FullAddress).is_none() {
        sink.warn(
            Stage::Ingest,
            "Input data does not seem to have a 'Full Address' column. Zip lookup/update will be skipped.".to_string(),
        );
    }

    // 2) Duplicates, anomalies, prices.
    let cleaned = clean(&table.records, &schema, sink);
    let mut cleaned_rows = cleaned.cleaned;

    // 3) Rows needing a zip.
    let missing = find_rows_missing_zip(&cleaned_rows, &schema, sink);

    // 4) Bounded lookups.
    let enrichment = if schema.index_of(Column::FullAddress).is_none() {
        sink.warn(
            Stage::Lookup,
            "Skipping zip lookup because 'Full Address' column was not found.".to_string(),
        );
        EnrichmentReport::default()
    } else if missing.is_empty() {
        sink.info(
            Stage::Lookup,
            "No rows found needing zip code lookup based on 'Full Address'.".to_string(),
        );
        EnrichmentReport::default()
    } else {
        sink.info(
            Stage::Lookup,
            format!(
                "Attempting to look up missing zip codes for up to {} rows...",
                config.max_lookups
            ),
        );
        let settings = EnrichSettings {
            max_attempts: config.max_lookups,
            country: &config.country,
            attempt_policy: config.attempt_policy,
        };
        enrich_missing_zips(&mut cleaned_rows, &schema, &missing, lookup, settings, sink)
    };

    // 5) Outputs, each independent of the other.
    sink.info(Stage::Export, "Writing output files...".to_string());
    let cleaned_output = write_output(&config.cleaned_path(), &schema, &cleaned_rows, "Cleaned data", sink);
    let anomalies_output = write_output(
        &config.anomalies_path(),
        &schema,
        &cleaned.anomalies,
        "Anomalies",
        sink,
    );

    sink.info(Stage::Export, "Data cleaning process finished.".to_string());

    Ok(RunOutput {
        schema,
        cleaned: cleaned_rows,
        anomalies: cleaned.anomalies,
        rows_read: table.records.len(),
        rows_skipped: table.row_errors.len(),
        clean: cleaned.report,
        missing_zip: missing.len(),
        enrichment,
        cleaned_output,
        anomalies_output,
    })
}

fn ensure_data_dir(dir: &Path, sink: &mut dyn DiagnosticSink) -> Result<(), AppError> {
    if dir.is_dir() {
        return Ok(());
    }
    sink.warn(
        Stage::Ingest,
        format!("Data folder '{}' not found. Creating it.", dir.display()),
    );
    fs::create_dir_all(dir)
        .map_err(|e| AppError::storage(format!("Could not create data folder '{}': {e}", dir.display())))
}

fn write_output(
    path: &Path,
    schema: &Schema,
    records: &[Record],
    label: &str,
    sink: &mut dyn DiagnosticSink,
) -> OutputStatus {
    let result = write_table(path, schema, records);
    match &result {
        Ok(WriteOutcome::Written(n)) => sink.info(
            Stage::Export,
            format!("{label} saved to '{}' ({n} rows).", path.display()),
        ),
        Ok(WriteOutcome::Skipped) => sink.warn(
            Stage::Export,
            format!("No rows for '{}'. File not written.", path.display()),
        ),
        Err(e) => sink.error(Stage::Export, format!("Failed to write {label}: {e}")),
    }
    OutputStatus {
        path: path.to_path_buf(),
        result,
    }
}
