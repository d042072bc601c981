//! Write row-sets back to CSV with the run's original header.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{Record, Schema};
use crate::error::AppError;
use crate::report::RunSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(usize),
    /// Nothing to write (no rows or no header); no file was created.
    Skipped,
}

/// Write records to a CSV file.
pub fn write_table(path: &Path, schema: &Schema, records: &[Record]) -> Result<WriteOutcome, AppError> {
    if records.is_empty() || schema.is_empty() {
        return Ok(WriteOutcome::Skipped);
    }

    write_replacing(path, |file| {
        write_table_to(file, schema, records)
            .map_err(|e| AppError::storage(format!("{} ({})", e.message(), path.display())))
    })
}

/// Write records as CSV to any writer.
pub fn write_table_to<W: Write>(writer: W, schema: &Schema, records: &[Record]) -> Result<WriteOutcome, AppError> {
    if records.is_empty() || schema.is_empty() {
        return Ok(WriteOutcome::Skipped);
    }

    let mut writer = csv::Writer::from_writer(writer);

    writer
        .write_record(schema.header())
        .map_err(|e| AppError::storage(format!("Failed to write CSV header: {e}")))?;

    for record in records {
        writer
            .write_record(record.values())
            .map_err(|e| AppError::storage(format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::storage(format!("Failed to flush CSV output: {e}")))?;

    Ok(WriteOutcome::Written(records.len()))
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    write_replacing(path, |file| {
        serde_json::to_writer_pretty(file, summary)
            .map_err(|e| AppError::storage(format!("Failed to write summary JSON '{}': {e}", path.display())))
    })
}

/// Write into `<path>.partial` and rename it over `path` once `write` succeeds.
///
/// On any failure the partial file is removed and an existing `path` is left as it was.
fn write_replacing<T>(path: &Path, write: impl FnOnce(File) -> Result<T, AppError>) -> Result<T, AppError> {
    let partial = partial_path(path);
    let file = File::create(&partial)
        .map_err(|e| AppError::storage(format!("Failed to create '{}': {e}", path.display())))?;

    let result = write(file).and_then(|value| {
        fs::rename(&partial, path)
            .map(|()| value)
            .map_err(|e| AppError::storage(format!("Failed to move output into '{}': {e}", path.display())))
    });
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::io::ingest::read_table;

    fn schema() -> Schema {
        Schema::new(vec![
            "Gross Price".to_string(),
            "Fuel Type".to_string(),
            "Full Address".to_string(),
        ])
    }

    #[test]
    fn write_then_read_is_row_for_row_equal() {
        let schema = schema();
        let records = vec![
            Record::from_values(&schema, ["1234.50", "Gasoline", "1 Main St, Dayton, OH 45402"]),
            Record::from_values(&schema, ["0.00", "Diesel \"Premium\"", ""]),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(write_table(&path, &schema, &records).unwrap(), WriteOutcome::Written(2));

        let mut sink = MemorySink::new();
        let table = read_table(&path, &mut sink).unwrap();
        assert_eq!(table.schema.header(), schema.header());
        assert_eq!(table.records, records);
    }

    #[test]
    fn empty_row_set_is_skipped_without_creating_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(write_table(&path, &schema(), &[]).unwrap(), WriteOutcome::Skipped);
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let schema = schema();
        let records = vec![Record::from_values(&schema, ["1.00", "Gasoline", ""])];
        let err = write_table(&path, &schema, &records).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn summary_json_is_written_pretty() {
        use crate::app::enrich::EnrichmentReport;
        use crate::clean::CleanReport;
        use crate::report::DiagnosticTotals;

        let summary = RunSummary {
            generated: "2024-01-01T00:00:00+00:00".to_string(),
            header: schema().header().to_vec(),
            rows_read: 3,
            rows_unreadable: 0,
            clean: CleanReport::default(),
            missing_zip: 1,
            enrichment: EnrichmentReport::default(),
            outputs: Vec::new(),
            diagnostics: DiagnosticTotals::default(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_summary_json(&path, &summary).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["rows_read"], 3);
        assert_eq!(value["header"][2], "Full Address");
    }

    #[test]
    fn failed_write_leaves_no_partial_file_and_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "previous\n").unwrap();

        let err = write_replacing(&path, |mut file| -> Result<(), AppError> {
            file.write_all(b"half a row").unwrap();
            Err(AppError::storage("disk full"))
        })
        .unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous\n");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn directory_in_the_way_is_a_storage_error_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::create_dir(&path).unwrap();
        let schema = schema();
        let records = vec![Record::from_values(&schema, ["1.00", "Gasoline", ""])];

        let err = write_table(&path, &schema, &records).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(path.is_dir());
        assert!(!partial_path(&path).exists());
    }
}
