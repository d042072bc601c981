//! Record cleaning: duplicate removal, anomaly routing, price normalization.
//!
//! Rows are visited once, in input order:
//!
//! 1. a row whose values (in header order) hash the same as an earlier row is
//!    dropped as a duplicate
//! 2. a surviving row whose fuel type mentions "pepsi" goes to the anomaly set
//! 3. the gross price of every surviving row, anomaly or not, is normalized
//!
//! Bad values never drop a row; they are reported to the diagnostics sink.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::diagnostics::{DiagnosticSink, Stage};
use crate::domain::{Column, Record, Schema};

pub mod price;

pub use price::{EMPTY_PRICE, PriceOutcome, normalize_price};

const ANOMALY_MARKER: &str = "pepsi";

/// Duplicate-detection key for one row within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHash(u64);

/// Hash a record's values in header order.
pub fn row_hash(record: &Record) -> RowHash {
    let mut hasher = DefaultHasher::new();
    record.values().hash(&mut hasher);
    RowHash(hasher.finish())
}

/// `true` when a fuel type value marks a beverage purchase.
pub fn is_anomaly(fuel_type: &str) -> bool {
    fuel_type.to_lowercase().contains(ANOMALY_MARKER)
}

/// Counts gathered while cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub input_rows: usize,
    pub duplicates_removed: usize,
    pub anomalies: usize,
    pub cleaned: usize,
    pub empty_prices: usize,
    pub malformed_prices: usize,
}

impl CleanReport {
    pub fn price_warnings(&self) -> usize {
        self.empty_prices + self.malformed_prices
    }
}

#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub cleaned: Vec<Record>,
    pub anomalies: Vec<Record>,
    pub report: CleanReport,
}

/// Deduplicate, split off anomalies, and normalize prices.
pub fn clean(records: &[Record], schema: &Schema, sink: &mut dyn DiagnosticSink) -> CleanOutput {
    let mut report = CleanReport {
        input_rows: records.len(),
        ..CleanReport::default()
    };

    if records.is_empty() {
        sink.warn(Stage::Clean, "Input data is empty. No cleaning performed.".to_string());
        return CleanOutput {
            cleaned: Vec::new(),
            anomalies: Vec::new(),
            report,
        };
    }

    let price_col = schema.index_of(Column::GrossPrice);
    let fuel_type_col = schema.index_of(Column::FuelType);

    if price_col.is_none() {
        sink.warn(
            Stage::Clean,
            "Could not find 'Gross Price' column. Prices will not be normalized.".to_string(),
        );
    }
    if fuel_type_col.is_none() {
        sink.warn(
            Stage::Clean,
            "Could not find 'Fuel Type' column. Cannot check for Pepsi anomalies.".to_string(),
        );
    }
    if schema.index_of(Column::FullAddress).is_none() {
        sink.warn(Stage::Clean, "Could not find 'Full Address' column.".to_string());
    }

    let mut seen: HashSet<RowHash> = HashSet::with_capacity(records.len());
    let mut cleaned = Vec::new();
    let mut anomalies = Vec::new();

    for (row_index, row) in records.iter().enumerate() {
        if !seen.insert(row_hash(row)) {
            report.duplicates_removed += 1;
            continue;
        }

        let mut row = row.clone();

        let anomalous = fuel_type_col.is_some_and(|idx| is_anomaly(row.get(idx)));
        if anomalous {
            sink.info(
                Stage::Clean,
                format!("Anomaly detected (Pepsi in 'Fuel Type') at original index {row_index}: {row}"),
            );
        }

        if price_col.is_some() {
            normalize_row_price(&mut row, schema, row_index, &mut report, sink);
        }

        if anomalous {
            anomalies.push(row);
        } else {
            cleaned.push(row);
        }
    }

    report.anomalies = anomalies.len();
    report.cleaned = cleaned.len();

    sink.info(Stage::Clean, format!("Duplicate rows skipped: {}", report.duplicates_removed));
    sink.info(
        Stage::Clean,
        format!(
            "Cleaning complete. Found {} valid rows and {} anomalies (Pepsi).",
            report.cleaned, report.anomalies
        ),
    );

    CleanOutput {
        cleaned,
        anomalies,
        report,
    }
}

fn normalize_row_price(
    row: &mut Record,
    schema: &Schema,
    row_index: usize,
    report: &mut CleanReport,
    sink: &mut dyn DiagnosticSink,
) {
    let Some(raw) = row.field(schema, Column::GrossPrice).map(str::to_string) else {
        return;
    };

    match normalize_price(&raw) {
        PriceOutcome::Normalized(value) => {
            row.set_field(schema, Column::GrossPrice, value);
        }
        PriceOutcome::Empty => {
            report.empty_prices += 1;
            sink.warn(
                Stage::Clean,
                format!("Empty price string '{raw}' at original index {row_index}. Setting to '{EMPTY_PRICE}'."),
            );
            row.set_field(schema, Column::GrossPrice, EMPTY_PRICE.to_string());
        }
        PriceOutcome::Malformed { cleaned } => {
            report.malformed_prices += 1;
            sink.warn(
                Stage::Clean,
                format!(
                    "Could not parse price '{raw}' (as '{cleaned}') at original index {row_index}. Leaving as is."
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MemorySink, Severity};

    fn schema() -> Schema {
        Schema::new(vec![
            "Date".to_string(),
            "Fuel Type".to_string(),
            "Gross Price".to_string(),
            "Full Address".to_string(),
        ])
    }

    fn row(schema: &Schema, date: &str, fuel: &str, price: &str, address: &str) -> Record {
        Record::from_values(schema, [date, fuel, price, address])
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let schema = schema();
        let records = vec![
            row(&schema, "d1", "Gasoline", "$1.00", "a"),
            row(&schema, "d2", "Diesel", "$2.00", "b"),
            row(&schema, "d1", "Gasoline", "$1.00", "a"),
            row(&schema, "d3", "Gasoline", "$3.00", "c"),
            row(&schema, "d2", "Diesel", "$2.00", "b"),
        ];
        let mut sink = MemorySink::new();
        let out = clean(&records, &schema, &mut sink);

        let dates: Vec<&str> = out.cleaned.iter().map(|r| r.get(0)).collect();
        assert_eq!(dates, vec!["d1", "d2", "d3"]);
        assert_eq!(out.report.duplicates_removed, 2);
    }

    #[test]
    fn pepsi_rows_are_routed_to_anomalies() {
        let schema = schema();
        let records = vec![
            row(&schema, "d1", "Diet Pepsi", "$1.5", "a"),
            row(&schema, "d2", "Gasoline", "$2.00", "b"),
            row(&schema, "d3", "PEPSI-COLA", "$3.00", "c"),
            row(&schema, "d4", "Pepsi-Cola", "", "d"),
        ];
        let mut sink = MemorySink::new();
        let out = clean(&records, &schema, &mut sink);

        let anomaly_dates: Vec<&str> = out.anomalies.iter().map(|r| r.get(0)).collect();
        assert_eq!(anomaly_dates, vec!["d1", "d3", "d4"]);
        assert_eq!(out.cleaned.len(), 1);
        assert_eq!(out.cleaned[0].get(1), "Gasoline");

        // Anomalies are still price-normalized.
        assert_eq!(out.anomalies[0].get(2), "1.50");
        assert_eq!(out.anomalies[2].get(2), "0.00");
    }

    #[test]
    fn partitions_account_for_every_input_row() {
        let schema = schema();
        let records = vec![
            row(&schema, "d1", "Gasoline", "1", "a"),
            row(&schema, "d1", "Gasoline", "1", "a"),
            row(&schema, "d2", "pepsi", "1", "a"),
            row(&schema, "d2", "pepsi", "1", "a"),
            row(&schema, "d3", "Diesel", "1", "a"),
        ];
        let mut sink = MemorySink::new();
        let out = clean(&records, &schema, &mut sink);
        let r = out.report;

        assert_eq!(r.cleaned + r.anomalies + r.duplicates_removed, records.len());
        assert_eq!(r.duplicates_removed, records.len() - out.cleaned.len() - out.anomalies.len());
        assert!(out.cleaned.iter().all(|c| !out.anomalies.contains(c)));
    }

    #[test]
    fn prices_are_normalized_with_warnings_for_bad_values() {
        let schema = schema();
        let records = vec![
            row(&schema, "d1", "Gasoline", "$1,234.5", "a"),
            row(&schema, "d2", "Gasoline", "", "b"),
            row(&schema, "d3", "Gasoline", "abc", "c"),
        ];
        let mut sink = MemorySink::new();
        let out = clean(&records, &schema, &mut sink);

        let prices: Vec<&str> = out.cleaned.iter().map(|r| r.get(2)).collect();
        assert_eq!(prices, vec!["1234.50", "0.00", "abc"]);
        assert_eq!(out.report.empty_prices, 1);
        assert_eq!(out.report.malformed_prices, 1);
        assert_eq!(sink.count_in(Stage::Clean, Severity::Warning), 2);
    }

    #[test]
    fn missing_columns_degrade_only_their_feature() {
        let schema = Schema::new(vec!["Date".to_string(), "Gross Price".to_string()]);
        let records = vec![
            Record::from_values(&schema, ["d1", "$5"]),
            Record::from_values(&schema, ["d2", "Pepsi"]),
        ];
        let mut sink = MemorySink::new();
        let out = clean(&records, &schema, &mut sink);

        // No fuel type column: nothing can be an anomaly.
        assert!(out.anomalies.is_empty());
        assert_eq!(out.cleaned[0].get(1), "5.00");
        assert_eq!(out.cleaned[1].get(1), "Pepsi");
        // Fuel type + address warnings, plus the malformed price.
        assert_eq!(sink.count_in(Stage::Clean, Severity::Warning), 3);
    }

    #[test]
    fn cleaning_clean_data_is_idempotent() {
        let schema = schema();
        let records = vec![
            row(&schema, "d1", "Gasoline", "$10", "1 Main St, Dayton, OH 45402"),
            row(&schema, "d2", "Diesel", "2,000.125", "45202 OH, Cincinnati, 9 Vine St"),
            row(&schema, "d3", "Pepsi", "1", "x"),
        ];
        let mut sink = MemorySink::new();
        let first = clean(&records, &schema, &mut sink);
        let second = clean(&first.cleaned, &schema, &mut sink);

        assert_eq!(second.cleaned, first.cleaned);
        assert!(second.anomalies.is_empty());
        assert_eq!(second.report.duplicates_removed, 0);
    }

    #[test]
    fn empty_input_yields_empty_sets() {
        let schema = schema();
        let mut sink = MemorySink::new();
        let out = clean(&[], &schema, &mut sink);
        assert!(out.cleaned.is_empty() && out.anomalies.is_empty());
        assert_eq!(sink.count(Severity::Warning), 1);
    }

    #[test]
    fn anomaly_marker_is_case_insensitive_substring() {
        assert!(is_anomaly("Diet Pepsi"));
        assert!(is_anomaly("pepsi-cola"));
        assert!(!is_anomaly("Gasoline"));
        assert!(!is_anomaly(""));
    }
}
