//! Shared domain types.
//!
//! A run's schema is resolved exactly once when the input is read. Rows keep
//! every header column positionally (so outputs round-trip verbatim), while
//! the handful of columns the cleaner cares about are located up front and
//! addressed through `Column`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Columns with cleaning semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    GrossPrice,
    FuelType,
    FullAddress,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::GrossPrice, Column::FuelType, Column::FullAddress];

    /// Normalized header name this column is matched against.
    pub fn key(self) -> &'static str {
        match self {
            Column::GrossPrice => "gross price",
            Column::FuelType => "fuel type",
            Column::FullAddress => "full address",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Column::GrossPrice => "Gross Price",
            Column::FuelType => "Fuel Type",
            Column::FullAddress => "Full Address",
        }
    }
}

/// Header plus the resolved positions of the known columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    header: Vec<String>,
    gross_price: Option<usize>,
    fuel_type: Option<usize>,
    full_address: Option<usize>,
}

impl Schema {
    /// Resolve known columns by trimmed, case-insensitive name. The first
    /// matching header wins when a name repeats.
    pub fn new(header: Vec<String>) -> Self {
        let find = |column: Column| {
            header
                .iter()
                .position(|name| normalize_header_name(name) == column.key())
        };
        let gross_price = find(Column::GrossPrice);
        let fuel_type = find(Column::FuelType);
        let full_address = find(Column::FullAddress);
        Self {
            header,
            gross_price,
            fuel_type,
            full_address,
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    pub fn index_of(&self, column: Column) -> Option<usize> {
        match column {
            Column::GrossPrice => self.gross_price,
            Column::FuelType => self.fuel_type,
            Column::FullAddress => self.full_address,
        }
    }

    /// Header text (as written in the file) for a resolved column.
    pub fn column_name(&self, column: Column) -> Option<&str> {
        self.index_of(column)
            .and_then(|idx| self.header.get(idx))
            .map(String::as_str)
    }

    /// Known columns that could not be found in the header.
    pub fn missing_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.index_of(*c).is_none())
            .collect()
    }
}

/// Normalize a header name for matching.
pub fn normalize_header_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One row, holding exactly one value per header column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    values: Vec<String>,
}

impl Record {
    /// Build a record shaped to the schema: short rows are padded with empty
    /// values and values beyond the header are dropped.
    pub fn from_values<I, S>(schema: &Schema, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = values.into_iter().take(schema.len()).map(Into::into).collect();
        values.resize(schema.len(), String::new());
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> &str {
        self.values.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Value of a known column, or `None` when the schema lacks it.
    pub fn field(&self, schema: &Schema, column: Column) -> Option<&str> {
        schema.index_of(column).map(|idx| self.get(idx))
    }

    /// Overwrite a known column. Returns `false` when the schema lacks it.
    pub fn set_field(&mut self, schema: &Schema, column: Column, value: String) -> bool {
        match schema.index_of(column) {
            Some(idx) if idx < self.values.len() => {
                self.values[idx] = value;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.values.join(" | "))
    }
}

/// Which enrichment loop iterations count against the lookup cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptPolicy {
    /// Every missing-zip entry visited consumes an attempt, including ones
    /// whose city could not be extracted.
    #[default]
    EveryEntry,
    /// Only entries that reached the zip service consume an attempt.
    ServiceCallsOnly,
}

/// Resolved configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub input_file: String,
    pub cleaned_output: String,
    pub anomalies_output: String,

    /// Cap on enrichment attempts for the whole run.
    pub max_lookups: usize,
    pub country: String,
    pub lookup_timeout: Duration,
    pub attempt_policy: AttemptPolicy,

    /// Optional machine-readable run summary.
    pub summary_json: Option<PathBuf>,
}

impl RunConfig {
    pub fn input_path(&self) -> PathBuf {
        self.data_dir.join(&self.input_file)
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.data_dir.join(&self.cleaned_output)
    }

    pub fn anomalies_path(&self) -> PathBuf {
        self.data_dir.join(&self.anomalies_output)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            input_file: "fuelPurchaseData.csv".to_string(),
            cleaned_output: "cleanedData.CSV".to_string(),
            anomalies_output: "dataAnomalies.CSV".to_string(),
            max_lookups: 5,
            country: "us".to_string(),
            lookup_timeout: Duration::from_secs(10),
            attempt_policy: AttemptPolicy::EveryEntry,
            summary_json: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn schema_resolves_columns_loosely() {
        let schema = Schema::new(header(&["Date", "  GROSS price ", "Fuel Type", "full address"]));
        assert_eq!(schema.index_of(Column::GrossPrice), Some(1));
        assert_eq!(schema.index_of(Column::FuelType), Some(2));
        assert_eq!(schema.index_of(Column::FullAddress), Some(3));
        assert_eq!(schema.column_name(Column::GrossPrice), Some("  GROSS price "));
        assert!(schema.missing_columns().is_empty());
    }

    #[test]
    fn schema_reports_missing_columns() {
        let schema = Schema::new(header(&["Date", "Fuel Type"]));
        assert_eq!(schema.missing_columns(), vec![Column::GrossPrice, Column::FullAddress]);
    }

    #[test]
    fn first_matching_header_wins() {
        let schema = Schema::new(header(&["Fuel Type", "fuel type"]));
        assert_eq!(schema.index_of(Column::FuelType), Some(0));
    }

    #[test]
    fn record_is_shaped_to_header() {
        let schema = Schema::new(header(&["a", "b", "c"]));
        let short = Record::from_values(&schema, ["1"]);
        assert_eq!(short.values(), &["1", "", ""]);

        let long = Record::from_values(&schema, ["1", "2", "3", "4"]);
        assert_eq!(long.values(), &["1", "2", "3"]);
    }

    #[test]
    fn set_field_requires_resolved_column() {
        let schema = Schema::new(header(&["Full Address"]));
        let mut record = Record::from_values(&schema, ["1 Main St, Dayton, OH"]);
        assert!(record.set_field(&schema, Column::FullAddress, "x".to_string()));
        assert!(!record.set_field(&schema, Column::GrossPrice, "1.00".to_string()));
        assert_eq!(record.field(&schema, Column::FullAddress), Some("x"));
        assert_eq!(record.field(&schema, Column::GrossPrice), None);
    }
}
