//! Postal-code detection and city extraction for the combined address column.
//!
//! Two address layouts are recognized:
//!
//! - `ZIP STATE, City, Street[, ...]` (zip at the start): city is segment 1
//! - `Street, City, STATE [ZIP]` (anything else): city is the second-to-last segment
//!
//! Anything that does not fit yields no city; we never guess.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{DiagnosticSink, Stage};
use crate::domain::{Column, Record, Schema};

static ZIP_AT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{5}(?:-\d{4})?)\b").expect("valid zip-at-start regex"));
static ZIP_AT_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{5}(?:-\d{4})?)\s*$").expect("valid zip-at-end regex"));

/// A cleaned record whose address lacks a postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingZipEntry {
    /// Position in the cleaned set.
    pub index: usize,
    pub record: Record,
}

/// `true` when a 5-digit or ZIP+4 token anchors either end of the address.
pub fn has_postal_code(address: &str) -> bool {
    let address = address.trim();
    if address.is_empty() {
        return false;
    }
    ZIP_AT_START.is_match(address) || ZIP_AT_END.is_match(address)
}

/// Extract the city from one of the two known layouts.
pub fn extract_city(address: &str, sink: &mut dyn DiagnosticSink) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        sink.warn(Stage::Address, "Address is empty; cannot determine city.".to_string());
        return None;
    }

    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if ZIP_AT_START.is_match(address) {
        if parts.len() >= 2 {
            let city = parts[1];
            sink.debug(
                Stage::Address,
                format!("Extracted city '{city}' from zip-first address: '{address}'"),
            );
            return Some(city.to_string());
        }
        sink.warn(
            Stage::Address,
            format!("Address starts with zip but has < 2 parts after comma split: '{address}'"),
        );
        return None;
    }

    match parts.len() {
        0 => {
            sink.warn(
                Stage::Address,
                format!("Address has no parts after comma split: '{address}'"),
            );
            None
        }
        1 => {
            sink.warn(
                Stage::Address,
                format!("Address has only one part after comma split, cannot reliably determine city: '{address}'"),
            );
            None
        }
        n => {
            let city = parts[n - 2];
            sink.debug(
                Stage::Address,
                format!("Extracted city '{city}' from street-first address: '{address}'"),
            );
            Some(city.to_string())
        }
    }
}

/// Scan the cleaned set for rows whose address has no postal code.
pub fn find_rows_missing_zip(
    cleaned: &[Record],
    schema: &Schema,
    sink: &mut dyn DiagnosticSink,
) -> Vec<MissingZipEntry> {
    let Some(address_col) = schema.index_of(Column::FullAddress) else {
        sink.error(
            Stage::Address,
            "Cannot identify rows missing zip codes without a 'Full Address' column.".to_string(),
        );
        return Vec::new();
    };

    let mut missing = Vec::new();
    for (index, record) in cleaned.iter().enumerate() {
        let address = record.get(address_col);
        if !has_postal_code(address) {
            sink.debug(
                Stage::Address,
                format!("Row index {index} identified as missing zip. Address: '{address}'"),
            );
            missing.push(MissingZipEntry {
                index,
                record: record.clone(),
            });
        }
    }

    sink.info(
        Stage::Address,
        format!("Found {} rows potentially missing zip codes in 'Full Address'.", missing.len()),
    );
    missing
}
