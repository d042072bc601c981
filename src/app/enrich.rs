//! Bounded zip backfill over the missing-zip entries.
//!
//! Entries are visited in order until the attempt cap is used up. Under the
//! default `AttemptPolicy::EveryEntry` an entry whose city cannot be
//! extracted still consumes an attempt, so a run can spend its whole budget
//! without calling the service.

use serde::Serialize;

use crate::address::{MissingZipEntry, extract_city, has_postal_code};
use crate::diagnostics::{DiagnosticSink, Stage};
use crate::domain::{AttemptPolicy, Column, Record, Schema};
use crate::zipcode::ZipLookup;

#[derive(Debug, Clone, Copy)]
pub struct EnrichSettings<'a> {
    pub max_attempts: usize,
    pub country: &'a str,
    pub attempt_policy: AttemptPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentReport {
    /// Attempts counted against the cap.
    pub attempts: usize,
    /// Lookups handed to the zip service.
    pub service_calls: usize,
    pub zips_appended: usize,
    pub extraction_failures: usize,
    /// Service answered without a code.
    pub not_found: usize,
    pub lookup_errors: usize,
    pub auth_failures: usize,
    /// Service returned a code but the row already had one.
    pub already_present: usize,
    /// Entries left unvisited because the cap was reached.
    pub unvisited: usize,
}

pub fn enrich_missing_zips(
    cleaned: &mut [Record],
    schema: &Schema,
    entries: &[MissingZipEntry],
    lookup: &dyn ZipLookup,
    settings: EnrichSettings<'_>,
    sink: &mut dyn DiagnosticSink,
) -> EnrichmentReport {
    let mut report = EnrichmentReport::default();

    for (position, entry) in entries.iter().enumerate() {
        if report.attempts >= settings.max_attempts {
            report.unvisited = entries.len() - position;
            sink.info(
                Stage::Lookup,
                format!("Reached maximum ({}) zip code lookups.", settings.max_attempts),
            );
            break;
        }

        let address = entry.record.field(schema, Column::FullAddress).unwrap_or("");

        let Some(city) = extract_city(address, sink) else {
            report.extraction_failures += 1;
            if settings.attempt_policy == AttemptPolicy::EveryEntry {
                report.attempts += 1;
            }
            sink.warn(
                Stage::Lookup,
                format!(
                    "Could not extract city from address at index {} to perform zip lookup. Address: '{address}'",
                    entry.index
                ),
            );
            continue;
        };

        sink.info(
            Stage::Lookup,
            format!(
                "Looking up zip for extracted city: '{city}' (row index in cleaned data: {})",
                entry.index
            ),
        );
        report.attempts += 1;
        report.service_calls += 1;

        match lookup.zip_for_city(&city, settings.country) {
            Ok(Some(zip)) => {
                sink.info(Stage::Lookup, format!("Zip code found for {city}: {zip}"));
                apply_zip(cleaned, schema, entry.index, &city, &zip, &mut report, sink);
            }
            Ok(None) => {
                report.not_found += 1;
                sink.warn(
                    Stage::Lookup,
                    format!("Could not find zip via API for extracted city: '{city}' from address '{address}'"),
                );
            }
            Err(err) if err.is_auth() => {
                report.lookup_errors += 1;
                report.auth_failures += 1;
                sink.error(Stage::Lookup, format!("Zip lookup for '{city}' failed: {err}"));
            }
            Err(err) => {
                report.lookup_errors += 1;
                sink.error(Stage::Lookup, format!("Zip lookup for '{city}' failed: {err}"));
            }
        }
    }

    report
}

fn apply_zip(
    cleaned: &mut [Record],
    schema: &Schema,
    index: usize,
    city: &str,
    zip: &str,
    report: &mut EnrichmentReport,
    sink: &mut dyn DiagnosticSink,
) {
    let Some(record) = cleaned.get_mut(index) else {
        sink.warn(
            Stage::Lookup,
            format!("Row index {index} is outside the cleaned set; zip '{zip}' not applied."),
        );
        return;
    };

    let current = record.field(schema, Column::FullAddress).unwrap_or("").to_string();
    if has_postal_code(&current) {
        report.already_present += 1;
        sink.warn(
            Stage::Lookup,
            format!("Zip '{zip}' found by API, but address '{current}' now appears to have a zip already. No update made."),
        );
        return;
    }

    let updated = format!("{} {zip}", current.trim()).trim().to_string();
    record.set_field(schema, Column::FullAddress, updated.clone());
    report.zips_appended += 1;
    sink.info(
        Stage::Lookup,
        format!("Appended zip '{zip}' to address for city '{city}'. New address: '{updated}'"),
    );
}
