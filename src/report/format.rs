//! Formatted terminal output for a finished run.
//!
//! Kept separate from the pipeline so wording changes stay local.

use chrono::Local;
use serde::Serialize;

use crate::app::enrich::EnrichmentReport;
use crate::app::pipeline::{OutputStatus, RunOutput};
use crate::clean::CleanReport;
use crate::io::export::WriteOutcome;

/// Warning/error totals from the diagnostics sink used for the run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DiagnosticTotals {
    pub warnings: usize,
    pub errors: usize,
}

/// Machine-readable form of the run summary (`--summary-json`).
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated: String,
    pub header: Vec<String>,
    pub rows_read: usize,
    pub rows_unreadable: usize,
    pub clean: CleanReport,
    pub missing_zip: usize,
    pub enrichment: EnrichmentReport,
    pub outputs: Vec<OutputSummary>,
    pub diagnostics: DiagnosticTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSummary {
    pub kind: &'static str,
    pub path: String,
    /// `written`, `skipped`, or `failed`.
    pub status: &'static str,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn run_summary(run: &RunOutput, totals: DiagnosticTotals) -> RunSummary {
    RunSummary {
        generated: Local::now().to_rfc3339(),
        header: run.schema.header().to_vec(),
        rows_read: run.rows_read,
        rows_unreadable: run.rows_skipped,
        clean: run.clean,
        missing_zip: run.missing_zip,
        enrichment: run.enrichment,
        outputs: vec![
            output_summary("cleaned", &run.cleaned_output),
            output_summary("anomalies", &run.anomalies_output),
        ],
        diagnostics: totals,
    }
}

fn output_summary(kind: &'static str, status: &OutputStatus) -> OutputSummary {
    let path = status.path.display().to_string();
    match &status.result {
        Ok(WriteOutcome::Written(rows)) => OutputSummary {
            kind,
            path,
            status: "written",
            rows: *rows,
            error: None,
        },
        Ok(WriteOutcome::Skipped) => OutputSummary {
            kind,
            path,
            status: "skipped",
            rows: 0,
            error: None,
        },
        Err(err) => OutputSummary {
            kind,
            path,
            status: "failed",
            rows: 0,
            error: Some(err.to_string()),
        },
    }
}

/// Format the run summary printed at the end of `fuelclean`.
pub fn format_run_summary(run: &RunOutput, totals: DiagnosticTotals) -> String {
    let mut out = String::new();

    out.push_str("=== fuelclean - fuel purchase cleaning ===\n");
    out.push_str(&format!(
        "Rows: read={} | unreadable={} | columns={}\n",
        run.rows_read,
        run.rows_skipped,
        run.schema.len()
    ));
    out.push_str(&format!(
        "Cleaning: duplicates={} | anomalies={} | cleaned={}\n",
        run.clean.duplicates_removed, run.clean.anomalies, run.clean.cleaned
    ));
    if run.clean.price_warnings() > 0 {
        out.push_str(&format!(
            "Prices: empty->0.00={} | unparseable (left as is)={}\n",
            run.clean.empty_prices, run.clean.malformed_prices
        ));
    }

    let e = &run.enrichment;
    out.push_str(&format!("Missing zip: {} rows\n", run.missing_zip));
    out.push_str(&format!(
        "Lookups: attempts={} | service calls={} | appended={} | not found={} | errors={} | no city={}\n",
        e.attempts, e.service_calls, e.zips_appended, e.not_found, e.lookup_errors, e.extraction_failures
    ));
    if e.auth_failures > 0 {
        out.push_str(&format!(
            "  {} lookup(s) were rejected as unauthorized; check ZIPCODEBASE_API_KEY and its remaining quota.\n",
            e.auth_failures
        ));
    }
    if e.unvisited > 0 {
        out.push_str(&format!("  {} row(s) left without a lookup (cap reached).\n", e.unvisited));
    }

    out.push_str("\nOutputs:\n");
    out.push_str(&format_output_line("cleaned", &run.cleaned_output));
    out.push_str(&format_output_line("anomalies", &run.anomalies_output));

    out.push_str(&format!(
        "\nDiagnostics: warnings={} | errors={}",
        totals.warnings, totals.errors
    ));

    out
}

fn format_output_line(label: &str, status: &OutputStatus) -> String {
    let path = status.path.display();
    match &status.result {
        Ok(WriteOutcome::Written(n)) => format!("  {label:<10} {path} ({n} rows)\n"),
        Ok(WriteOutcome::Skipped) => format!("  {label:<10} {path} (skipped: no rows)\n"),
        Err(err) => format!("  {label:<10} {path} (FAILED: {err})\n"),
    }
}
