//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into a `RunConfig`
//! - installs logging
//! - builds the zip lookup client
//! - runs the cleaning pipeline and prints the summary

use std::time::Duration;

use clap::Parser;

use crate::cli::Cli;
use crate::diagnostics::{DiagnosticSink, Stage, TracingSink, init_logging};
use crate::domain::{AttemptPolicy, RunConfig};
use crate::error::AppError;
use crate::io::export::write_summary_json;
use crate::report::{DiagnosticTotals, format_run_summary, run_summary};
use crate::zipcode::ZipcodebaseClient;

pub mod enrich;
pub mod pipeline;

/// Entry point for the `fuelclean` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let config = run_config_from_args(&cli);

    let mut sink = TracingSink::new();

    let client = ZipcodebaseClient::from_env(config.lookup_timeout)
        .map_err(|e| AppError::new(4, format!("Failed to set up the zip lookup client: {e}")))?;
    if !client.has_api_key() {
        sink.error(
            Stage::Lookup,
            "ZIPCODEBASE_API_KEY is not set; zip lookups will fail and still count as attempts.".to_string(),
        );
    }

    let output = pipeline::run_clean(&config, &client, &mut sink)?;

    let totals = DiagnosticTotals {
        warnings: sink.warnings(),
        errors: sink.errors(),
    };
    println!("{}", format_run_summary(&output, totals));

    // Optional export; a failure here does not undo the written outputs.
    if let Some(path) = &config.summary_json {
        let summary = run_summary(&output, totals);
        match write_summary_json(path, &summary) {
            Ok(()) => sink.info(Stage::Export, format!("Run summary saved to '{}'.", path.display())),
            Err(e) => sink.error(Stage::Export, e.to_string()),
        }
    }

    Ok(())
}

pub fn run_config_from_args(cli: &Cli) -> RunConfig {
    RunConfig {
        data_dir: cli.data_dir.clone(),
        input_file: cli.input.clone(),
        cleaned_output: cli.cleaned_output.clone(),
        anomalies_output: cli.anomalies_output.clone(),
        max_lookups: cli.max_lookups,
        country: cli.country.clone(),
        lookup_timeout: Duration::from_secs(cli.lookup_timeout_secs),
        attempt_policy: if cli.count_only_service_calls {
            AttemptPolicy::ServiceCallsOnly
        } else {
            AttemptPolicy::EveryEntry
        },
        summary_json: cli.summary_json.clone(),
    }
}
