//! Command-line parsing for the fuel purchase cleaner.
//!
//! Every option has a default, so a bare `fuelclean` run reads
//! `Data/fuelPurchaseData.csv` and writes both outputs next to it.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "fuelclean",
    version,
    about = "Clean a fuel purchase CSV: drop duplicates, split off anomalies, normalize prices, backfill zip codes"
)]
pub struct Cli {
    /// Directory holding the input CSV; outputs are written here too.
    #[arg(long, value_name = "DIR", default_value = "Data")]
    pub data_dir: PathBuf,

    /// Input CSV file name (inside the data directory).
    #[arg(short = 'i', long, default_value = "fuelPurchaseData.csv")]
    pub input: String,

    /// Output file name for cleaned rows.
    #[arg(long, default_value = "cleanedData.CSV")]
    pub cleaned_output: String,

    /// Output file name for anomalous rows.
    #[arg(long, default_value = "dataAnomalies.CSV")]
    pub anomalies_output: String,

    /// Maximum zip lookup attempts for the whole run.
    #[arg(short = 'n', long, default_value_t = 5)]
    pub max_lookups: usize,

    /// Country code sent with every zip lookup.
    #[arg(long, default_value = "us")]
    pub country: String,

    /// Per-request timeout for zip lookups, in seconds.
    #[arg(long, default_value_t = 10)]
    pub lookup_timeout_secs: u64,

    /// Only count attempts that reached the zip service against the cap.
    ///
    /// By default an address whose city cannot be extracted also uses up an
    /// attempt.
    #[arg(long)]
    pub count_only_service_calls: bool,

    /// Also write the run summary as JSON to this path.
    #[arg(long, value_name = "JSON")]
    pub summary_json: Option<PathBuf>,

    /// Show debug-level logs (city extraction details).
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}
