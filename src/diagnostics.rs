//! Diagnostics sink passed explicitly to every pipeline stage.
//!
//! Components never log through ambient configuration to make decisions;
//! they report `Diagnostic`s into whatever sink the caller hands them.
//! `TracingSink` turns them into structured `tracing` events, `MemorySink`
//! keeps them for inspection.

use std::fmt;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Clean,
    Address,
    Lookup,
    Export,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Clean => "clean",
            Stage::Address => "address",
            Stage::Lookup => "lookup",
            Stage::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
}

pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);

    fn debug(&mut self, stage: Stage, message: String) {
        self.emit(Diagnostic {
            severity: Severity::Debug,
            stage,
            message,
        });
    }

    fn info(&mut self, stage: Stage, message: String) {
        self.emit(Diagnostic {
            severity: Severity::Info,
            stage,
            message,
        });
    }

    fn warn(&mut self, stage: Stage, message: String) {
        self.emit(Diagnostic {
            severity: Severity::Warning,
            stage,
            message,
        });
    }

    fn error(&mut self, stage: Stage, message: String) {
        self.emit(Diagnostic {
            severity: Severity::Error,
            stage,
            message,
        });
    }
}

/// Forwards diagnostics to `tracing` and keeps warning/error totals.
#[derive(Debug, Default)]
pub struct TracingSink {
    warnings: usize,
    errors: usize,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let stage = diagnostic.stage.as_str();
        let message = diagnostic.message.as_str();
        match diagnostic.severity {
            Severity::Debug => tracing::debug!(stage, "{message}"),
            Severity::Info => tracing::info!(stage, "{message}"),
            Severity::Warning => {
                self.warnings += 1;
                tracing::warn!(stage, "{message}");
            }
            Severity::Error => {
                self.errors += 1;
                tracing::error!(stage, "{message}");
            }
        }
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub diagnostics: Vec<Diagnostic>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn count_in(&self, stage: Stage, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.stage == stage && d.severity == severity)
            .count()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Install the global `tracing` subscriber for the binary.
///
/// `RUST_LOG` wins over the default directive when set.
pub fn init_logging(verbose: bool, json: bool) {
    let default_directive = if verbose {
        "fuel_clean=debug"
    } else {
        "fuel_clean=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (e.g. when embedded); keep it.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
