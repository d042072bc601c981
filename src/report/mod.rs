//! Reporting utilities: the end-of-run summary.

pub mod format;

pub use format::*;
