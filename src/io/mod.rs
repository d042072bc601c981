//! Input/output helpers.
//!
//! - CSV ingest into a resolved schema (`ingest`)
//! - CSV export of row-sets with the original header, plus the JSON run summary (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
