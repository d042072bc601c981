//! `fuel-clean` library crate.
//!
//! The binary (`fuelclean`) is a thin wrapper around this library so that:
//!
//! - the cleaning and address logic is testable without spawning processes
//! - the zip lookup can be swapped for a fake in tests

pub mod address;
pub mod app;
pub mod clean;
pub mod cli;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod zipcode;
