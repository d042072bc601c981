//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the resolved table schema (`Schema`, `Column`) and rows (`Record`)
//! - run configuration (`RunConfig`, `AttemptPolicy`)

pub mod types;

pub use types::*;
